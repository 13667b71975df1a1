// SPDX-License-Identifier: MIT OR Apache-2.0
//! Presentation view of the active node.
//!
//! A [`Scene`] is everything a front end needs to draw one step of playback.
//! It is rebuilt from the store on every call and never cached.

use crate::player::Player;
use novella_graph::{
    Background, ChapterId, DialogueNode, NodeId, NodeKind, SoundCue, StoryStore, TextPosition,
};

/// Speaker name color when neither the node nor the settings pick one
pub const DEFAULT_NAME_COLOR: &str = "#3B82F6";

/// Dialogue text color when neither the node nor the settings pick one
pub const DEFAULT_DIALOGUE_COLOR: &str = "#FFFFFF";

/// What the next click will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickHint {
    /// Another background layer is waiting
    SwitchBackground,
    /// Move on
    Continue,
    /// Pick an option
    Choose,
}

impl ClickHint {
    /// Prompt text
    pub fn label(&self) -> &'static str {
        match self {
            Self::SwitchBackground => "Click to switch background...",
            Self::Continue => "Click to continue...",
            Self::Choose => "Choose an option",
        }
    }
}

/// Speaker label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    /// Display name
    pub name: String,
    /// Resolved color
    pub color: String,
}

/// A dialogue line ready to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueView {
    /// Speaker, if the line has one
    pub speaker: Option<Speaker>,
    /// Line text
    pub text: String,
    /// Resolved text color
    pub text_color: String,
    /// Padding of the speaker name
    pub name_padding: TextPosition,
    /// Padding of the text
    pub text_padding: TextPosition,
}

/// A choice menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    /// Option labels, in selection order
    pub options: Vec<String>,
}

/// A chapter jump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpView {
    /// Target chapter, when set
    pub target: Option<ChapterId>,
    /// Title of the target chapter, when it exists
    pub target_title: Option<String>,
    /// Whether to show the transition text
    pub show_transition_text: bool,
    /// Whether to hide the bottom panel
    pub hide_bottom_panel: bool,
}

/// Node-type specific part of a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneContent {
    /// Dialogue line
    Dialogue(DialogueView),
    /// Choice menu
    Choice(ChoiceView),
    /// Chapter jump
    Jump(JumpView),
    /// Sound cue
    Sound(SoundCue),
    /// Background only
    Background,
}

/// Everything visible for the current node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Chapter being played
    pub chapter: ChapterId,
    /// Node being shown
    pub node: NodeId,
    /// Visible background layer
    pub background: Option<Background>,
    /// Node content
    pub content: SceneContent,
    /// What the next click does
    pub hint: ClickHint,
}

impl Player {
    /// Build the view of the current node, or `None` when idle
    pub fn scene(&self, store: &StoryStore) -> Option<Scene> {
        let node = self.current_node(store)?;
        // A fallback node is shown from its first layer, as the next advance enters it
        let entering = self.node.as_ref() != Some(&node.id);
        let pending_background = if entering {
            node.backgrounds.len() > 1
        } else {
            node.has_pending_background()
        };
        let background = if entering {
            node.backgrounds.first()
        } else {
            node.current_background()
        };

        let hint = if node.kind == NodeKind::Choice {
            ClickHint::Choose
        } else if pending_background {
            ClickHint::SwitchBackground
        } else {
            ClickHint::Continue
        };

        Some(Scene {
            chapter: node.chapter_id.clone(),
            node: node.id.clone(),
            background: background.cloned(),
            content: content_of(node, store),
            hint,
        })
    }
}

fn content_of(node: &DialogueNode, store: &StoryStore) -> SceneContent {
    match node.kind {
        NodeKind::Dialogue => {
            let settings = store.settings();
            let speaker = node.character_name.clone().map(|name| Speaker {
                name,
                color: pick_color(
                    node.character_color.as_deref(),
                    settings.character_name_color.as_deref(),
                    DEFAULT_NAME_COLOR,
                ),
            });
            SceneContent::Dialogue(DialogueView {
                speaker,
                text: node.text.clone().unwrap_or_default(),
                text_color: pick_color(
                    node.text_color.as_deref(),
                    settings.dialogue_text_color.as_deref(),
                    DEFAULT_DIALOGUE_COLOR,
                ),
                name_padding: settings.character_name_position,
                text_padding: settings.dialogue_text_position,
            })
        }
        NodeKind::Choice => SceneContent::Choice(ChoiceView {
            options: node.choices.iter().map(|c| c.text.clone()).collect(),
        }),
        NodeKind::Jump => {
            let options = node.jump_options();
            let target = node
                .target_chapter_id
                .clone()
                .filter(|target| !target.is_unset());
            let target_title = target
                .as_ref()
                .and_then(|id| store.chapter(id.as_str()))
                .map(|chapter| chapter.title.clone());
            SceneContent::Jump(JumpView {
                target,
                target_title,
                show_transition_text: options.shows_transition_text(),
                hide_bottom_panel: options.hides_bottom_panel(),
            })
        }
        NodeKind::Sound => SceneContent::Sound(node.sound.clone().unwrap_or_default()),
        NodeKind::Background => SceneContent::Background,
    }
}

fn pick_color(node: Option<&str>, settings: Option<&str>, fallback: &str) -> String {
    node.filter(|c| !c.is_empty())
        .or(settings.filter(|c| !c.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use novella_graph::{Chapter, Choice, SettingsPatch, SoundChannel};

    #[test]
    fn test_dialogue_colors_and_padding() {
        let mut store = StoryStore::new();
        let _ = store.upsert_chapter(Chapter::new("c1", "One"));
        let _ = store
            .add_dialogue_node(DialogueNode::dialogue("n1", "c1", "Hello").with_speaker("Alice"))
            .unwrap();
        let mut player = Player::start(&mut store);

        let scene = player.scene(&store).unwrap();
        let SceneContent::Dialogue(view) = scene.content else {
            panic!("expected dialogue");
        };
        assert_eq!(view.speaker.unwrap().color, DEFAULT_NAME_COLOR);
        assert_eq!(view.text_color, DEFAULT_DIALOGUE_COLOR);
        assert_eq!(view.text_padding, TextPosition::new(20, 20));
        assert_eq!(scene.hint, ClickHint::Continue);

        let _ = store.update_global_settings(SettingsPatch {
            dialogue_text_color: Some("#cccccc".to_string()),
            ..Default::default()
        });
        let _ = player.advance(&mut store);
        let Some(Scene {
            content: SceneContent::Dialogue(view),
            ..
        }) = player.scene(&store)
        else {
            panic!("expected dialogue");
        };
        assert_eq!(view.text_color, "#cccccc");
    }

    #[test]
    fn test_background_hint_and_clamp() {
        let mut store = StoryStore::new();
        let _ = store.upsert_chapter(Chapter::new("c1", "One"));
        let _ = store
            .add_dialogue_node(DialogueNode::background(
                "n1",
                "c1",
                vec![Background::color("#000"), Background::image("sky.png")],
            ))
            .unwrap();
        let mut player = Player::start(&mut store);

        let scene = player.scene(&store).unwrap();
        assert_eq!(scene.hint, ClickHint::SwitchBackground);
        assert_eq!(scene.background, Some(Background::color("#000")));

        let _ = player.advance(&mut store);
        let scene = player.scene(&store).unwrap();
        assert_eq!(scene.hint, ClickHint::Continue);
        assert_eq!(scene.background, Some(Background::image("sky.png")));
        assert_eq!(scene.content, SceneContent::Background);
    }

    #[test]
    fn test_choice_jump_and_sound_views() {
        let mut store = StoryStore::new();
        let _ = store.upsert_chapter(Chapter::new("c1", "One"));
        let _ = store.upsert_chapter(Chapter::new("c2", "Two"));
        let _ = store
            .add_dialogue_node(DialogueNode::choice(
                "q",
                "c1",
                vec![Choice::new("Left", "s"), Choice::new("Right", "j")],
            ))
            .unwrap();
        let _ = store
            .add_dialogue_node(DialogueNode::new("s", "c1", NodeKind::Sound))
            .unwrap();
        let _ = store
            .add_dialogue_node(DialogueNode::jump("j", "c1", "c2"))
            .unwrap();
        let mut player = Player::start(&mut store);

        let scene = player.scene(&store).unwrap();
        assert_eq!(scene.hint, ClickHint::Choose);
        assert_eq!(
            scene.content,
            SceneContent::Choice(ChoiceView {
                options: vec!["Left".to_string(), "Right".to_string()]
            })
        );

        let _ = player.select_choice(&mut store, 0);
        let SceneContent::Sound(cue) = player.scene(&store).unwrap().content else {
            panic!("expected sound");
        };
        assert_eq!(cue.channel, SoundChannel::Bgm);

        let _ = player.advance(&mut store);
        assert_eq!(
            player.scene(&store).unwrap().content,
            SceneContent::Jump(JumpView {
                target: Some("c2".into()),
                target_title: Some("Two".to_string()),
                show_transition_text: true,
                hide_bottom_panel: false,
            })
        );
    }

    #[test]
    fn test_idle_has_no_scene() {
        let store = StoryStore::new();
        assert!(Player::idle().scene(&store).is_none());
    }
}
