// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dialogue node definitions.
//!
//! A [`DialogueNode`] is one step of the story. Its `type` decides which of the
//! optional payload fields playback looks at; the others are carried along so
//! switching a node's type in the editor never loses data.

use crate::id::{ChapterId, NodeId};
use serde::{Deserialize, Serialize};

/// Node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A line of dialogue or narration
    #[default]
    Dialogue,
    /// A branching menu
    Choice,
    /// A background change
    Background,
    /// A sound cue
    Sound,
    /// A jump into another chapter
    Jump,
}

impl NodeKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dialogue => "Dialogue",
            Self::Choice => "Choice",
            Self::Background => "Background",
            Self::Sound => "Sound",
            Self::Jump => "Jump",
        }
    }
}

/// One option of a choice node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Option label
    pub text: String,
    /// Target node; empty while unresolved
    #[serde(default)]
    pub next_id: NodeId,
}

impl Choice {
    /// Create a new option
    pub fn new(text: impl Into<String>, next_id: impl Into<NodeId>) -> Self {
        Self {
            text: text.into(),
            next_id: next_id.into(),
        }
    }

    /// The target, unless it was never filled in
    pub fn target(&self) -> Option<&NodeId> {
        (!self.next_id.is_unset()).then_some(&self.next_id)
    }
}

/// How a background layer is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// `value` is an image URL
    #[default]
    Image,
    /// `value` is a CSS color
    Color,
}

/// A background layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    /// Layer kind
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// Image URL or color
    pub value: String,
    /// Optional display duration
    #[serde(default)]
    pub duration: Option<u32>,
}

impl Background {
    /// Image layer
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Image,
            value: url.into(),
            duration: None,
        }
    }

    /// Solid color layer
    pub fn color(color: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Color,
            value: color.into(),
            duration: None,
        }
    }
}

/// Audio channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundChannel {
    /// Background music
    #[default]
    Bgm,
    /// Sound effect
    Sfx,
    /// Voice line
    Voice,
}

impl SoundChannel {
    /// Get all channels
    pub fn all() -> &'static [SoundChannel] {
        &[SoundChannel::Bgm, SoundChannel::Sfx, SoundChannel::Voice]
    }
}

/// Sound payload of a sound node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    /// Output channel
    #[serde(rename = "type")]
    pub channel: SoundChannel,
    /// Audio URL; empty until the author picks one
    #[serde(default)]
    pub url: String,
}

/// Presentation options of a jump node. Traversal ignores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JumpConfig {
    /// Show the "moving to a new chapter" text (default: true)
    #[serde(default)]
    pub show_transition_text: Option<bool>,
    /// Hide the bottom panel while the jump node is shown (default: false)
    #[serde(default)]
    pub hide_bottom_panel: Option<bool>,
}

impl JumpConfig {
    /// Effective transition text flag
    pub fn shows_transition_text(&self) -> bool {
        self.show_transition_text.unwrap_or(true)
    }

    /// Effective bottom panel flag
    pub fn hides_bottom_panel(&self) -> bool {
        self.hide_bottom_panel.unwrap_or(false)
    }
}

/// A node of the story graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueNode {
    /// Unique node ID
    pub id: NodeId,
    /// Owning chapter
    #[serde(default)]
    pub chapter_id: ChapterId,
    /// Node type
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Speaker name shown above the text
    #[serde(default)]
    pub character_name: Option<String>,
    /// Speaker name color
    #[serde(default)]
    pub character_color: Option<String>,
    /// Dialogue text color
    #[serde(default)]
    pub text_color: Option<String>,
    /// Catalog character reference
    #[serde(default)]
    pub character: Option<String>,
    /// Sprite reference
    #[serde(default)]
    pub sprite: Option<String>,
    /// Dialogue text
    #[serde(default)]
    pub text: Option<String>,
    /// Choice options, in display order
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Background layers, shown one after another
    #[serde(default)]
    pub backgrounds: Vec<Background>,
    /// Index of the visible background layer
    #[serde(default)]
    pub current_background_index: Option<usize>,
    /// Sound payload
    #[serde(default)]
    pub sound: Option<SoundCue>,
    /// Explicit successor link (carried, not used by playback)
    #[serde(default)]
    pub next_id: Option<NodeId>,
    /// Jump target chapter
    #[serde(default)]
    pub target_chapter_id: Option<ChapterId>,
    /// Jump presentation options
    #[serde(default)]
    pub jump_config: Option<JumpConfig>,
}

impl DialogueNode {
    /// Create an empty node of the given kind
    pub fn new(id: impl Into<NodeId>, chapter_id: impl Into<ChapterId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            chapter_id: chapter_id.into(),
            kind,
            character_name: None,
            character_color: None,
            text_color: None,
            character: None,
            sprite: None,
            text: None,
            choices: Vec::new(),
            backgrounds: Vec::new(),
            current_background_index: None,
            sound: None,
            next_id: None,
            target_chapter_id: None,
            jump_config: None,
        }
    }

    /// Dialogue line
    pub fn dialogue(
        id: impl Into<NodeId>,
        chapter_id: impl Into<ChapterId>,
        text: impl Into<String>,
    ) -> Self {
        let mut node = Self::new(id, chapter_id, NodeKind::Dialogue);
        node.text = Some(text.into());
        node
    }

    /// Choice menu
    pub fn choice(
        id: impl Into<NodeId>,
        chapter_id: impl Into<ChapterId>,
        choices: Vec<Choice>,
    ) -> Self {
        let mut node = Self::new(id, chapter_id, NodeKind::Choice);
        node.choices = choices;
        node
    }

    /// Background change
    pub fn background(
        id: impl Into<NodeId>,
        chapter_id: impl Into<ChapterId>,
        backgrounds: Vec<Background>,
    ) -> Self {
        Self::new(id, chapter_id, NodeKind::Background).with_backgrounds(backgrounds)
    }

    /// Sound cue
    pub fn sound(id: impl Into<NodeId>, chapter_id: impl Into<ChapterId>, cue: SoundCue) -> Self {
        let mut node = Self::new(id, chapter_id, NodeKind::Sound);
        node.sound = Some(cue);
        node
    }

    /// Jump into another chapter
    pub fn jump(
        id: impl Into<NodeId>,
        chapter_id: impl Into<ChapterId>,
        target: impl Into<ChapterId>,
    ) -> Self {
        let mut node = Self::new(id, chapter_id, NodeKind::Jump);
        node.target_chapter_id = Some(target.into());
        node
    }

    /// Set the speaker
    pub fn with_speaker(mut self, name: impl Into<String>) -> Self {
        self.character_name = Some(name.into());
        self
    }

    /// Set the background layers
    pub fn with_backgrounds(mut self, backgrounds: Vec<Background>) -> Self {
        self.backgrounds = backgrounds;
        self.current_background_index = (!self.backgrounds.is_empty()).then_some(0);
        self
    }

    /// Set the jump presentation options
    pub fn with_jump_config(mut self, config: JumpConfig) -> Self {
        self.jump_config = Some(config);
        self
    }

    /// Cursor into the background sequence (0 when unset)
    pub fn background_cursor(&self) -> usize {
        self.current_background_index.unwrap_or(0)
    }

    /// The visible background layer
    pub fn current_background(&self) -> Option<&Background> {
        let last = self.backgrounds.len().checked_sub(1)?;
        self.backgrounds.get(self.background_cursor().min(last))
    }

    /// Whether another background layer is waiting to be shown
    pub fn has_pending_background(&self) -> bool {
        self.background_cursor() + 1 < self.backgrounds.len()
    }

    /// Effective jump options
    pub fn jump_options(&self) -> JumpConfig {
        self.jump_config.unwrap_or_default()
    }

    /// Prepare a node for insertion: cursor at the first layer, and an empty
    /// sound payload on sound nodes.
    pub(crate) fn normalize_for_insert(&mut self) {
        self.current_background_index = (!self.backgrounds.is_empty()).then_some(0);
        if self.kind == NodeKind::Sound && self.sound.is_none() {
            self.sound = Some(SoundCue::default());
        }
    }

    /// Keep the cursor inside the background sequence
    pub(crate) fn clamp_background_cursor(&mut self) {
        self.current_background_index = match self.backgrounds.len() {
            0 => None,
            len => Some(self.background_cursor().min(len - 1)),
        };
    }
}

/// Shallow update of a node: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePatch {
    /// Move to another chapter
    pub chapter_id: Option<ChapterId>,
    /// Change the node type
    #[serde(rename = "type")]
    pub kind: Option<NodeKind>,
    /// Speaker name
    pub character_name: Option<String>,
    /// Speaker name color
    pub character_color: Option<String>,
    /// Dialogue text color
    pub text_color: Option<String>,
    /// Catalog character reference
    pub character: Option<String>,
    /// Sprite reference
    pub sprite: Option<String>,
    /// Dialogue text
    pub text: Option<String>,
    /// Choice options
    pub choices: Option<Vec<Choice>>,
    /// Background layers
    pub backgrounds: Option<Vec<Background>>,
    /// Background cursor
    pub current_background_index: Option<usize>,
    /// Sound payload
    pub sound: Option<SoundCue>,
    /// Successor link
    pub next_id: Option<NodeId>,
    /// Jump target
    pub target_chapter_id: Option<ChapterId>,
    /// Jump options
    pub jump_config: Option<JumpConfig>,
}

impl NodePatch {
    /// Patch that only replaces the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Patch that only moves the node to another chapter
    pub fn chapter(chapter_id: impl Into<ChapterId>) -> Self {
        Self {
            chapter_id: Some(chapter_id.into()),
            ..Default::default()
        }
    }

    /// Whether the patch touches nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into a node
    pub fn apply_to(self, node: &mut DialogueNode) {
        if let Some(chapter_id) = self.chapter_id {
            node.chapter_id = chapter_id;
        }
        if let Some(kind) = self.kind {
            node.kind = kind;
        }
        let optional_text = [
            (self.character_name, &mut node.character_name),
            (self.character_color, &mut node.character_color),
            (self.text_color, &mut node.text_color),
            (self.character, &mut node.character),
            (self.sprite, &mut node.sprite),
            (self.text, &mut node.text),
        ];
        for (value, slot) in optional_text {
            if value.is_some() {
                *slot = value;
            }
        }
        if let Some(choices) = self.choices {
            node.choices = choices;
        }
        if let Some(backgrounds) = self.backgrounds {
            node.backgrounds = backgrounds;
        }
        if self.current_background_index.is_some() {
            node.current_background_index = self.current_background_index;
        }
        if self.sound.is_some() {
            node.sound = self.sound;
        }
        if self.next_id.is_some() {
            node.next_id = self.next_id;
        }
        if self.target_chapter_id.is_some() {
            node.target_chapter_id = self.target_chapter_id;
        }
        if self.jump_config.is_some() {
            node.jump_config = self.jump_config;
        }
    }
}
