// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-based story player.
//!
//! Enter advances, a number selects a choice option (counting from 1) and
//! `q` quits. Input and output are generic so the loop runs the same on a
//! terminal and in tests.

use novella_graph::{BackgroundKind, ChapterId, StoryStore};
use novella_player::{AdvanceOutcome, ChoiceOutcome, Player, Scene, SceneContent};
use std::io::{self, BufRead, Write};

/// How a play loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayExit {
    /// The reader typed `q`
    Quit,
    /// Input ran out
    EndOfInput,
    /// There was nothing to play
    Idle,
}

/// Run the play loop until the reader quits or input ends
pub fn run_player<R: BufRead, W: Write>(
    store: &mut StoryStore,
    player: &mut Player,
    input: R,
    mut output: W,
) -> io::Result<PlayExit> {
    let Some(scene) = player.scene(store) else {
        writeln!(output, "Nothing to play.")?;
        return Ok(PlayExit::Idle);
    };
    let mut shown = Some(scene.node.clone());
    render(&scene, store, &mut output)?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(PlayExit::Quit);
        }

        let note = if line.is_empty() {
            advance_note(player.advance(store))
        } else {
            match line.parse::<usize>() {
                Ok(number) if number > 0 => choice_note(player.select_choice(store, number - 1)),
                _ => Some(format!("Unknown input {line:?}. Enter continues, q quits.")),
            }
        };
        if let Some(note) = &note {
            writeln!(output, "({note})")?;
        }

        match player.scene(store) {
            Some(scene) => {
                // Redraw only when something visible changed
                let moved = shown.as_ref() != Some(&scene.node);
                if moved || note.is_none() {
                    render(&scene, store, &mut output)?;
                }
                shown = Some(scene.node);
            }
            None => {
                writeln!(output, "The chapter is empty.")?;
                shown = None;
            }
        }
        output.flush()?;
    }

    Ok(PlayExit::EndOfInput)
}

fn advance_note(outcome: AdvanceOutcome) -> Option<String> {
    match outcome {
        AdvanceOutcome::Held => Some("The end of this chapter.".to_string()),
        AdvanceOutcome::AwaitingChoice => Some("Choose an option by number.".to_string()),
        AdvanceOutcome::DanglingTarget { chapter } => {
            Some(format!("Chapter {chapter} does not exist."))
        }
        AdvanceOutcome::Idle => Some("Nothing to play.".to_string()),
        AdvanceOutcome::Jumped { .. }
        | AdvanceOutcome::BackgroundAdvanced { .. }
        | AdvanceOutcome::Moved { .. } => None,
    }
}

fn choice_note(outcome: ChoiceOutcome) -> Option<String> {
    match outcome {
        ChoiceOutcome::Moved { .. } => None,
        ChoiceOutcome::DanglingTarget { target } => {
            Some(format!("That option leads nowhere ({target})."))
        }
        ChoiceOutcome::Unresolved => Some("That option has no target yet.".to_string()),
        ChoiceOutcome::OutOfRange { len, .. } => Some(format!("Pick a number from 1 to {len}.")),
        ChoiceOutcome::NotAChoice => Some("There is nothing to choose here.".to_string()),
        ChoiceOutcome::Idle => Some("Nothing to play.".to_string()),
    }
}

/// Write one scene as plain text
pub fn render<W: Write>(scene: &Scene, store: &StoryStore, output: &mut W) -> io::Result<()> {
    let title = store
        .chapter(scene.chapter.as_str())
        .map_or(scene.chapter.as_str(), |c| c.title.as_str());
    writeln!(output, "== {title} ==")?;

    if let Some(background) = &scene.background {
        let kind = match background.kind {
            BackgroundKind::Image => "image",
            BackgroundKind::Color => "color",
        };
        writeln!(output, "[background {kind}: {}]", background.value)?;
    }

    match &scene.content {
        SceneContent::Dialogue(view) => {
            match &view.speaker {
                Some(speaker) => writeln!(output, "{}: {}", speaker.name, view.text)?,
                None => writeln!(output, "{}", view.text)?,
            }
        }
        SceneContent::Choice(view) => {
            for (i, option) in view.options.iter().enumerate() {
                writeln!(output, "  {}. {}", i + 1, option)?;
            }
        }
        SceneContent::Jump(view) => {
            if view.show_transition_text {
                let target = view
                    .target_title
                    .as_deref()
                    .or(view.target.as_ref().map(ChapterId::as_str))
                    .unwrap_or("a new chapter");
                writeln!(output, "Moving to {target}...")?;
            }
        }
        SceneContent::Sound(cue) => {
            if !cue.url.is_empty() {
                writeln!(output, "[sound {:?}: {}]", cue.channel, cue.url)?;
            }
        }
        SceneContent::Background => {}
    }

    writeln!(output, "-- {}", scene.hint.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use novella_graph::{Background, Chapter, Choice, DialogueNode};
    use std::io::Cursor;

    fn story() -> StoryStore {
        let mut store = StoryStore::new();
        let _ = store.upsert_chapter(Chapter::new("c1", "Morning"));
        let _ = store.upsert_chapter(Chapter::new("c2", "Night"));
        for node in [
            DialogueNode::dialogue("n1", "c1", "Good morning.")
                .with_speaker("Alice")
                .with_backgrounds(vec![Background::image("room.png"), Background::color("#000")]),
            DialogueNode::choice(
                "n2",
                "c1",
                vec![Choice::new("Sleep", "n3"), Choice::new("Run", "gone")],
            ),
            DialogueNode::jump("n3", "c1", "c2"),
            DialogueNode::dialogue("m1", "c2", "Good night."),
        ] {
            let _ = store.add_dialogue_node(node).unwrap();
        }
        store
    }

    fn play(input: &str) -> (PlayExit, String) {
        let mut store = story();
        let mut player = Player::start(&mut store);
        let mut output = Vec::new();
        let exit = run_player(&mut store, &mut player, Cursor::new(input), &mut output).unwrap();
        (exit, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_full_walkthrough() {
        let (exit, output) = play("\n\n\n2\n1\n\n\nq\n");
        assert_eq!(exit, PlayExit::Quit);
        assert!(output.contains("Alice: Good morning."));
        assert!(output.contains("[background color: #000]"));
        assert!(output.contains("Choose an option by number."));
        assert!(output.contains("That option leads nowhere (gone)."));
        assert!(output.contains("Moving to Night..."));
        assert!(output.contains("== Night =="));
        assert!(output.contains("The end of this chapter."));
    }

    #[test]
    fn test_bad_input_is_reported() {
        let (exit, output) = play("hello\n0\n");
        assert_eq!(exit, PlayExit::EndOfInput);
        assert_eq!(output.matches("Unknown input").count(), 2);
    }

    #[test]
    fn test_empty_story() {
        let mut store = StoryStore::new();
        let mut player = Player::start(&mut store);
        let mut output = Vec::new();
        let exit = run_player(&mut store, &mut player, Cursor::new(""), &mut output).unwrap();
        assert_eq!(exit, PlayExit::Idle);
    }
}
