// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback engine for `Novella`.
//!
//! This crate walks a [`novella_graph::StoryStore`] the way a reader does:
//! - Linear advance through a chapter's nodes
//! - Branching on choice selection
//! - Background sequences shown one layer per click
//! - Jumps into other chapters
//!
//! ## Architecture
//!
//! [`Player`] holds only a cursor (chapter and node). All story state stays in
//! the store; the only store mutations playback makes are background cursor
//! moves. Broken references never fail: every input resolves to a named
//! outcome, most of them no-ops. [`Scene`] is the read-only view a front end
//! draws for the active node.

pub mod player;
pub mod scene;

pub use player::{AdvanceOutcome, ChoiceOutcome, Player};
pub use scene::{
    ChoiceView, ClickHint, DialogueView, JumpView, Scene, SceneContent, Speaker,
    DEFAULT_NAME_COLOR, DEFAULT_DIALOGUE_COLOR,
};
