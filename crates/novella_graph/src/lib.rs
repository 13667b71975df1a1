// SPDX-License-Identifier: MIT OR Apache-2.0
//! Narrative graph model for `Novella`.
//!
//! This crate owns everything a branching story is made of:
//! - Chapters and their optional unlock conditions
//! - Dialogue nodes (dialogue, choice, background, sound, jump)
//! - Asset catalogs (characters, background and sound URLs)
//! - Game flags and presentation settings
//!
//! ## Architecture
//!
//! [`StoryStore`] is the single source of truth. Every mutation is atomic and
//! reports an explicit [`EditOutcome`]; edits that would break an invariant are
//! rejected with a [`GraphError`] and leave the store untouched. References
//! between nodes and chapters are allowed to dangle while a story is being
//! written; [`StoryStore::dangling_references`] lists them.
//!
//! The [`codec`] module converts a store to and from the portable JSON
//! story document.

pub mod audit;
pub mod catalog;
pub mod chapter;
pub mod codec;
pub mod error;
pub mod id;
pub mod node;
pub mod settings;
pub mod store;

pub use audit::DanglingReference;
pub use catalog::{Character, CharacterSprite, GameFlags, SoundLibrary};
pub use chapter::{Chapter, ChapterCondition, ConditionKind};
pub use codec::{DocumentSettings, PartialTextPosition, StoryDocument};
pub use error::{GraphError, Result};
pub use id::{ChapterId, CharacterId, NodeId};
pub use node::{
    Background, BackgroundKind, Choice, DialogueNode, JumpConfig, NodeKind, NodePatch, SoundChannel,
    SoundCue,
};
pub use settings::{GameSettings, SettingsPatch, TextPosition, DEFAULT_PADDING, DEFAULT_TEXT_COLOR};
pub use store::{EditOutcome, StoreEvent, StoryData, StoryStore};
