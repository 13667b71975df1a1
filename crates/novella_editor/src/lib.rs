// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session for `Novella` stories.
//!
//! This crate wraps a [`novella_graph::StoryStore`] for interactive editing:
//! - Serializable [`StoryCommand`]s for every store mutation
//! - Snapshot-based undo/redo
//! - Durable session storage behind a [`KeyValueStore`]
//! - RON configuration
//! - The `novella` command line (terminal player, check, import, export)

pub mod cli;
pub mod commands;
pub mod config;
pub mod history;
pub mod persistence;
pub mod session;
pub mod terminal;

pub use commands::StoryCommand;
pub use config::{ConfigError, EditorConfig};
pub use history::{History, HistoryError};
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, PersistError, PersistedSession, STORAGE_NAMESPACE,
};
pub use session::{EditorSession, SessionError, SharedSession};
