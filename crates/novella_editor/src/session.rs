// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session: the story store plus undo history, persistence and a
//! preview player.
//!
//! The session is the only writer of its store. Every applied command is
//! recorded for undo and the full story state is written to storage right
//! after, so a crash loses at most the edit in flight.

use crate::commands::StoryCommand;
use crate::config::EditorConfig;
use crate::history::{History, HistoryError, HistoryStats, StateSnapshot};
use crate::persistence::{KeyValueStore, MemoryStore, PersistError, PersistedSession};
use novella_graph::{
    DanglingReference, EditOutcome, GraphError, StoreEvent, StoryData, StoryDocument, StoryStore,
};
use novella_player::{AdvanceOutcome, ChoiceOutcome, Player, Scene};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The store rejected an edit or document
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Undo/redo failed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Storage failed
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// A session shared between threads. All access goes through one lock.
pub type SharedSession<S = MemoryStore> = Arc<RwLock<EditorSession<S>>>;

/// An editing session over one story
#[derive(Debug)]
pub struct EditorSession<S: KeyValueStore = MemoryStore> {
    store: StoryStore,
    history: History,
    storage: S,
    namespace: String,
    preview: Option<Player>,
}

impl<S: KeyValueStore> EditorSession<S> {
    /// Open the session saved in `storage`, or start an empty one
    pub fn open(storage: S, config: &EditorConfig) -> Result<Self> {
        let store = match PersistedSession::load(&storage, &config.namespace)? {
            Some(saved) => {
                tracing::info!("Loaded session {:?}", config.namespace);
                StoryStore::from_data(saved.story)
            }
            None => {
                tracing::info!("Starting new session {:?}", config.namespace);
                StoryStore::new()
            }
        };
        Ok(Self {
            store,
            history: History::with_max_depth(config.history_depth),
            storage,
            namespace: config.namespace.clone(),
            preview: None,
        })
    }

    /// Read-only store
    pub fn store(&self) -> &StoryStore {
        &self.store
    }

    /// Backing storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Storage key of this session
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Take the store's queued change notifications
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        self.store.take_events()
    }

    /// Apply a command. Applied commands are recorded and persisted; a
    /// rejected command leaves everything untouched.
    pub fn execute(&mut self, command: StoryCommand) -> Result<EditOutcome> {
        let description = command.description();
        let before = StateSnapshot::from_value(self.store.data())?;

        let outcome = match command.apply(&mut self.store) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("{} rejected: {}", description, e);
                return Err(e.into());
            }
        };

        if outcome.is_applied() {
            let after = StateSnapshot::from_value(self.store.data())?;
            self.history.record(description, before, after);
            tracing::debug!("Executed: {}", description);
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Undo the last applied command; returns its description
    pub fn undo(&mut self) -> Result<String> {
        let operation = self.history.undo()?;
        let data: StoryData = operation.before.to_value()?;
        self.store.restore(data);
        tracing::debug!("Undo: {}", operation.description);
        self.persist()?;
        Ok(operation.description)
    }

    /// Redo the last undone command; returns its description
    pub fn redo(&mut self) -> Result<String> {
        let operation = self.history.redo()?;
        let data: StoryData = operation.after.to_value()?;
        self.store.restore(data);
        tracing::debug!("Redo: {}", operation.description);
        self.persist()?;
        Ok(operation.description)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Description of the next undo
    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    /// Description of the next redo
    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// History statistics
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Write the full story state to storage
    pub fn persist(&mut self) -> Result<()> {
        PersistedSession::new(self.store.snapshot()).save(&mut self.storage, &self.namespace)?;
        Ok(())
    }

    /// Import a JSON document as one undoable command
    pub fn import_json(&mut self, text: &str) -> Result<EditOutcome> {
        let document = StoryDocument::from_json_str(text)?;
        self.execute(StoryCommand::Import(document))
    }

    /// Export the story as a document
    pub fn export_document(&self) -> StoryDocument {
        let document = self.store.export_document();
        tracing::info!(
            "Exported {} chapters and {} nodes",
            document.chapters.len(),
            document.dialogue_nodes.len()
        );
        document
    }

    /// Export the story as pretty JSON
    pub fn export_json(&self) -> Result<String> {
        Ok(self.export_document().to_json_string()?)
    }

    /// References playback would ignore
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        self.store.dangling_references()
    }

    // --- Preview ---

    /// Start previewing at the current chapter, or at the first chapter when
    /// none is selected
    pub fn start_preview(&mut self) -> Result<Option<Scene>> {
        let player = match self.store.current_chapter().cloned() {
            Some(chapter) => Player::start_at(&mut self.store, chapter.as_str()),
            None => Player::start(&mut self.store),
        };
        tracing::info!("Entered preview");
        let scene = player.scene(&self.store);
        self.preview = Some(player);
        self.persist()?;
        Ok(scene)
    }

    /// Stop previewing
    pub fn stop_preview(&mut self) {
        if self.preview.take().is_some() {
            tracing::info!("Stopped preview");
        }
    }

    /// Whether a preview is running
    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Current preview scene
    pub fn preview_scene(&self) -> Option<Scene> {
        self.preview.as_ref()?.scene(&self.store)
    }

    /// Send an advance input to the preview
    pub fn preview_advance(&mut self) -> Result<AdvanceOutcome> {
        let Some(player) = self.preview.as_mut() else {
            return Ok(AdvanceOutcome::Idle);
        };
        let outcome = player.advance(&mut self.store);
        self.persist()?;
        Ok(outcome)
    }

    /// Send a choice selection to the preview
    pub fn preview_choice(&mut self, index: usize) -> Result<ChoiceOutcome> {
        let Some(player) = self.preview.as_mut() else {
            return Ok(ChoiceOutcome::Idle);
        };
        let outcome = player.select_choice(&mut self.store, index);
        self.persist()?;
        Ok(outcome)
    }

    /// Wrap the session for sharing between threads
    pub fn into_shared(self) -> SharedSession<S> {
        Arc::new(RwLock::new(self))
    }
}

impl EditorSession<MemoryStore> {
    /// An empty session that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            store: StoryStore::new(),
            history: History::new(),
            storage: MemoryStore::new(),
            namespace: crate::persistence::STORAGE_NAMESPACE.to_string(),
            preview: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{FileStore, STORAGE_NAMESPACE};
    use novella_graph::{Background, Chapter, ChapterId, Character, Choice, DialogueNode, NodePatch};

    fn build(session: &mut EditorSession<impl KeyValueStore>) {
        for command in [
            StoryCommand::UpsertChapter(Chapter::new("c1", "One")),
            StoryCommand::AddNode(DialogueNode::dialogue("n1", "c1", "Hello")),
            StoryCommand::AddNode(DialogueNode::choice(
                "n2",
                "c1",
                vec![Choice::new("Again", "n1")],
            )),
            StoryCommand::AddCharacter(Character::new("alice", "Alice")),
            StoryCommand::SetCurrentChapter("c1".into()),
        ] {
            assert_eq!(session.execute(command).unwrap(), EditOutcome::Applied);
        }
    }

    #[test]
    fn test_undo_redo_restores_snapshots() {
        let mut session = EditorSession::in_memory();
        build(&mut session);
        let built = session.store().snapshot();

        let _ = session
            .execute(StoryCommand::RemoveChapter("c1".into()))
            .unwrap();
        assert_eq!(session.store().node_count(), 0);
        assert_eq!(session.undo_description(), Some("Delete Chapter"));

        assert_eq!(session.undo().unwrap(), "Delete Chapter");
        assert_eq!(session.store().snapshot(), built);

        let _ = session.redo().unwrap();
        assert_eq!(session.store().chapter_count(), 0);
        assert!(!session.can_redo());
    }

    #[test]
    fn test_unchanged_and_rejected_are_not_recorded() {
        let mut session = EditorSession::in_memory();
        build(&mut session);
        let depth = session.history_stats().undo_count;

        let outcome = session
            .execute(StoryCommand::UpdateNode {
                id: "missing".into(),
                patch: NodePatch::text("x"),
            })
            .unwrap();
        assert_eq!(outcome, EditOutcome::NotFound);
        let err = session
            .execute(StoryCommand::AddNode(DialogueNode::dialogue("n1", "c1", "again")))
            .unwrap_err();
        assert!(matches!(err, SessionError::Graph(GraphError::DuplicateNode(_))));
        assert_eq!(session.history_stats().undo_count, depth);
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig {
            storage_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let mut session = EditorSession::open(FileStore::new(dir.path()), &config).unwrap();
        build(&mut session);
        let _ = session
            .execute(StoryCommand::AddBackground("sky.png".to_string()))
            .unwrap();
        let saved = session.store().snapshot();
        drop(session);

        let reopened = EditorSession::open(FileStore::new(dir.path()), &config).unwrap();
        assert_eq!(reopened.store().snapshot(), saved);
        assert_eq!(reopened.store().characters().count(), 1);
        assert!(!reopened.can_undo());
    }

    #[test]
    fn test_import_is_undoable_and_resets_catalogs() {
        let mut session = EditorSession::in_memory();
        build(&mut session);
        let built = session.store().snapshot();

        let json = r#"{"chapters": [{"id": "x", "title": "X"}], "dialogueNodes": []}"#;
        let _ = session.import_json(json).unwrap();
        assert_eq!(session.store().characters().count(), 0);
        assert_eq!(session.store().current_chapter().map(ChapterId::as_str), Some("x"));

        assert!(session.import_json("{}").is_err());
        assert_eq!(session.undo().unwrap(), "Import Story");
        assert_eq!(session.store().snapshot(), built);
    }

    #[test]
    fn test_preview_starts_at_current_chapter() {
        let mut session = EditorSession::in_memory();
        build(&mut session);
        let _ = session
            .execute(StoryCommand::UpsertChapter(Chapter::new("c2", "Two")))
            .unwrap();
        let _ = session
            .execute(StoryCommand::AddNode(
                DialogueNode::dialogue("m1", "c2", "Elsewhere")
                    .with_backgrounds(vec![Background::color("#1"), Background::color("#2")]),
            ))
            .unwrap();
        let _ = session
            .execute(StoryCommand::SetCurrentChapter("c2".into()))
            .unwrap();

        let scene = session.start_preview().unwrap().unwrap();
        assert_eq!(scene.node, "m1");
        assert!(matches!(
            session.preview_advance().unwrap(),
            AdvanceOutcome::BackgroundAdvanced { index: 1, .. }
        ));
        assert_eq!(session.preview_advance().unwrap(), AdvanceOutcome::Held);

        session.stop_preview();
        assert_eq!(session.preview_advance().unwrap(), AdvanceOutcome::Idle);
        assert_eq!(session.preview_choice(0).unwrap(), ChoiceOutcome::Idle);
    }

    #[test]
    fn test_shared_session() {
        let shared = EditorSession::in_memory().into_shared();
        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let _ = shared
                    .write()
                    .execute(StoryCommand::UpsertChapter(Chapter::new("c1", "One")))
                    .unwrap();
            })
        };
        writer.join().unwrap();
        assert_eq!(shared.read().store().chapter_count(), 1);
        assert!(shared
            .read()
            .storage()
            .get(STORAGE_NAMESPACE)
            .unwrap()
            .is_some());
    }
}
