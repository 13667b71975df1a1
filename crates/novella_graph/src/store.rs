// SPDX-License-Identifier: MIT OR Apache-2.0
//! The story store: single source of truth for a story being edited or played.

use crate::catalog::{Character, GameFlags, SoundLibrary};
use crate::chapter::Chapter;
use crate::codec::StoryDocument;
use crate::error::{GraphError, Result};
use crate::id::{ChapterId, CharacterId, NodeId};
use crate::node::{Background, Choice, DialogueNode, NodeKind, NodePatch, SoundChannel};
use crate::settings::{GameSettings, SettingsPatch};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EditOutcome {
    /// The store changed
    Applied,
    /// The target exists but the edit changed nothing
    Unchanged,
    /// No entity with the given id (or index)
    NotFound,
}

impl EditOutcome {
    /// Whether the store changed
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Change notification, queued by every applied mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A chapter was added or replaced
    ChapterUpserted(ChapterId),
    /// A chapter and its nodes were removed
    ChapterRemoved {
        /// Removed chapter
        chapter: ChapterId,
        /// Number of nodes removed with it
        removed_nodes: usize,
    },
    /// The editor's current chapter changed
    CurrentChapterChanged(Option<ChapterId>),
    /// Character catalog changed
    CharactersChanged,
    /// A node was appended
    NodeAdded(NodeId),
    /// A node's content changed
    NodeUpdated(NodeId),
    /// A node was removed
    NodeRemoved(NodeId),
    /// Node order changed
    NodesReordered,
    /// A node's background cursor moved
    BackgroundCursorMoved {
        /// Node
        node: NodeId,
        /// New cursor
        index: usize,
    },
    /// Background or sound URL lists changed
    AssetsChanged,
    /// A flag was written
    FlagSet {
        /// Flag name
        name: String,
        /// New value
        value: bool,
    },
    /// Settings changed
    SettingsChanged,
    /// Chapters and nodes were replaced by a document
    Imported {
        /// Imported chapter count
        chapters: usize,
        /// Imported node count
        nodes: usize,
    },
    /// The whole state was replaced (undo, redo, session load)
    Restored,
}

/// Every piece of persisted story state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryData {
    chapters: IndexMap<ChapterId, Chapter>,
    characters: IndexMap<CharacterId, Character>,
    nodes: IndexMap<NodeId, DialogueNode>,
    backgrounds: Vec<String>,
    sounds: SoundLibrary,
    current_chapter: Option<ChapterId>,
    flags: GameFlags,
    settings: GameSettings,
}

/// Owned story state with atomic, outcome-reporting mutations
#[derive(Debug, Clone, Default)]
pub struct StoryStore {
    data: StoryData,
    events: Vec<StoreEvent>,
}

impl StoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding previously saved state
    pub fn from_data(data: StoryData) -> Self {
        Self {
            data,
            events: Vec::new(),
        }
    }

    /// Borrow the full state
    pub fn data(&self) -> &StoryData {
        &self.data
    }

    /// Copy of the full state
    pub fn snapshot(&self) -> StoryData {
        self.data.clone()
    }

    /// Replace the full state
    pub fn restore(&mut self, data: StoryData) {
        self.data = data;
        self.events.push(StoreEvent::Restored);
    }

    /// Take the queued change notifications
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: StoreEvent) -> EditOutcome {
        tracing::trace!(?event, "story changed");
        self.events.push(event);
        EditOutcome::Applied
    }

    // --- Selectors ---

    /// All chapters in creation order
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.data.chapters.values()
    }

    /// Get a chapter by ID
    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.data.chapters.get(id)
    }

    /// Number of chapters
    pub fn chapter_count(&self) -> usize {
        self.data.chapters.len()
    }

    /// The chapter selected in the editor
    pub fn current_chapter(&self) -> Option<&ChapterId> {
        self.data.current_chapter.as_ref()
    }

    /// All nodes in sequence order
    pub fn nodes(&self) -> impl Iterator<Item = &DialogueNode> {
        self.data.nodes.values()
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.data.nodes.get(id)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.data.nodes.len()
    }

    /// Nodes of one chapter, in sequence order
    pub fn chapter_nodes<'a>(&'a self, chapter: &'a str) -> impl Iterator<Item = &'a DialogueNode> + 'a {
        self.data
            .nodes
            .values()
            .filter(move |n| n.chapter_id.as_str() == chapter)
    }

    /// First node of a chapter
    pub fn first_node_in(&self, chapter: &str) -> Option<&DialogueNode> {
        self.data
            .nodes
            .values()
            .find(|n| n.chapter_id.as_str() == chapter)
    }

    /// The node that follows `id` within its own chapter
    pub fn next_in_chapter(&self, id: &str) -> Option<&DialogueNode> {
        let (index, _, node) = self.data.nodes.get_full(id)?;
        let chapter = &node.chapter_id;
        self.data
            .nodes
            .values()
            .skip(index + 1)
            .find(|n| n.chapter_id == *chapter)
    }

    /// Character catalog
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.data.characters.values()
    }

    /// Background URL catalog
    pub fn backgrounds(&self) -> &[String] {
        &self.data.backgrounds
    }

    /// Sound URL catalog
    pub fn sounds(&self) -> &SoundLibrary {
        &self.data.sounds
    }

    /// Game flags
    pub fn flags(&self) -> &GameFlags {
        &self.data.flags
    }

    /// Read a flag (unset flags read as false)
    pub fn flag(&self, name: &str) -> bool {
        self.data.flags.get(name).copied().unwrap_or(false)
    }

    /// Presentation settings
    pub fn settings(&self) -> &GameSettings {
        &self.data.settings
    }

    // --- Chapters ---

    /// Add a chapter, or replace the one with the same id in place
    pub fn upsert_chapter(&mut self, chapter: Chapter) -> EditOutcome {
        if self.data.chapters.get(&chapter.id) == Some(&chapter) {
            return EditOutcome::Unchanged;
        }
        let id = chapter.id.clone();
        self.data.chapters.insert(id.clone(), chapter);
        tracing::debug!("Upserted chapter {}", id);
        self.emit(StoreEvent::ChapterUpserted(id))
    }

    /// Remove a chapter together with all of its nodes
    pub fn remove_chapter(&mut self, id: &str) -> EditOutcome {
        let Some((chapter, _)) = self.data.chapters.shift_remove_entry(id) else {
            return EditOutcome::NotFound;
        };

        let before = self.data.nodes.len();
        self.data.nodes.retain(|_, n| n.chapter_id != chapter);
        let removed_nodes = before - self.data.nodes.len();

        if self.data.current_chapter.as_ref() == Some(&chapter) {
            self.data.current_chapter = None;
            self.events.push(StoreEvent::CurrentChapterChanged(None));
        }

        tracing::debug!("Removed chapter {} and {} nodes", chapter, removed_nodes);
        self.emit(StoreEvent::ChapterRemoved {
            chapter,
            removed_nodes,
        })
    }

    /// Select the editor's current chapter. The id is not validated.
    pub fn set_current_chapter(&mut self, id: impl Into<ChapterId>) -> EditOutcome {
        let id = id.into();
        if self.data.current_chapter.as_ref() == Some(&id) {
            return EditOutcome::Unchanged;
        }
        self.data.current_chapter = Some(id.clone());
        self.emit(StoreEvent::CurrentChapterChanged(Some(id)))
    }

    /// Unset the editor's current chapter
    pub fn clear_current_chapter(&mut self) -> EditOutcome {
        if self.data.current_chapter.take().is_none() {
            return EditOutcome::Unchanged;
        }
        self.emit(StoreEvent::CurrentChapterChanged(None))
    }

    // --- Catalogs ---

    /// Add a character (replaces one with the same id)
    pub fn add_character(&mut self, character: Character) -> EditOutcome {
        if self.data.characters.get(&character.id) == Some(&character) {
            return EditOutcome::Unchanged;
        }
        self.data.characters.insert(character.id.clone(), character);
        self.emit(StoreEvent::CharactersChanged)
    }

    /// Remove a character
    pub fn remove_character(&mut self, id: &str) -> EditOutcome {
        if self.data.characters.shift_remove(id).is_none() {
            return EditOutcome::NotFound;
        }
        self.emit(StoreEvent::CharactersChanged)
    }

    /// Register a background URL
    pub fn add_background(&mut self, url: impl Into<String>) -> EditOutcome {
        self.data.backgrounds.push(url.into());
        self.emit(StoreEvent::AssetsChanged)
    }

    /// Remove every entry equal to `url`
    pub fn remove_background(&mut self, url: &str) -> EditOutcome {
        let before = self.data.backgrounds.len();
        self.data.backgrounds.retain(|b| b != url);
        if self.data.backgrounds.len() == before {
            return EditOutcome::NotFound;
        }
        self.emit(StoreEvent::AssetsChanged)
    }

    /// Register a sound URL on a channel
    pub fn add_sound(&mut self, channel: SoundChannel, url: impl Into<String>) -> EditOutcome {
        self.data.sounds.channel_mut(channel).push(url.into());
        self.emit(StoreEvent::AssetsChanged)
    }

    /// Remove every entry equal to `url` from a channel
    pub fn remove_sound(&mut self, channel: SoundChannel, url: &str) -> EditOutcome {
        let list = self.data.sounds.channel_mut(channel);
        let before = list.len();
        list.retain(|s| s != url);
        if list.len() == before {
            return EditOutcome::NotFound;
        }
        self.emit(StoreEvent::AssetsChanged)
    }

    /// Write a flag
    pub fn set_game_flag(&mut self, name: impl Into<String>, value: bool) -> EditOutcome {
        let name = name.into();
        if self.data.flags.insert(name.clone(), value) == Some(value) {
            return EditOutcome::Unchanged;
        }
        self.emit(StoreEvent::FlagSet { name, value })
    }

    // --- Nodes ---

    /// Append a node to the end of the sequence
    pub fn add_dialogue_node(&mut self, mut node: DialogueNode) -> Result<EditOutcome> {
        if self.data.nodes.contains_key(&node.id) {
            tracing::warn!("Rejected node with duplicate id {}", node.id);
            return Err(GraphError::DuplicateNode(node.id));
        }
        node.normalize_for_insert();
        let id = node.id.clone();
        self.data.nodes.insert(id.clone(), node);
        tracing::debug!("Added node {}", id);
        Ok(self.emit(StoreEvent::NodeAdded(id)))
    }

    /// Shallow-merge a patch into a node
    pub fn update_dialogue_node(&mut self, id: &str, patch: NodePatch) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        let mut updated = node.clone();
        patch.apply_to(&mut updated);
        updated.clamp_background_cursor();
        if updated == *node {
            return EditOutcome::Unchanged;
        }
        *node = updated;
        let id = node.id.clone();
        self.emit(StoreEvent::NodeUpdated(id))
    }

    /// Remove a node. Choices that point at it are left dangling.
    pub fn remove_dialogue_node(&mut self, id: &str) -> EditOutcome {
        match self.data.nodes.shift_remove_entry(id) {
            Some((id, _)) => {
                tracing::debug!("Removed node {}", id);
                self.emit(StoreEvent::NodeRemoved(id))
            }
            None => EditOutcome::NotFound,
        }
    }

    /// Replace the node sequence.
    ///
    /// The sequence must hold exactly the stored node ids, each once; node
    /// contents are taken from the sequence.
    pub fn reorder_dialogue_nodes(&mut self, sequence: Vec<DialogueNode>) -> Result<EditOutcome> {
        let mut reordered = IndexMap::with_capacity(sequence.len());
        for mut node in sequence {
            if reordered.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode(node.id));
            }
            node.clamp_background_cursor();
            reordered.insert(node.id.clone(), node);
        }

        let missing: Vec<NodeId> = self
            .data
            .nodes
            .keys()
            .filter(|id| !reordered.contains_key(*id))
            .cloned()
            .collect();
        let unexpected: Vec<NodeId> = reordered
            .keys()
            .filter(|id| !self.data.nodes.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            tracing::warn!(
                "Rejected reorder: {} missing, {} unexpected",
                missing.len(),
                unexpected.len()
            );
            return Err(GraphError::NotAPermutation { missing, unexpected });
        }

        if self.data.nodes.iter().eq(reordered.iter()) {
            return Ok(EditOutcome::Unchanged);
        }
        self.data.nodes = reordered;
        Ok(self.emit(StoreEvent::NodesReordered))
    }

    /// Move one node to a new sequence position, shifting the nodes in between
    pub fn move_dialogue_node(&mut self, id: &str, to_index: usize) -> EditOutcome {
        let Some(from) = self.data.nodes.get_index_of(id) else {
            return EditOutcome::NotFound;
        };
        let to = to_index.min(self.data.nodes.len() - 1);
        if from == to {
            return EditOutcome::Unchanged;
        }
        self.data.nodes.move_index(from, to);
        self.emit(StoreEvent::NodesReordered)
    }

    /// Show the next background layer of a node, unless it is on the last one
    pub fn advance_background(&mut self, id: &str) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        if !node.has_pending_background() {
            return EditOutcome::Unchanged;
        }
        let index = node.background_cursor() + 1;
        node.current_background_index = Some(index);
        let node = node.id.clone();
        self.emit(StoreEvent::BackgroundCursorMoved { node, index })
    }

    /// Rewind a node's background sequence to its first layer
    pub fn reset_background(&mut self, id: &str) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        if node.backgrounds.is_empty() || node.current_background_index == Some(0) {
            return EditOutcome::Unchanged;
        }
        node.current_background_index = Some(0);
        let node = node.id.clone();
        self.emit(StoreEvent::BackgroundCursorMoved { node, index: 0 })
    }

    /// Append a background layer to a node and rewind its cursor
    pub fn push_background_layer(&mut self, id: &str, layer: Background) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        node.backgrounds.push(layer);
        node.current_background_index = Some(0);
        let id = node.id.clone();
        self.emit(StoreEvent::NodeUpdated(id))
    }

    /// Replace one background layer of a node
    pub fn replace_background_layer(&mut self, id: &str, index: usize, layer: Background) -> EditOutcome {
        let Some(slot) = self
            .data
            .nodes
            .get_mut(id)
            .and_then(|n| n.backgrounds.get_mut(index))
        else {
            return EditOutcome::NotFound;
        };
        if *slot == layer {
            return EditOutcome::Unchanged;
        }
        *slot = layer;
        self.emit(StoreEvent::NodeUpdated(id.into()))
    }

    /// Remove one background layer of a node
    pub fn remove_background_layer(&mut self, id: &str, index: usize) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        if index >= node.backgrounds.len() {
            return EditOutcome::NotFound;
        }
        node.backgrounds.remove(index);
        node.clamp_background_cursor();
        let id = node.id.clone();
        self.emit(StoreEvent::NodeUpdated(id))
    }

    /// Append an option to a choice node. Other node types are left as is.
    pub fn push_choice(&mut self, id: &str, choice: Choice) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        if node.kind != NodeKind::Choice {
            return EditOutcome::Unchanged;
        }
        node.choices.push(choice);
        let id = node.id.clone();
        self.emit(StoreEvent::NodeUpdated(id))
    }

    /// Remove an option from a choice node
    pub fn remove_choice(&mut self, id: &str, index: usize) -> EditOutcome {
        let Some(node) = self.data.nodes.get_mut(id) else {
            return EditOutcome::NotFound;
        };
        if index >= node.choices.len() {
            return EditOutcome::NotFound;
        }
        node.choices.remove(index);
        let id = node.id.clone();
        self.emit(StoreEvent::NodeUpdated(id))
    }

    // --- Settings ---

    /// Shallow-merge a settings patch
    pub fn update_global_settings(&mut self, patch: SettingsPatch) -> EditOutcome {
        let mut settings = self.data.settings.clone();
        patch.apply_to(&mut settings);
        if settings == self.data.settings {
            return EditOutcome::Unchanged;
        }
        self.data.settings = settings;
        self.emit(StoreEvent::SettingsChanged)
    }

    // --- Import ---

    /// Replace chapters, nodes and settings with a document's content.
    ///
    /// Catalogs and flags are not part of a document and are reset to empty.
    /// The first imported chapter becomes current. A document repeating a
    /// chapter or node id is rejected.
    pub fn import_config(&mut self, document: StoryDocument) -> Result<EditOutcome> {
        let StoryDocument {
            chapters,
            dialogue_nodes,
            settings,
        } = document;

        let mut nodes = IndexMap::with_capacity(dialogue_nodes.len());
        for mut node in dialogue_nodes {
            if nodes.contains_key(&node.id) {
                tracing::warn!("Rejected import: duplicate node id {}", node.id);
                return Err(GraphError::DuplicateNode(node.id));
            }
            node.normalize_for_insert();
            nodes.insert(node.id.clone(), node);
        }

        let mut chapter_map = IndexMap::with_capacity(chapters.len());
        for chapter in chapters {
            if chapter_map.contains_key(&chapter.id) {
                tracing::warn!("Rejected import: duplicate chapter id {}", chapter.id);
                return Err(GraphError::DuplicateChapter(chapter.id));
            }
            chapter_map.insert(chapter.id.clone(), chapter);
        }

        let current_chapter = chapter_map.keys().next().cloned();
        let (chapter_count, node_count) = (chapter_map.len(), nodes.len());
        self.data = StoryData {
            chapters: chapter_map,
            characters: IndexMap::new(),
            nodes,
            backgrounds: Vec::new(),
            sounds: SoundLibrary::default(),
            current_chapter,
            flags: GameFlags::new(),
            settings: settings.unwrap_or_default().resolve(),
        };

        tracing::info!("Imported {} chapters and {} nodes", chapter_count, node_count);
        Ok(self.emit(StoreEvent::Imported {
            chapters: chapter_count,
            nodes: node_count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SoundCue;
    use crate::settings::TextPosition;
    use proptest::prelude::*;

    fn two_chapter_store() -> StoryStore {
        let mut store = StoryStore::new();
        let _ = store.upsert_chapter(Chapter::new("c1", "One"));
        let _ = store.upsert_chapter(Chapter::new("c2", "Two"));
        for (id, chapter) in [("a", "c1"), ("b", "c2"), ("c", "c1"), ("d", "c2"), ("e", "c1")] {
            let _ = store
                .add_dialogue_node(DialogueNode::dialogue(id, chapter, id))
                .unwrap();
        }
        store
    }

    fn ids(store: &StoryStore) -> Vec<&str> {
        store.nodes().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_upsert_chapter_replaces_in_place() {
        let mut store = two_chapter_store();
        assert_eq!(
            store.upsert_chapter(Chapter::new("c1", "Renamed")),
            EditOutcome::Applied
        );
        assert_eq!(
            store.upsert_chapter(Chapter::new("c1", "Renamed")),
            EditOutcome::Unchanged
        );

        let titles: Vec<_> = store.chapters().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Renamed", "Two"]);
    }

    #[test]
    fn test_remove_chapter_cascades() {
        let mut store = two_chapter_store();
        let _ = store.set_current_chapter("c1");
        store.take_events();

        assert_eq!(store.remove_chapter("c1"), EditOutcome::Applied);
        assert_eq!(ids(&store), ["b", "d"]);
        assert_eq!(store.current_chapter(), None);
        assert_eq!(
            store.take_events(),
            vec![
                StoreEvent::CurrentChapterChanged(None),
                StoreEvent::ChapterRemoved {
                    chapter: "c1".into(),
                    removed_nodes: 3
                },
            ]
        );
        assert_eq!(store.remove_chapter("c1"), EditOutcome::NotFound);
    }

    #[test]
    fn test_remove_other_chapter_keeps_selection() {
        let mut store = two_chapter_store();
        let _ = store.set_current_chapter("c1");
        let _ = store.remove_chapter("c2");
        assert_eq!(store.current_chapter().map(ChapterId::as_str), Some("c1"));
    }

    #[test]
    fn test_set_current_chapter_is_not_validated() {
        let mut store = StoryStore::new();
        assert_eq!(store.set_current_chapter("draft"), EditOutcome::Applied);
        assert_eq!(store.current_chapter().map(ChapterId::as_str), Some("draft"));
    }

    #[test]
    fn test_add_node_normalizes() {
        let mut store = StoryStore::new();
        let mut node = DialogueNode::new("bg", "c1", NodeKind::Background);
        node.backgrounds = vec![Background::color("#000"), Background::color("#fff")];
        node.current_background_index = Some(1);
        let _ = store.add_dialogue_node(node).unwrap();
        let _ = store
            .add_dialogue_node(DialogueNode::new("s", "c1", NodeKind::Sound))
            .unwrap();

        assert_eq!(store.node("bg").unwrap().current_background_index, Some(0));
        assert_eq!(store.node("s").unwrap().sound, Some(SoundCue::default()));
    }

    #[test]
    fn test_add_node_keeps_sound_payload() {
        let mut store = StoryStore::new();
        let cue = SoundCue {
            channel: SoundChannel::Voice,
            url: "line.ogg".to_string(),
        };
        let _ = store
            .add_dialogue_node(DialogueNode::sound("s", "c1", cue.clone()))
            .unwrap();
        assert_eq!(store.node("s").unwrap().sound, Some(cue));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut store = two_chapter_store();
        let err = store
            .add_dialogue_node(DialogueNode::dialogue("a", "c2", "again"))
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateNode(id) if id == "a"));
        assert_eq!(store.node("a").unwrap().chapter_id, "c1");
        assert_eq!(store.node_count(), 5);
    }

    #[test]
    fn test_update_node() {
        let mut store = two_chapter_store();
        assert_eq!(
            store.update_dialogue_node("a", NodePatch::text("changed")),
            EditOutcome::Applied
        );
        assert_eq!(store.node("a").unwrap().text.as_deref(), Some("changed"));
        assert_eq!(
            store.update_dialogue_node("a", NodePatch::text("changed")),
            EditOutcome::Unchanged
        );
        assert_eq!(
            store.update_dialogue_node("zz", NodePatch::text("x")),
            EditOutcome::NotFound
        );
    }

    #[test]
    fn test_update_clamps_background_cursor() {
        let mut store = StoryStore::new();
        let layers = vec![Background::color("#1"), Background::color("#2"), Background::color("#3")];
        let _ = store
            .add_dialogue_node(DialogueNode::background("n", "c1", layers))
            .unwrap();
        let _ = store.advance_background("n");
        let _ = store.advance_background("n");

        let _ = store.update_dialogue_node(
            "n",
            NodePatch {
                backgrounds: Some(vec![Background::color("#1")]),
                ..Default::default()
            },
        );
        assert_eq!(store.node("n").unwrap().current_background_index, Some(0));

        let _ = store.update_dialogue_node(
            "n",
            NodePatch {
                backgrounds: Some(Vec::new()),
                ..Default::default()
            },
        );
        assert_eq!(store.node("n").unwrap().current_background_index, None);
    }

    #[test]
    fn test_remove_node_leaves_dangling_choice() {
        let mut store = two_chapter_store();
        let _ = store
            .add_dialogue_node(DialogueNode::choice("q", "c1", vec![Choice::new("Go", "c")]))
            .unwrap();
        assert_eq!(store.remove_dialogue_node("c"), EditOutcome::Applied);
        assert_eq!(store.node("q").unwrap().choices[0].next_id, "c");
        assert_eq!(store.remove_dialogue_node("c"), EditOutcome::NotFound);
    }

    #[test]
    fn test_reorder_accepts_permutation() {
        let mut store = two_chapter_store();
        let mut sequence: Vec<_> = store.nodes().cloned().collect();
        sequence.reverse();
        assert_eq!(
            store.reorder_dialogue_nodes(sequence).unwrap(),
            EditOutcome::Applied
        );
        assert_eq!(ids(&store), ["e", "d", "c", "b", "a"]);

        let same: Vec<_> = store.nodes().cloned().collect();
        assert_eq!(store.reorder_dialogue_nodes(same).unwrap(), EditOutcome::Unchanged);
    }

    #[test]
    fn test_reorder_rejects_dropped_node() {
        let mut store = two_chapter_store();
        let sequence: Vec<_> = store.nodes().filter(|n| n.id != "c").cloned().collect();

        let err = store.reorder_dialogue_nodes(sequence).unwrap_err();
        match err {
            GraphError::NotAPermutation { missing, unexpected } => {
                assert_eq!(missing, vec![NodeId::from("c")]);
                assert!(unexpected.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ids(&store), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_reorder_rejects_duplicates_and_strangers() {
        let mut store = two_chapter_store();
        let mut sequence: Vec<_> = store.nodes().cloned().collect();
        sequence.push(store.node("a").unwrap().clone());
        assert!(matches!(
            store.reorder_dialogue_nodes(sequence),
            Err(GraphError::DuplicateNode(_))
        ));

        let mut sequence: Vec<_> = store.nodes().cloned().collect();
        sequence.push(DialogueNode::dialogue("new", "c1", "?"));
        assert!(matches!(
            store.reorder_dialogue_nodes(sequence),
            Err(GraphError::NotAPermutation { .. })
        ));
    }

    #[test]
    fn test_move_node() {
        let mut store = two_chapter_store();
        assert_eq!(store.move_dialogue_node("e", 0), EditOutcome::Applied);
        assert_eq!(ids(&store), ["e", "a", "b", "c", "d"]);
        assert_eq!(store.move_dialogue_node("e", 99), EditOutcome::Applied);
        assert_eq!(ids(&store), ["a", "b", "c", "d", "e"]);
        assert_eq!(store.move_dialogue_node("e", 4), EditOutcome::Unchanged);
        assert_eq!(store.move_dialogue_node("zz", 0), EditOutcome::NotFound);
    }

    #[test]
    fn test_next_in_chapter_skips_other_chapters() {
        let store = two_chapter_store();
        assert_eq!(store.next_in_chapter("a").map(|n| n.id.as_str()), Some("c"));
        assert_eq!(store.next_in_chapter("b").map(|n| n.id.as_str()), Some("d"));
        assert!(store.next_in_chapter("e").is_none());
        assert_eq!(store.first_node_in("c2").map(|n| n.id.as_str()), Some("b"));
    }

    #[test]
    fn test_advance_background_is_idempotent_at_end() {
        let mut store = StoryStore::new();
        let _ = store
            .add_dialogue_node(DialogueNode::background(
                "n",
                "c1",
                vec![Background::color("#1"), Background::color("#2")],
            ))
            .unwrap();

        assert_eq!(store.advance_background("n"), EditOutcome::Applied);
        let before = store.snapshot();
        assert_eq!(store.advance_background("n"), EditOutcome::Unchanged);
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.advance_background("missing"), EditOutcome::NotFound);

        assert_eq!(store.reset_background("n"), EditOutcome::Applied);
        assert_eq!(store.reset_background("n"), EditOutcome::Unchanged);
    }

    #[test]
    fn test_background_layer_editing() {
        let mut store = StoryStore::new();
        let _ = store
            .add_dialogue_node(DialogueNode::dialogue("n", "c1", "Hi"))
            .unwrap();
        let _ = store.push_background_layer("n", Background::color("#1"));
        let _ = store.push_background_layer("n", Background::color("#2"));
        let _ = store.advance_background("n");

        assert_eq!(
            store.replace_background_layer("n", 1, Background::image("sky.png")),
            EditOutcome::Applied
        );
        assert_eq!(
            store.replace_background_layer("n", 5, Background::image("x.png")),
            EditOutcome::NotFound
        );
        assert_eq!(store.remove_background_layer("n", 1), EditOutcome::Applied);

        let node = store.node("n").unwrap();
        assert_eq!(node.backgrounds, vec![Background::color("#1")]);
        assert_eq!(node.current_background_index, Some(0));
    }

    #[test]
    fn test_choice_editing() {
        let mut store = two_chapter_store();
        let _ = store
            .add_dialogue_node(DialogueNode::choice("q", "c1", Vec::new()))
            .unwrap();
        assert_eq!(store.push_choice("q", Choice::new("A", "a")), EditOutcome::Applied);
        assert_eq!(store.push_choice("a", Choice::new("A", "a")), EditOutcome::Unchanged);
        assert_eq!(store.remove_choice("q", 3), EditOutcome::NotFound);
        assert_eq!(store.remove_choice("q", 0), EditOutcome::Applied);
        assert!(store.node("q").unwrap().choices.is_empty());
    }

    #[test]
    fn test_catalogs() {
        let mut store = StoryStore::new();
        let _ = store.add_character(Character::new("alice", "Alice"));
        let _ = store.add_background("sky.png");
        let _ = store.add_background("sky.png");
        let _ = store.add_sound(SoundChannel::Sfx, "door.ogg");

        assert_eq!(store.characters().count(), 1);
        assert_eq!(store.remove_background("sky.png"), EditOutcome::Applied);
        assert!(store.backgrounds().is_empty());
        assert_eq!(store.remove_background("sky.png"), EditOutcome::NotFound);
        assert_eq!(store.sounds().channel(SoundChannel::Sfx), ["door.ogg"]);
        assert_eq!(
            store.remove_sound(SoundChannel::Bgm, "door.ogg"),
            EditOutcome::NotFound
        );
        assert_eq!(
            store.remove_sound(SoundChannel::Sfx, "door.ogg"),
            EditOutcome::Applied
        );
        assert_eq!(store.remove_character("alice"), EditOutcome::Applied);
        assert_eq!(store.remove_character("alice"), EditOutcome::NotFound);
    }

    #[test]
    fn test_flags() {
        let mut store = StoryStore::new();
        assert!(!store.flag("door_open"));
        assert_eq!(store.set_game_flag("door_open", true), EditOutcome::Applied);
        assert_eq!(store.set_game_flag("door_open", true), EditOutcome::Unchanged);
        assert!(store.flag("door_open"));
    }

    #[test]
    fn test_update_settings() {
        let mut store = StoryStore::new();
        let patch = SettingsPatch {
            character_name_position: Some(TextPosition::new(0, 8)),
            ..Default::default()
        };
        assert_eq!(store.update_global_settings(patch.clone()), EditOutcome::Applied);
        assert_eq!(store.update_global_settings(patch), EditOutcome::Unchanged);
        assert_eq!(
            store.settings().character_name_position,
            TextPosition::new(0, 8)
        );
        assert_eq!(store.settings().dialogue_text_position, TextPosition::default());
    }

    #[test]
    fn test_import_resets_catalogs() {
        let mut store = two_chapter_store();
        let _ = store.add_character(Character::new("alice", "Alice"));
        let _ = store.add_background("sky.png");
        let _ = store.add_sound(SoundChannel::Bgm, "theme.ogg");
        let _ = store.set_game_flag("met", true);

        let document = StoryDocument {
            chapters: vec![Chapter::new("x", "X")],
            dialogue_nodes: vec![DialogueNode::dialogue("x1", "x", "Hello")],
            settings: None,
        };
        assert_eq!(store.import_config(document).unwrap(), EditOutcome::Applied);

        assert_eq!(store.characters().count(), 0);
        assert!(store.backgrounds().is_empty());
        assert!(store.sounds().is_empty());
        assert!(store.flags().is_empty());
        assert_eq!(store.current_chapter().map(ChapterId::as_str), Some("x"));
        assert_eq!(ids(&store), ["x1"]);
        assert_eq!(store.settings(), &GameSettings::default());
    }

    #[test]
    fn test_import_empty_document_unsets_chapter() {
        let mut store = two_chapter_store();
        let _ = store.set_current_chapter("c1");
        let document = StoryDocument {
            chapters: Vec::new(),
            dialogue_nodes: Vec::new(),
            settings: None,
        };
        let _ = store.import_config(document).unwrap();
        assert_eq!(store.current_chapter(), None);
        assert_eq!(store.node_count(), 0);
    }

    #[test]
    fn test_import_rejects_duplicate_nodes() {
        let mut store = two_chapter_store();
        let before = store.snapshot();
        let document = StoryDocument {
            chapters: vec![Chapter::new("x", "X")],
            dialogue_nodes: vec![
                DialogueNode::dialogue("x1", "x", "one"),
                DialogueNode::dialogue("x1", "x", "two"),
            ],
            settings: None,
        };
        assert!(store.import_config(document).is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_import_rejects_duplicate_chapters() {
        let mut store = two_chapter_store();
        let before = store.snapshot();
        let document = StoryDocument {
            chapters: vec![
                Chapter::new("x", "First"),
                Chapter::new("y", "Other"),
                Chapter::new("x", "Second"),
            ],
            dialogue_nodes: vec![DialogueNode::dialogue("x1", "x", "one")],
            settings: None,
        };
        assert!(matches!(
            store.import_config(document),
            Err(GraphError::DuplicateChapter(id)) if id == "x"
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { chapter: u8, layers: usize },
        Advance(u8),
        Reset(u8),
        SetLayers { node: u8, layers: usize },
        SetCursor { node: u8, index: usize },
        RemoveLayer { node: u8, index: usize },
        RemoveNode(u8),
        RemoveChapter(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..3, 0usize..4).prop_map(|(chapter, layers)| Op::Add { chapter, layers }),
            (0u8..12).prop_map(Op::Advance),
            (0u8..12).prop_map(Op::Reset),
            (0u8..12, 0usize..4).prop_map(|(node, layers)| Op::SetLayers { node, layers }),
            (0u8..12, 0usize..6).prop_map(|(node, index)| Op::SetCursor { node, index }),
            (0u8..12, 0usize..4).prop_map(|(node, index)| Op::RemoveLayer { node, index }),
            (0u8..12).prop_map(Op::RemoveNode),
            (0u8..3).prop_map(Op::RemoveChapter),
        ]
    }

    fn layers(count: usize) -> Vec<Background> {
        (0..count).map(|i| Background::color(format!("#{i}"))).collect()
    }

    proptest! {
        #[test]
        fn prop_background_cursor_stays_in_bounds(ops in prop::collection::vec(op(), 0..48)) {
            let mut store = StoryStore::new();
            let mut next = 0u8;
            for op in ops {
                match op {
                    Op::Add { chapter, layers: count } => {
                        let node = DialogueNode::background(format!("n{next}"), format!("c{chapter}"), layers(count));
                        next += 1;
                        let _ = store.add_dialogue_node(node).unwrap();
                    }
                    Op::Advance(n) => { let _ = store.advance_background(&format!("n{n}")); }
                    Op::Reset(n) => { let _ = store.reset_background(&format!("n{n}")); }
                    Op::SetLayers { node, layers: count } => {
                        let _ = store.update_dialogue_node(&format!("n{node}"), NodePatch {
                            backgrounds: Some(layers(count)),
                            ..Default::default()
                        });
                    }
                    Op::SetCursor { node, index } => {
                        let _ = store.update_dialogue_node(&format!("n{node}"), NodePatch {
                            current_background_index: Some(index),
                            ..Default::default()
                        });
                    }
                    Op::RemoveLayer { node, index } => { let _ = store.remove_background_layer(&format!("n{node}"), index); }
                    Op::RemoveNode(n) => { let _ = store.remove_dialogue_node(&format!("n{n}")); }
                    Op::RemoveChapter(c) => { let _ = store.remove_chapter(&format!("c{c}")); }
                }

                for node in store.nodes() {
                    match node.current_background_index {
                        None => prop_assert!(node.backgrounds.is_empty()),
                        Some(index) => prop_assert!(index < node.backgrounds.len()),
                    }
                }
            }
        }

        #[test]
        fn prop_remove_chapter_keeps_other_nodes_in_order(
            owners in prop::collection::vec(0u8..4, 0..24),
            removed in 0u8..4,
        ) {
            let mut store = StoryStore::new();
            for c in 0..4u8 {
                let _ = store.upsert_chapter(Chapter::new(format!("c{c}"), ""));
            }
            for (i, owner) in owners.iter().enumerate() {
                let _ = store.add_dialogue_node(DialogueNode::dialogue(format!("n{i}"), format!("c{owner}"), "")).unwrap();
            }
            let removed_chapter = format!("c{removed}");
            let expected: Vec<DialogueNode> = store
                .nodes()
                .filter(|n| n.chapter_id.as_str() != removed_chapter)
                .cloned()
                .collect();

            let _ = store.remove_chapter(&removed_chapter);
            let remaining: Vec<DialogueNode> = store.nodes().cloned().collect();
            prop_assert_eq!(remaining, expected);
            prop_assert!(store.chapter(&removed_chapter).is_none());
        }
    }
}
