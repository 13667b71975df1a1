// SPDX-License-Identifier: MIT OR Apache-2.0
//! Story editing commands.
//!
//! Every store mutation the editor offers is a [`StoryCommand`]. Commands are
//! plain data, so a host can queue them, log them or send them over a wire
//! before [`crate::session::EditorSession::execute`] applies them.

use novella_graph::{
    Background, Chapter, ChapterId, Character, CharacterId, Choice, DialogueNode, EditOutcome,
    GraphError, NodeId, NodePatch, SettingsPatch, SoundChannel, StoryDocument, StoryStore,
};
use serde::{Deserialize, Serialize};

/// An editing operation on the story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoryCommand {
    /// Add a chapter or replace the one with the same id
    UpsertChapter(Chapter),
    /// Remove a chapter and its nodes
    RemoveChapter(ChapterId),
    /// Select the current chapter
    SetCurrentChapter(ChapterId),
    /// Unset the current chapter
    ClearCurrentChapter,
    /// Add a catalog character
    AddCharacter(Character),
    /// Remove a catalog character
    RemoveCharacter(CharacterId),
    /// Register a background URL
    AddBackground(String),
    /// Remove a background URL
    RemoveBackground(String),
    /// Register a sound URL
    AddSound {
        /// Channel
        channel: SoundChannel,
        /// URL
        url: String,
    },
    /// Remove a sound URL
    RemoveSound {
        /// Channel
        channel: SoundChannel,
        /// URL
        url: String,
    },
    /// Write a game flag
    SetGameFlag {
        /// Flag name
        name: String,
        /// New value
        value: bool,
    },
    /// Append a node
    AddNode(DialogueNode),
    /// Shallow-merge a patch into a node
    UpdateNode {
        /// Node
        id: NodeId,
        /// Fields to replace
        patch: NodePatch,
    },
    /// Remove a node
    RemoveNode(NodeId),
    /// Replace the node sequence
    ReorderNodes(Vec<DialogueNode>),
    /// Move one node to a new position
    MoveNode {
        /// Node
        id: NodeId,
        /// Target position
        to_index: usize,
    },
    /// Show the next background layer of a node
    AdvanceBackground(NodeId),
    /// Rewind a node's background sequence
    ResetBackground(NodeId),
    /// Append a background layer to a node
    PushBackgroundLayer {
        /// Node
        node: NodeId,
        /// New layer
        layer: Background,
    },
    /// Replace a background layer of a node
    ReplaceBackgroundLayer {
        /// Node
        node: NodeId,
        /// Layer index
        index: usize,
        /// New layer
        layer: Background,
    },
    /// Remove a background layer of a node
    RemoveBackgroundLayer {
        /// Node
        node: NodeId,
        /// Layer index
        index: usize,
    },
    /// Append an option to a choice node
    PushChoice {
        /// Choice node
        node: NodeId,
        /// New option
        choice: Choice,
    },
    /// Remove an option from a choice node
    RemoveChoice {
        /// Choice node
        node: NodeId,
        /// Option index
        index: usize,
    },
    /// Shallow-merge presentation settings
    UpdateSettings(SettingsPatch),
    /// Replace the story with a document
    Import(StoryDocument),
}

impl StoryCommand {
    /// Get a description of this command
    pub fn description(&self) -> &'static str {
        match self {
            Self::UpsertChapter(_) => "Edit Chapter",
            Self::RemoveChapter(_) => "Delete Chapter",
            Self::SetCurrentChapter(_) | Self::ClearCurrentChapter => "Select Chapter",
            Self::AddCharacter(_) => "Add Character",
            Self::RemoveCharacter(_) => "Delete Character",
            Self::AddBackground(_) | Self::AddSound { .. } => "Add Asset",
            Self::RemoveBackground(_) | Self::RemoveSound { .. } => "Delete Asset",
            Self::SetGameFlag { .. } => "Set Flag",
            Self::AddNode(_) => "Add Node",
            Self::UpdateNode { .. } => "Edit Node",
            Self::RemoveNode(_) => "Delete Node",
            Self::ReorderNodes(_) | Self::MoveNode { .. } => "Reorder Nodes",
            Self::AdvanceBackground(_) | Self::ResetBackground(_) => "Change Background",
            Self::PushBackgroundLayer { .. }
            | Self::ReplaceBackgroundLayer { .. }
            | Self::RemoveBackgroundLayer { .. } => "Edit Backgrounds",
            Self::PushChoice { .. } | Self::RemoveChoice { .. } => "Edit Choices",
            Self::UpdateSettings(_) => "Edit Settings",
            Self::Import(_) => "Import Story",
        }
    }

    /// Apply the command to a store
    pub fn apply(self, store: &mut StoryStore) -> Result<EditOutcome, GraphError> {
        let outcome = match self {
            Self::UpsertChapter(chapter) => store.upsert_chapter(chapter),
            Self::RemoveChapter(id) => store.remove_chapter(id.as_str()),
            Self::SetCurrentChapter(id) => store.set_current_chapter(id),
            Self::ClearCurrentChapter => store.clear_current_chapter(),
            Self::AddCharacter(character) => store.add_character(character),
            Self::RemoveCharacter(id) => store.remove_character(id.as_str()),
            Self::AddBackground(url) => store.add_background(url),
            Self::RemoveBackground(url) => store.remove_background(&url),
            Self::AddSound { channel, url } => store.add_sound(channel, url),
            Self::RemoveSound { channel, url } => store.remove_sound(channel, &url),
            Self::SetGameFlag { name, value } => store.set_game_flag(name, value),
            Self::AddNode(node) => store.add_dialogue_node(node)?,
            Self::UpdateNode { id, patch } => store.update_dialogue_node(id.as_str(), patch),
            Self::RemoveNode(id) => store.remove_dialogue_node(id.as_str()),
            Self::ReorderNodes(sequence) => store.reorder_dialogue_nodes(sequence)?,
            Self::MoveNode { id, to_index } => store.move_dialogue_node(id.as_str(), to_index),
            Self::AdvanceBackground(id) => store.advance_background(id.as_str()),
            Self::ResetBackground(id) => store.reset_background(id.as_str()),
            Self::PushBackgroundLayer { node, layer } => {
                store.push_background_layer(node.as_str(), layer)
            }
            Self::ReplaceBackgroundLayer { node, index, layer } => {
                store.replace_background_layer(node.as_str(), index, layer)
            }
            Self::RemoveBackgroundLayer { node, index } => {
                store.remove_background_layer(node.as_str(), index)
            }
            Self::PushChoice { node, choice } => store.push_choice(node.as_str(), choice),
            Self::RemoveChoice { node, index } => store.remove_choice(node.as_str(), index),
            Self::UpdateSettings(patch) => store.update_global_settings(patch),
            Self::Import(document) => store.import_config(document)?,
        };
        Ok(outcome)
    }
}
