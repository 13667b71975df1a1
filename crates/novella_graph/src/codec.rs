// SPDX-License-Identifier: MIT OR Apache-2.0
//! Portable story document.
//!
//! Shape of the JSON document:
//!
//! ```json
//! {
//!   "chapters": [{"id": "c1", "title": "Intro"}],
//!   "dialogueNodes": [{"id": "n1", "chapterId": "c1", "type": "dialogue", "text": "Hi"}],
//!   "settings": {
//!     "characterNamePosition": {"paddingLeft": 20, "paddingRight": 20},
//!     "characterNameColor": "#ffffff",
//!     "dialogueTextPosition": {"paddingLeft": 20, "paddingRight": 20},
//!     "dialogueTextColor": "#ffffff"
//!   }
//! }
//! ```
//!
//! Only chapters, nodes and settings travel in a document. Catalogs and flags
//! stay with the editor session and are cleared by an import.

use crate::chapter::Chapter;
use crate::error::{GraphError, Result};
use crate::node::DialogueNode;
use crate::settings::{GameSettings, TextPosition, DEFAULT_PADDING};
use crate::store::{EditOutcome, StoryStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Padding pair as it may appear in a hand-written document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialTextPosition {
    /// Left padding
    pub padding_left: Option<i32>,
    /// Right padding
    pub padding_right: Option<i32>,
}

impl PartialTextPosition {
    fn resolve(self) -> TextPosition {
        TextPosition::new(
            self.padding_left.unwrap_or(DEFAULT_PADDING),
            self.padding_right.unwrap_or(DEFAULT_PADDING),
        )
    }
}

impl From<TextPosition> for PartialTextPosition {
    fn from(position: TextPosition) -> Self {
        Self {
            padding_left: Some(position.padding_left),
            padding_right: Some(position.padding_right),
        }
    }
}

/// Settings block of a document; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    /// Speaker name region
    pub character_name_position: Option<PartialTextPosition>,
    /// Speaker name color
    pub character_name_color: Option<String>,
    /// Dialogue text region
    pub dialogue_text_position: Option<PartialTextPosition>,
    /// Dialogue text color
    pub dialogue_text_color: Option<String>,
}

impl DocumentSettings {
    /// Store settings, with [`DEFAULT_PADDING`] wherever padding is missing
    pub fn resolve(self) -> GameSettings {
        GameSettings {
            character_name_position: self.character_name_position.unwrap_or_default().resolve(),
            character_name_color: self.character_name_color,
            dialogue_text_position: self.dialogue_text_position.unwrap_or_default().resolve(),
            dialogue_text_color: self.dialogue_text_color,
        }
    }
}

impl From<GameSettings> for DocumentSettings {
    fn from(settings: GameSettings) -> Self {
        Self {
            character_name_position: Some(settings.character_name_position.into()),
            character_name_color: settings.character_name_color,
            dialogue_text_position: Some(settings.dialogue_text_position.into()),
            dialogue_text_color: settings.dialogue_text_color,
        }
    }
}

/// A story as exchanged with other editors and players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDocument {
    /// Chapters in order
    pub chapters: Vec<Chapter>,
    /// Nodes in sequence order
    pub dialogue_nodes: Vec<DialogueNode>,
    /// Presentation settings
    #[serde(default)]
    pub settings: Option<DocumentSettings>,
}

impl StoryDocument {
    /// Export a store, with settings fully materialized
    pub fn from_store(store: &StoryStore) -> Self {
        Self {
            chapters: store.chapters().cloned().collect(),
            dialogue_nodes: store.nodes().cloned().collect(),
            settings: Some(store.settings().materialized().into()),
        }
    }

    /// Parse a document, rejecting input without `chapters` and
    /// `dialogueNodes` arrays
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Parse a document from raw bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Validate and convert an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        for field in ["chapters", "dialogueNodes"] {
            if !value.get(field).is_some_and(Value::is_array) {
                return Err(GraphError::MalformedDocument(format!(
                    "`{field}` must be an array"
                )));
            }
        }
        serde_json::from_value(value).map_err(|e| GraphError::MalformedDocument(e.to_string()))
    }

    /// Pretty JSON with two-space indentation
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl StoryStore {
    /// Export the story as a document
    pub fn export_document(&self) -> StoryDocument {
        StoryDocument::from_store(self)
    }

    /// Validate and import a JSON document. A rejected document leaves the
    /// store untouched.
    pub fn import_json(&mut self, text: &str) -> Result<EditOutcome> {
        let document = StoryDocument::from_json_str(text)?;
        self.import_config(document)
    }
}
