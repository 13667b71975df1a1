// SPDX-License-Identifier: MIT OR Apache-2.0
//! Global presentation settings.

use serde::{Deserialize, Serialize};

/// Padding used wherever a document or an old session leaves it out
pub const DEFAULT_PADDING: i32 = 20;

/// Name and text color written on export when none was chosen
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Horizontal padding of a text region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPosition {
    /// Left padding in pixels
    pub padding_left: i32,
    /// Right padding in pixels
    pub padding_right: i32,
}

impl TextPosition {
    /// Create a position
    pub fn new(padding_left: i32, padding_right: i32) -> Self {
        Self {
            padding_left,
            padding_right,
        }
    }
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::new(DEFAULT_PADDING, DEFAULT_PADDING)
    }
}

/// Rendering offsets and default colors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Speaker name region
    pub character_name_position: TextPosition,
    /// Speaker name color
    #[serde(default)]
    pub character_name_color: Option<String>,
    /// Dialogue text region
    pub dialogue_text_position: TextPosition,
    /// Dialogue text color
    #[serde(default)]
    pub dialogue_text_color: Option<String>,
}

impl GameSettings {
    /// Copy with every color filled in
    pub fn materialized(&self) -> Self {
        Self {
            character_name_color: Some(
                self.character_name_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            ),
            dialogue_text_color: Some(
                self.dialogue_text_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            ),
            ..self.clone()
        }
    }
}

/// Shallow settings update. A position is replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// New speaker name region
    pub character_name_position: Option<TextPosition>,
    /// New speaker name color
    pub character_name_color: Option<String>,
    /// New dialogue text region
    pub dialogue_text_position: Option<TextPosition>,
    /// New dialogue text color
    pub dialogue_text_color: Option<String>,
}

impl SettingsPatch {
    /// Whether the patch touches nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into settings
    pub fn apply_to(self, settings: &mut GameSettings) {
        if let Some(position) = self.character_name_position {
            settings.character_name_position = position;
        }
        if self.character_name_color.is_some() {
            settings.character_name_color = self.character_name_color;
        }
        if let Some(position) = self.dialogue_text_position {
            settings.dialogue_text_position = position;
        }
        if self.dialogue_text_color.is_some() {
            settings.dialogue_text_color = self.dialogue_text_color;
        }
    }
}
