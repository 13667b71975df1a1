// SPDX-License-Identifier: MIT OR Apache-2.0
//! Asset catalogs and game flags.
//!
//! Catalogs are editor-session data. Dialogue nodes refer to characters by
//! free-text name, so nothing in the graph points into a catalog.

use crate::id::CharacterId;
use crate::node::SoundChannel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Flag name to value, in insertion order
pub type GameFlags = IndexMap<String, bool>;

/// One sprite of a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSprite {
    /// Sprite ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Image URL
    pub url: String,
    /// Emotion tag (e.g. "happy")
    #[serde(default)]
    pub emotion: String,
}

/// A reusable character definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique character ID
    pub id: CharacterId,
    /// Display name
    pub name: String,
    /// Available sprites
    #[serde(default)]
    pub sprites: Vec<CharacterSprite>,
}

impl Character {
    /// Create a character with no sprites
    pub fn new(id: impl Into<CharacterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sprites: Vec::new(),
        }
    }
}

/// Sound URLs grouped by channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundLibrary {
    /// Background music
    pub bgm: Vec<String>,
    /// Sound effects
    pub sfx: Vec<String>,
    /// Voice lines
    pub voice: Vec<String>,
}

impl SoundLibrary {
    /// URLs registered on a channel
    pub fn channel(&self, channel: SoundChannel) -> &[String] {
        match channel {
            SoundChannel::Bgm => &self.bgm,
            SoundChannel::Sfx => &self.sfx,
            SoundChannel::Voice => &self.voice,
        }
    }

    /// Mutable URL list of a channel
    pub fn channel_mut(&mut self, channel: SoundChannel) -> &mut Vec<String> {
        match channel {
            SoundChannel::Bgm => &mut self.bgm,
            SoundChannel::Sfx => &mut self.sfx,
            SoundChannel::Voice => &mut self.voice,
        }
    }

    /// Whether every channel is empty
    pub fn is_empty(&self) -> bool {
        self.bgm.is_empty() && self.sfx.is_empty() && self.voice.is_empty()
    }
}
