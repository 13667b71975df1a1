// SPDX-License-Identifier: MIT OR Apache-2.0
//! Durable session storage.
//!
//! The editor keeps its whole story state under one key of a key-value
//! store. [`FileStore`] keeps one RON file per key in a directory;
//! [`MemoryStore`] is for tests and embedding.

use indexmap::IndexMap;
use novella_graph::StoryData;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key the editor session is stored under
pub const STORAGE_NAMESPACE: &str = "galgame-storage";

/// Current persisted session format version
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Extension of the files written by [`FileStore`]
pub const FILE_EXTENSION: &str = "ron";

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session could not be encoded
    #[error("Failed to encode session: {0}")]
    Encode(#[from] ron::Error),

    /// The stored session could not be parsed
    #[error("Failed to parse stored session: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// The stored session was written by a newer version
    #[error("Session version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in storage
        found: u32,
        /// Newest readable version
        supported: u32,
    },

    /// The key cannot be used as a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistError>;

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: IndexMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.shift_remove(key).is_some())
    }
}

/// One RON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, which is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write next to the target so the rename stays on one filesystem
        let tmp = path.with_extension(format!("{FILE_EXTENSION}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stored form of an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Format version
    pub version: u32,
    /// Full story state
    pub story: StoryData,
}

impl PersistedSession {
    /// Wrap story state in the current format
    pub fn new(story: StoryData) -> Self {
        Self {
            version: SESSION_FORMAT_VERSION,
            story,
        }
    }

    /// Encode as pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Parse, rejecting sessions written by a newer version
    pub fn from_ron(text: &str) -> Result<Self> {
        let session: PersistedSession = ron::from_str(text)?;
        if session.version > SESSION_FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: session.version,
                supported: SESSION_FORMAT_VERSION,
            });
        }
        Ok(session)
    }

    /// Load from storage; `None` when nothing was saved yet
    pub fn load(storage: &impl KeyValueStore, key: &str) -> Result<Option<Self>> {
        storage
            .get(key)?
            .map(|text| Self::from_ron(&text))
            .transpose()
    }

    /// Save to storage
    pub fn save(&self, storage: &mut impl KeyValueStore, key: &str) -> Result<()> {
        storage.put(key, &self.to_ron()?)
    }
}
