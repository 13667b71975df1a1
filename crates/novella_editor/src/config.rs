// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Read from a RON file (`novella.ron` by default). Every field is optional:
//!
//! ```ron
//! (
//!     storage_dir: ".novella",
//!     namespace: "galgame-storage",
//!     history_depth: 100,
//!     log_filter: "novella_editor=info",
//! )
//! ```

use crate::history::DEFAULT_HISTORY_DEPTH;
use crate::persistence::STORAGE_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "novella.ron";

/// Storage directory used when none is configured
pub const DEFAULT_STORAGE_DIR: &str = ".novella";

/// Log directive used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "novella_editor=info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid RON
    #[error("Invalid config {path:?}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: ron::error::SpannedError,
    },

    /// The config could not be encoded
    #[error("Failed to encode config: {0}")]
    Encode(#[from] ron::Error),

    /// A value is out of range
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory of the session store
    pub storage_dir: PathBuf,
    /// Key the session is stored under
    pub namespace: String,
    /// Undo history depth
    pub history_depth: usize,
    /// Log directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            namespace: STORAGE_NAMESPACE.to_string(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse RON text
    pub fn from_ron(text: &str, path: &Path) -> Result<Self> {
        let config: EditorConfig = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content, path)
    }

    /// Load a config file, or use defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save as pretty RON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".to_string()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_string()));
        }
        Ok(())
    }
}
