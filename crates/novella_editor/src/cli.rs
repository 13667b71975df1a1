// SPDX-License-Identifier: MIT OR Apache-2.0
//! `novella` command line.

use crate::config::{ConfigError, EditorConfig, CONFIG_FILE_NAME};
use crate::persistence::FileStore;
use crate::session::{EditorSession, SessionError};
use crate::terminal::{self, PlayExit};
use clap::{Parser, Subcommand};
use novella_graph::{GraphError, StoryStore};
use novella_player::Player;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Novella - branching story player and session tool
#[derive(Debug, Parser)]
#[command(name = "novella")]
#[command(about = "Play, check, import and export branching stories")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./novella.ron, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session storage directory, overriding the config
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a story document in the terminal
    Play {
        /// Story document (JSON)
        document: PathBuf,
        /// Chapter to start at (default: the first)
        #[arg(long)]
        chapter: Option<String>,
    },
    /// Validate a story document and list dangling references
    Check {
        /// Story document (JSON)
        document: PathBuf,
    },
    /// Replace the saved session's story with a document
    Import {
        /// Story document (JSON)
        document: PathBuf,
    },
    /// Write the saved session's story as a document
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Command line errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The document was rejected
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A file could not be read or written
    #[error("{path:?}: {source}")]
    File {
        /// File
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Terminal I/O failed
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `--chapter` named a chapter the story does not have
    #[error("Unknown chapter: {0}")]
    UnknownChapter(String),
}

/// Result type for the command line
pub type Result<T> = std::result::Result<T, CliError>;

/// Resolve the config: `--config` must exist, the default file may not
pub fn load_config(cli: &Cli) -> Result<EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?,
    };
    if let Some(storage) = &cli.storage {
        config.storage_dir = storage.clone();
    }
    Ok(config)
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn load_story(path: &Path) -> Result<StoryStore> {
    let mut store = StoryStore::new();
    let _ = store.import_json(&read_document(path)?)?;
    store.take_events();
    Ok(store)
}

/// Run a parsed command line
pub fn run<R: BufRead, W: Write>(
    command: Commands,
    config: &EditorConfig,
    input: R,
    mut output: W,
) -> Result<()> {
    match command {
        Commands::Play { document, chapter } => {
            let mut store = load_story(&document)?;
            let mut player = match chapter {
                Some(chapter) => {
                    if store.chapter(&chapter).is_none() {
                        return Err(CliError::UnknownChapter(chapter));
                    }
                    Player::start_at(&mut store, &chapter)
                }
                None => Player::start(&mut store),
            };
            let exit = terminal::run_player(&mut store, &mut player, input, &mut output)?;
            tracing::debug!("Play finished: {:?}", exit);
            if exit == PlayExit::Idle {
                tracing::warn!("{:?} has nothing to play", document);
            }
        }
        Commands::Check { document } => {
            let store = load_story(&document)?;
            writeln!(
                output,
                "{}: {} chapters, {} nodes",
                document.display(),
                store.chapter_count(),
                store.node_count()
            )?;
            let dangling = store.dangling_references();
            if dangling.is_empty() {
                writeln!(output, "No dangling references.")?;
            } else {
                writeln!(output, "{} dangling references:", dangling.len())?;
                for reference in &dangling {
                    writeln!(output, "  {reference}")?;
                }
            }
        }
        Commands::Import { document } => {
            let text = read_document(&document)?;
            let mut session = EditorSession::open(FileStore::new(&config.storage_dir), config)?;
            let _ = session.import_json(&text)?;
            writeln!(
                output,
                "Imported {} chapters and {} nodes into {:?}",
                session.store().chapter_count(),
                session.store().node_count(),
                config.storage_dir
            )?;
        }
        Commands::Export { out } => {
            let session = EditorSession::open(FileStore::new(&config.storage_dir), config)?;
            let json = session.export_json()?;
            match out {
                Some(path) => std::fs::write(&path, json).map_err(|source| CliError::File {
                    path: path.clone(),
                    source,
                })?,
                None => writeln!(output, "{json}")?,
            }
        }
    }
    Ok(())
}
