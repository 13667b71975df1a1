// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors for rejected story edits and documents.

use crate::id::{ChapterId, NodeId};

/// An edit or import the store refused. The store is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A node with this id already exists
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// A document lists the same chapter id twice
    #[error("Duplicate chapter id: {0}")]
    DuplicateChapter(ChapterId),

    /// A reorder did not contain exactly the stored nodes
    #[error("Reorder must keep the same nodes (missing: {missing:?}, unexpected: {unexpected:?})")]
    NotAPermutation {
        /// Stored ids absent from the new sequence
        missing: Vec<NodeId>,
        /// Ids in the new sequence that are not stored
        unexpected: Vec<NodeId>,
    },

    /// The document lacks required content
    #[error("Invalid story document: {0}")]
    MalformedDocument(String),

    /// The document is not valid JSON
    #[error("Invalid story document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
