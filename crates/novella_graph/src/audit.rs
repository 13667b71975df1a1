// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dangling reference audit.
//!
//! Stories are written incrementally, so references are allowed to point
//! nowhere. Playback treats them as no-ops; this audit lists them so an editor
//! can show what is still unfinished.

use crate::id::{ChapterId, NodeId};
use crate::node::NodeKind;
use crate::store::StoryStore;
use std::fmt;

/// A reference that playback cannot follow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingReference {
    /// A choice option with no target yet
    UnresolvedChoice {
        /// Choice node
        node: NodeId,
        /// Option index
        choice: usize,
    },
    /// A choice option pointing at a node that does not exist
    MissingChoiceTarget {
        /// Choice node
        node: NodeId,
        /// Option index
        choice: usize,
        /// Missing target
        target: NodeId,
    },
    /// A choice option pointing into another chapter; selecting it does nothing
    CrossChapterChoice {
        /// Choice node
        node: NodeId,
        /// Option index
        choice: usize,
        /// Target node
        target: NodeId,
        /// Chapter the target lives in
        target_chapter: ChapterId,
    },
    /// A jump node without a target chapter
    UnresolvedJump {
        /// Jump node
        node: NodeId,
    },
    /// A jump node pointing at a chapter that does not exist
    MissingJumpTarget {
        /// Jump node
        node: NodeId,
        /// Missing chapter
        target: ChapterId,
    },
    /// A node whose chapter does not exist; playback never reaches it
    OrphanNode {
        /// Node
        node: NodeId,
        /// Missing chapter
        chapter: ChapterId,
    },
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedChoice { node, choice } => {
                write!(f, "node {node}: option {} has no target", choice + 1)
            }
            Self::MissingChoiceTarget { node, choice, target } => {
                write!(f, "node {node}: option {} points at missing node {target}", choice + 1)
            }
            Self::CrossChapterChoice {
                node,
                choice,
                target,
                target_chapter,
            } => write!(
                f,
                "node {node}: option {} points at {target} in chapter {target_chapter}",
                choice + 1
            ),
            Self::UnresolvedJump { node } => write!(f, "node {node}: jump has no target chapter"),
            Self::MissingJumpTarget { node, target } => {
                write!(f, "node {node}: jump points at missing chapter {target}")
            }
            Self::OrphanNode { node, chapter } => {
                write!(f, "node {node}: chapter {chapter} does not exist")
            }
        }
    }
}

impl StoryStore {
    /// List every reference playback would ignore, in node order
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut found = Vec::new();

        for node in self.nodes() {
            if self.chapter(node.chapter_id.as_str()).is_none() {
                found.push(DanglingReference::OrphanNode {
                    node: node.id.clone(),
                    chapter: node.chapter_id.clone(),
                });
            }

            match node.kind {
                NodeKind::Choice => {
                    for (choice, option) in node.choices.iter().enumerate() {
                        let Some(target) = option.target() else {
                            found.push(DanglingReference::UnresolvedChoice {
                                node: node.id.clone(),
                                choice,
                            });
                            continue;
                        };
                        match self.node(target.as_str()) {
                            None => found.push(DanglingReference::MissingChoiceTarget {
                                node: node.id.clone(),
                                choice,
                                target: target.clone(),
                            }),
                            Some(next) if next.chapter_id != node.chapter_id => {
                                found.push(DanglingReference::CrossChapterChoice {
                                    node: node.id.clone(),
                                    choice,
                                    target: target.clone(),
                                    target_chapter: next.chapter_id.clone(),
                                });
                            }
                            Some(_) => {}
                        }
                    }
                }
                NodeKind::Jump => match &node.target_chapter_id {
                    Some(target) if !target.is_unset() => {
                        if self.chapter(target.as_str()).is_none() {
                            found.push(DanglingReference::MissingJumpTarget {
                                node: node.id.clone(),
                                target: target.clone(),
                            });
                        }
                    }
                    _ => found.push(DanglingReference::UnresolvedJump {
                        node: node.id.clone(),
                    }),
                },
                NodeKind::Dialogue | NodeKind::Background | NodeKind::Sound => {}
            }
        }

        found
    }
}
