// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback cursor and its transitions.

use novella_graph::{ChapterId, DialogueNode, NodeId, NodeKind, StoryStore};

/// Result of an advance (click) input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Entered another chapter through a jump node
    Jumped {
        /// New chapter
        chapter: ChapterId,
        /// Its first node, if it has any
        node: Option<NodeId>,
    },
    /// The next background layer of the current node is shown
    BackgroundAdvanced {
        /// Current node
        node: NodeId,
        /// New background cursor
        index: usize,
    },
    /// Moved to the next node of the chapter
    Moved {
        /// New current node
        node: NodeId,
    },
    /// Last node of the chapter; the scene holds
    Held,
    /// Choice nodes only move on a selection
    AwaitingChoice,
    /// The jump target chapter does not exist
    DanglingTarget {
        /// Missing chapter
        chapter: ChapterId,
    },
    /// Nothing to play
    Idle,
}

/// Result of a choice selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Moved to the option's target
    Moved {
        /// New current node
        node: NodeId,
    },
    /// The target is missing or lives in another chapter
    DanglingTarget {
        /// Unreachable target
        target: NodeId,
    },
    /// The option has no target yet
    Unresolved,
    /// No option with this index
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of options
        len: usize,
    },
    /// The current node is not a choice node
    NotAChoice,
    /// Nothing to play
    Idle,
}

/// Playback position within a story
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    chapter: Option<ChapterId>,
    pub(crate) node: Option<NodeId>,
}

impl Player {
    /// A player with nothing to play
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start at the first chapter in creation order
    pub fn start(store: &mut StoryStore) -> Self {
        let mut player = Self::idle();
        let first = store.chapters().next().map(|c| c.id.clone());
        if let Some(first) = first {
            player.enter(store, first);
        }
        player
    }

    /// Start at a given chapter. An unknown chapter gives an idle player.
    pub fn start_at(store: &mut StoryStore, chapter: &str) -> Self {
        let mut player = Self::idle();
        let _ = player.enter_chapter(store, chapter);
        player
    }

    /// Move to the first node of a chapter. Returns false, leaving the
    /// cursor alone, if the chapter does not exist.
    pub fn enter_chapter(&mut self, store: &mut StoryStore, chapter: &str) -> bool {
        match store.chapter(chapter).map(|c| c.id.clone()) {
            Some(id) => {
                self.enter(store, id);
                true
            }
            None => false,
        }
    }

    /// Current chapter
    pub fn chapter(&self) -> Option<&ChapterId> {
        self.chapter.as_ref()
    }

    /// Recorded current node. See [`Player::current_node`] for the node that
    /// is actually shown.
    pub fn node_id(&self) -> Option<&NodeId> {
        self.node.as_ref()
    }

    /// Whether there is nothing to play
    pub fn is_idle(&self, store: &StoryStore) -> bool {
        self.current_node(store).is_none()
    }

    /// The node being shown.
    ///
    /// If the recorded node was removed or moved to another chapter, the
    /// chapter's first node is shown instead.
    pub fn current_node<'a>(&self, store: &'a StoryStore) -> Option<&'a DialogueNode> {
        let chapter = self.chapter.as_ref()?;
        self.node
            .as_ref()
            .and_then(|id| store.node(id.as_str()))
            .filter(|node| node.chapter_id == *chapter)
            .or_else(|| store.first_node_in(chapter.as_str()))
    }

    /// Handle an advance (click) input
    pub fn advance(&mut self, store: &mut StoryStore) -> AdvanceOutcome {
        let Some(shown) = self.current_node(store).map(|n| n.id.clone()) else {
            return AdvanceOutcome::Idle;
        };
        if self.node.as_ref() != Some(&shown) {
            // The recorded node is gone; the fallback is entered like any other node
            self.enter_node(store, shown.clone());
        }
        let Some(node) = store.node(shown.as_str()) else {
            return AdvanceOutcome::Idle;
        };
        let id = shown;
        let kind = node.kind;
        let target = node
            .target_chapter_id
            .clone()
            .filter(|target| !target.is_unset());
        let pending_background = node.has_pending_background();

        if let (NodeKind::Jump, Some(target)) = (kind, target) {
            if store.chapter(target.as_str()).is_none() {
                tracing::debug!("Jump from {} to missing chapter {}", id, target);
                return AdvanceOutcome::DanglingTarget { chapter: target };
            }
            self.enter(store, target.clone());
            return AdvanceOutcome::Jumped {
                chapter: target,
                node: self.node.clone(),
            };
        }

        if kind == NodeKind::Choice {
            return AdvanceOutcome::AwaitingChoice;
        }

        if pending_background {
            let _ = store.advance_background(id.as_str());
            let index = store
                .node(id.as_str())
                .map_or(0, DialogueNode::background_cursor);
            tracing::debug!("Background of {} advanced to {}", id, index);
            return AdvanceOutcome::BackgroundAdvanced { node: id, index };
        }

        match store.next_in_chapter(id.as_str()).map(|n| n.id.clone()) {
            Some(next) => {
                self.enter_node(store, next.clone());
                AdvanceOutcome::Moved { node: next }
            }
            None => AdvanceOutcome::Held,
        }
    }

    /// Handle the selection of option `index` on a choice node
    pub fn select_choice(&mut self, store: &mut StoryStore, index: usize) -> ChoiceOutcome {
        let Some(node) = self.current_node(store) else {
            return ChoiceOutcome::Idle;
        };
        if node.kind != NodeKind::Choice {
            return ChoiceOutcome::NotAChoice;
        }
        let Some(choice) = node.choices.get(index) else {
            return ChoiceOutcome::OutOfRange {
                index,
                len: node.choices.len(),
            };
        };
        let Some(target) = choice.target().cloned() else {
            return ChoiceOutcome::Unresolved;
        };

        let reachable = store
            .node(target.as_str())
            .is_some_and(|next| next.chapter_id == node.chapter_id);
        if !reachable {
            tracing::debug!("Choice {} of {} points at unreachable {}", index, node.id, target);
            return ChoiceOutcome::DanglingTarget { target };
        }

        self.enter_node(store, target.clone());
        ChoiceOutcome::Moved { node: target }
    }

    fn enter(&mut self, store: &mut StoryStore, chapter: ChapterId) {
        let first = store.first_node_in(chapter.as_str()).map(|n| n.id.clone());
        tracing::debug!("Entered chapter {}", chapter);
        self.chapter = Some(chapter);
        self.node = None;
        if let Some(first) = first {
            self.enter_node(store, first);
        }
    }

    fn enter_node(&mut self, store: &mut StoryStore, node: NodeId) {
        let _ = store.reset_background(node.as_str());
        tracing::debug!("Showing node {}", node);
        self.node = Some(node);
    }
}
