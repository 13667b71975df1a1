// SPDX-License-Identifier: MIT OR Apache-2.0
//! Chapter definitions.

use crate::catalog::GameFlags;
use crate::id::ChapterId;
use serde::{Deserialize, Serialize};

/// What a chapter condition is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    /// A choice the player made earlier
    Choice,
    /// A game flag
    Flag,
}

/// Optional gate on a chapter.
///
/// Playback never enforces it; it is editorial metadata a host may consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterCondition {
    /// Condition kind
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    /// Flag name or choice reference
    pub value: String,
}

impl ChapterCondition {
    /// Condition on a flag being set
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::Flag,
            value: name.into(),
        }
    }

    /// Evaluate against the current flags.
    ///
    /// Returns `None` for choice conditions, which have no recorded state to
    /// check against.
    pub fn is_met_by(&self, flags: &GameFlags) -> Option<bool> {
        match self.kind {
            ConditionKind::Flag => Some(flags.get(&self.value).copied().unwrap_or(false)),
            ConditionKind::Choice => None,
        }
    }
}

/// A named, independently selectable segment of the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique chapter ID
    pub id: ChapterId,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Optional unlock condition
    #[serde(default)]
    pub condition: Option<ChapterCondition>,
}

impl Chapter {
    /// Create a new chapter
    pub fn new(id: impl Into<ChapterId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            condition: None,
        }
    }

    /// Set the unlock condition
    pub fn with_condition(mut self, condition: ChapterCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_condition() {
        let condition = ChapterCondition::flag("met_alice");
        let mut flags = GameFlags::new();
        assert_eq!(condition.is_met_by(&flags), Some(false));

        flags.insert("met_alice".to_string(), true);
        assert_eq!(condition.is_met_by(&flags), Some(true));
    }

    #[test]
    fn test_choice_condition_is_undecidable() {
        let condition = ChapterCondition {
            kind: ConditionKind::Choice,
            value: "n3".to_string(),
        };
        assert_eq!(condition.is_met_by(&GameFlags::new()), None);
    }

    #[test]
    fn test_condition_wire_shape() {
        let chapter = Chapter::new("c2", "Epilogue").with_condition(ChapterCondition::flag("done"));
        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["condition"]["type"], "flag");
        assert_eq!(json["condition"]["value"], "done");
    }
}
