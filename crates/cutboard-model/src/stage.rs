//! Workflow stages
//!
//! The board has a fixed, ordered set of columns. Order defines progress;
//! stages are never added, removed or reordered at runtime.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One column of the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Raw footage uploaded
    #[default]
    Uploaded,
    /// Assigned to an editor
    Assigned,
    /// Being edited
    Editing,
    /// Waiting on or applying revisions
    Revisions,
    /// Final cut approved
    Final,
    /// Published
    Posted,
}

/// Display metadata for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    /// Stage
    pub stage: Stage,
    /// Column title
    pub name: &'static str,
    /// Column accent color
    pub color: &'static str,
}

impl Stage {
    /// All stages in board order
    pub const ALL: [Stage; 6] = [
        Stage::Uploaded,
        Stage::Assigned,
        Stage::Editing,
        Stage::Revisions,
        Stage::Final,
        Stage::Posted,
    ];

    /// Stage new projects start in
    pub const INITIAL: Stage = Stage::Uploaded;

    /// Stage that counts as completed
    pub const TERMINAL: Stage = Stage::Posted;

    /// Persisted id
    #[inline]
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Stage::Uploaded => "uploaded",
            Stage::Assigned => "assigned",
            Stage::Editing => "editing",
            Stage::Revisions => "revisions",
            Stage::Final => "final",
            Stage::Posted => "posted",
        }
    }

    /// Display metadata
    #[must_use]
    pub const fn info(self) -> StageInfo {
        let (name, color) = match self {
            Stage::Uploaded => ("Uploaded", "#00ffa3"),
            Stage::Assigned => ("Assigned", "#00d4ff"),
            Stage::Editing => ("Editing", "#ff6b35"),
            Stage::Revisions => ("Revisions", "#ffb347"),
            Stage::Final => ("Final", "#7c3aed"),
            Stage::Posted => ("Posted", "#10b981"),
        };
        StageInfo {
            stage: self,
            name,
            color,
        }
    }

    /// Zero-based position on the board
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Fraction of the workflow completed once this stage is reached
    #[must_use]
    pub fn progress(self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = (self.index() + 1) as f64 / Self::ALL.len() as f64;
        ratio
    }

    /// Resolve a stored stage value, mapping legacy names
    ///
    /// Current ids map to themselves. Names from the earlier
    /// ideation/filming/posting workflow map to their successors; anything
    /// else falls back to [`Stage::INITIAL`].
    #[must_use]
    pub fn migrate(raw: &str) -> Stage {
        Self::from_str(raw)
            .ok()
            .or_else(|| Self::from_legacy(raw))
            .unwrap_or(Self::INITIAL)
    }

    /// Map a legacy stage name, if it is one
    #[must_use]
    pub fn from_legacy(raw: &str) -> Option<Stage> {
        match raw {
            "ideation" => Some(Stage::Uploaded),
            "filming" => Some(Stage::Assigned),
            "editing" => Some(Stage::Editing),
            "revisions" => Some(Stage::Revisions),
            "posting" => Some(Stage::Posted),
            _ => None,
        }
    }
}

impl FromStr for Stage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.id() == s)
            .ok_or_else(|| ModelError::UnknownStage(s.to_string()))
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_board() {
        let ids: Vec<_> = Stage::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            ["uploaded", "assigned", "editing", "revisions", "final", "posted"]
        );
        assert!(Stage::Uploaded < Stage::Posted);
    }

    #[test]
    fn progress_is_index_plus_one_over_total() {
        assert!((Stage::Uploaded.progress() - 1.0 / 6.0).abs() < f64::EPSILON);
        assert!((Stage::Posted.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn migrate_legacy_names() {
        assert_eq!(Stage::migrate("ideation"), Stage::Uploaded);
        assert_eq!(Stage::migrate("filming"), Stage::Assigned);
        assert_eq!(Stage::migrate("posting"), Stage::Posted);
        assert_eq!(Stage::migrate("final"), Stage::Final);
        assert_eq!(Stage::migrate("mystery"), Stage::Uploaded);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("ideation".parse::<Stage>().is_err());
        assert_eq!("revisions".parse::<Stage>(), Ok(Stage::Revisions));
    }

    #[test]
    fn serde_uses_ids() {
        assert_eq!(serde_json::to_string(&Stage::Final).unwrap(), "\"final\"");
        let stage: Stage = serde_json::from_str("\"posted\"").unwrap();
        assert_eq!(stage, Stage::Posted);
    }
}
