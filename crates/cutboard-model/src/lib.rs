//! Cutboard Model
//!
//! Plain records shared by every layer of the tracker:
//! - [`Project`]: the primary work item on the board
//! - [`Stage`]: the fixed, ordered workflow columns
//! - [`ChecklistItem`]: per-project to-do entries
//! - [`Timestamp`] and [`Clock`]: millisecond wall-clock time, injectable for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use cutboard_model::{Project, ProjectDraft, Stage, Timestamp};
//!
//! let draft = ProjectDraft::new("Launch teaser").with_channel("Main Brand");
//! let project = Project::from_draft(draft, Timestamp::from_millis(1_000));
//!
//! assert_eq!(project.stage, Stage::Uploaded);
//! assert_eq!(project.timeline.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod checklist;
mod error;
mod ids;
mod project;
mod stage;
mod time;

pub use checklist::ChecklistItem;
pub use error::ModelError;
pub use ids::{ItemId, ProjectId};
pub use project::{CardColor, Priority, Project, ProjectDraft, ProjectPatch, Timeline};
pub use stage::{Stage, StageInfo};
pub use time::{days_between, Clock, ManualClock, SystemClock, Timestamp, MILLIS_PER_DAY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn draft_to_project_seeds_timeline() {
        let draft = ProjectDraft::new("Launch teaser")
            .with_channel("Main Brand")
            .with_stage(Stage::Editing);
        let project = Project::from_draft(draft, Timestamp::from_millis(5_000));

        assert_eq!(project.stage, Stage::Editing);
        assert_eq!(project.timeline.get(&Stage::Editing), Some(&Timestamp::from_millis(5_000)));
        assert_eq!(project.created_at, Timestamp::from_millis(5_000));
        assert!(project.deleted_at.is_none());
    }

    #[test]
    fn project_json_uses_camel_case() {
        let mut project = Project::from_draft(
            ProjectDraft::new("Clip").with_editor("Mia"),
            Timestamp::from_millis(1),
        );
        project.raw_footage = "drive://raw".to_string();
        let json = serde_json::to_value(&project).unwrap();

        assert_eq!(json["rawFootage"], "drive://raw");
        assert_eq!(json["createdAt"], 1);
        assert_eq!(json["priority"], "MEDIUM");
        assert_eq!(json["timeline"]["uploaded"], 1);
        assert!(json.get("deletedAt").is_none());
    }
}
