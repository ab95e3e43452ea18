//! Board statistics over a set of visible projects

use cutboard_model::Project;
use serde::Serialize;

/// Counts and cycle time for the header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    /// Projects counted
    pub total: usize,
    /// Projects in the terminal stage
    pub completed: usize,
    /// Rounded mean days from upload to posting over posted projects;
    /// `None` when none has both entries
    pub average_cycle_days: Option<u64>,
    /// Trash entries within scope
    pub trash_count: usize,
}

impl BoardStats {
    /// Compute stats for the visible projects and trash entries
    #[must_use]
    pub fn compute<'p, I>(visible: I, trash_count: usize) -> Self
    where
        I: IntoIterator<Item = &'p Project>,
    {
        let mut total = 0;
        let mut completed = 0;
        let mut cycle_sum: u64 = 0;
        let mut cycle_count: u64 = 0;

        for project in visible {
            total += 1;
            if !project.is_completed() {
                continue;
            }
            completed += 1;
            if let Some(days) = project.cycle_days() {
                cycle_sum = cycle_sum.saturating_add(days);
                cycle_count += 1;
            }
        }

        let average_cycle_days = (cycle_count > 0).then(|| (cycle_sum + cycle_count / 2) / cycle_count);

        Self {
            total,
            completed,
            average_cycle_days,
            trash_count,
        }
    }

    /// Share of completed projects, 0 to 100
    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        u8::try_from(self.completed * 100 / self.total).unwrap_or(100)
    }
}
