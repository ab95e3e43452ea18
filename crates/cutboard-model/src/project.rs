//! Project records
//!
//! A [`Project`] is a card on the board. [`ProjectDraft`] carries the fields
//! a new card is created from; [`ProjectPatch`] carries a partial update that
//! is shallow-merged into an existing card.

use crate::checklist::ChecklistItem;
use crate::error::ModelError;
use crate::ids::ProjectId;
use crate::stage::Stage;
use crate::time::{days_between, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Time each stage was (most recently) entered
pub type Timeline = BTreeMap<Stage, Timestamp>;

/// Card priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

impl FromStr for Priority {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            _ => Err(ModelError::UnknownPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        })
    }
}

/// Card color tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    /// Teal
    #[default]
    Teal,
    /// Coral
    Coral,
    /// Navy
    Navy,
    /// Purple
    Purple,
    /// Green
    Green,
}

impl CardColor {
    /// Full palette
    pub const ALL: [CardColor; 5] = [
        CardColor::Teal,
        CardColor::Coral,
        CardColor::Navy,
        CardColor::Purple,
        CardColor::Green,
    ];

    /// Persisted value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CardColor::Teal => "teal",
            CardColor::Coral => "coral",
            CardColor::Navy => "navy",
            CardColor::Purple => "purple",
            CardColor::Green => "green",
        }
    }
}

impl FromStr for CardColor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ModelError::UnknownColor(s.to_string()))
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub client: String,
    pub editor: String,
    pub platform: String,
    pub channel: String,
    /// Due date as entered (`YYYY-MM-DD` or empty)
    pub due: String,
    pub upload_date: String,
    pub priority: Priority,
    pub stage: Stage,
    pub color: CardColor,
    pub links: String,
    pub raw_footage: String,
    pub notes: String,
    pub hook: String,
    pub ending: String,
    pub script: String,
    pub voiceover: String,
    pub key_shots: String,
    pub locations: String,
    pub music: String,
    pub edit_notes: String,
    pub checklist: Vec<ChecklistItem>,
    pub created_at: Timestamp,
    pub timeline: Timeline,
    /// Set only while the project sits in the trash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
}

impl Default for Project {
    /// Blank card with a fresh id and an empty timeline
    fn default() -> Self {
        let mut project = Self::from_draft(ProjectDraft::default(), Timestamp::default());
        project.timeline.clear();
        project
    }
}

impl Project {
    /// Build a new card from a draft, entering the draft's stage at `now`
    #[must_use]
    pub fn from_draft(draft: ProjectDraft, now: Timestamp) -> Self {
        let mut timeline = Timeline::new();
        timeline.insert(draft.stage, now);
        Self {
            id: ProjectId::generate(),
            title: draft.title,
            client: draft.client,
            editor: draft.editor,
            platform: draft.platform,
            channel: draft.channel,
            due: draft.due,
            upload_date: draft.upload_date,
            priority: draft.priority,
            stage: draft.stage,
            color: draft.color,
            links: draft.links,
            raw_footage: draft.raw_footage,
            notes: draft.notes,
            hook: draft.hook,
            ending: draft.ending,
            script: draft.script,
            voiceover: draft.voiceover,
            key_shots: draft.key_shots,
            locations: draft.locations,
            music: draft.music,
            edit_notes: draft.edit_notes,
            checklist: draft.checklist,
            created_at: now,
            timeline,
            deleted_at: None,
        }
    }

    /// Latest timestamp recorded in the timeline
    #[must_use]
    pub fn latest_timeline_entry(&self) -> Option<Timestamp> {
        self.timeline.values().copied().max()
    }

    /// Move to `stage`, recording the entry time
    ///
    /// Returns `false` and changes nothing when already in `stage`.
    /// Re-entering a visited stage overwrites its entry. The recorded time
    /// never precedes an existing entry.
    pub fn enter_stage(&mut self, stage: Stage, now: Timestamp) -> bool {
        if self.stage == stage {
            return false;
        }
        let at = self.latest_timeline_entry().map_or(now, |latest| latest.max(now));
        self.stage = stage;
        self.timeline.insert(stage, at);
        true
    }

    /// Shallow-merge a patch; unspecified fields keep their values
    ///
    /// A stage change in the patch goes through [`Project::enter_stage`].
    pub fn apply(&mut self, patch: ProjectPatch, now: Timestamp) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        merge!(
            title, client, editor, platform, channel, due, upload_date, priority, color, links,
            raw_footage, notes, hook, ending, script, voiceover, key_shots, locations, music,
            edit_notes, checklist,
        );
        if let Some(stage) = patch.stage {
            self.enter_stage(stage, now);
        }
    }

    /// Copy this card as a new one
    ///
    /// The copy gets a fresh id, a " (Copy)" title suffix, unticked checklist
    /// items with fresh ids, and a timeline holding only the current stage.
    #[must_use]
    pub fn duplicate(&self, now: Timestamp) -> Self {
        let mut copy = self.clone();
        copy.id = ProjectId::generate();
        copy.title = format!("{} (Copy)", self.title);
        copy.checklist = self.checklist.iter().map(ChecklistItem::fresh_copy).collect();
        copy.timeline = Timeline::from([(self.stage, now)]);
        copy.created_at = now;
        copy.deleted_at = None;
        copy
    }

    /// Whether the card sits in the terminal stage
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.stage == Stage::TERMINAL
    }

    /// Days from upload to posting, when both are recorded
    #[must_use]
    pub fn cycle_days(&self) -> Option<u64> {
        let uploaded = self.timeline.get(&Stage::INITIAL)?;
        let posted = self.timeline.get(&Stage::TERMINAL)?;
        Some(days_between(*uploaded, *posted))
    }

    /// Count of ticked checklist items
    #[must_use]
    pub fn checklist_done(&self) -> usize {
        self.checklist.iter().filter(|item| item.done).count()
    }
}

/// Fields a new card is created from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDraft {
    pub title: String,
    pub client: String,
    pub editor: String,
    pub platform: String,
    pub channel: String,
    pub due: String,
    pub upload_date: String,
    pub priority: Priority,
    pub stage: Stage,
    pub color: CardColor,
    pub links: String,
    pub raw_footage: String,
    pub notes: String,
    pub hook: String,
    pub ending: String,
    pub script: String,
    pub voiceover: String,
    pub key_shots: String,
    pub locations: String,
    pub music: String,
    pub edit_notes: String,
    pub checklist: Vec<ChecklistItem>,
}

impl ProjectDraft {
    /// Draft with a title and defaults elsewhere
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Copy the editable fields of an existing card
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            client: project.client.clone(),
            editor: project.editor.clone(),
            platform: project.platform.clone(),
            channel: project.channel.clone(),
            due: project.due.clone(),
            upload_date: project.upload_date.clone(),
            priority: project.priority,
            stage: project.stage,
            color: project.color,
            links: project.links.clone(),
            raw_footage: project.raw_footage.clone(),
            notes: project.notes.clone(),
            hook: project.hook.clone(),
            ending: project.ending.clone(),
            script: project.script.clone(),
            voiceover: project.voiceover.clone(),
            key_shots: project.key_shots.clone(),
            locations: project.locations.clone(),
            music: project.music.clone(),
            edit_notes: project.edit_notes.clone(),
            checklist: project.checklist.clone(),
        }
    }

    /// With client
    #[inline]
    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    /// With editor
    #[inline]
    #[must_use]
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    /// With platform
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// With channel
    #[inline]
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// With stage
    #[inline]
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// With checklist
    #[inline]
    #[must_use]
    pub fn with_checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = checklist;
        self
    }

    /// Trim surrounding whitespace from every single-line field
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.title,
            &mut self.client,
            &mut self.editor,
            &mut self.platform,
            &mut self.channel,
            &mut self.due,
            &mut self.upload_date,
        ] {
            *field = field.trim().to_string();
        }
        self
    }
}

/// Partial update of a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub client: Option<String>,
    pub editor: Option<String>,
    pub platform: Option<String>,
    pub channel: Option<String>,
    pub due: Option<String>,
    pub upload_date: Option<String>,
    pub priority: Option<Priority>,
    pub stage: Option<Stage>,
    pub color: Option<CardColor>,
    pub links: Option<String>,
    pub raw_footage: Option<String>,
    pub notes: Option<String>,
    pub hook: Option<String>,
    pub ending: Option<String>,
    pub script: Option<String>,
    pub voiceover: Option<String>,
    pub key_shots: Option<String>,
    pub locations: Option<String>,
    pub music: Option<String>,
    pub edit_notes: Option<String>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl ProjectPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With client
    #[inline]
    #[must_use]
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// With editor
    #[inline]
    #[must_use]
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    /// With platform
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// With channel
    #[inline]
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// With stage
    #[inline]
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// With checklist
    #[inline]
    #[must_use]
    pub fn with_checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = Some(checklist);
        self
    }

    /// Whether the patch sets a blank title
    #[must_use]
    pub fn clears_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| t.trim().is_empty())
    }
}

impl From<ProjectDraft> for ProjectPatch {
    /// A full form submission: every field is set
    fn from(draft: ProjectDraft) -> Self {
        Self {
            title: Some(draft.title),
            client: Some(draft.client),
            editor: Some(draft.editor),
            platform: Some(draft.platform),
            channel: Some(draft.channel),
            due: Some(draft.due),
            upload_date: Some(draft.upload_date),
            priority: Some(draft.priority),
            stage: Some(draft.stage),
            color: Some(draft.color),
            links: Some(draft.links),
            raw_footage: Some(draft.raw_footage),
            notes: Some(draft.notes),
            hook: Some(draft.hook),
            ending: Some(draft.ending),
            script: Some(draft.script),
            voiceover: Some(draft.voiceover),
            key_shots: Some(draft.key_shots),
            locations: Some(draft.locations),
            music: Some(draft.music),
            edit_notes: Some(draft.edit_notes),
            checklist: Some(draft.checklist),
        }
    }
}
