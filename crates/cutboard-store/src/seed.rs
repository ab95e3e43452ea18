//! Sample board for first start

use crate::store::ProjectStore;
use cutboard_model::{
    CardColor, ChecklistItem, Priority, Project, ProjectDraft, Stage, Timeline, Timestamp,
    MILLIS_PER_DAY,
};

fn checklist(items: &[(&str, bool)]) -> Vec<ChecklistItem> {
    items
        .iter()
        .map(|(text, done)| {
            let mut item = ChecklistItem::new(*text);
            item.done = *done;
            item
        })
        .collect()
}

fn timeline(now: Timestamp, entries: &[(Stage, i64)]) -> Timeline {
    entries
        .iter()
        .map(|(stage, ago)| (*stage, now.offset(-ago)))
        .collect()
}

/// The two sample projects, timed relative to `now`
#[must_use]
pub fn sample_projects(now: Timestamp) -> Vec<Project> {
    let half_day = MILLIS_PER_DAY / 2;

    let mut nova = Project::from_draft(
        ProjectDraft::new("Client Nova – Launch Campaign")
            .with_client("Nova")
            .with_editor("Mia")
            .with_platform("Instagram")
            .with_channel("Main Brand")
            .with_priority(Priority::High)
            .with_stage(Stage::Editing)
            .with_checklist(checklist(&[
                ("Review raw footage", true),
                ("Create rough cut", false),
                ("Add sound design", false),
            ])),
        now,
    );
    nova.due = "2025-09-05".to_string();
    nova.color = CardColor::Teal;
    nova.notes = "Focus on product hero shots and brand messaging.".to_string();
    nova.hook = "Show hero shot in first 1s".to_string();
    nova.ending = "Swipe up for full reveal".to_string();
    nova.key_shots = "Hero shot\nLogo sting\nProduct close-up".to_string();
    nova.locations = "Studio A\nOutdoor location".to_string();
    nova.edit_notes = "Add dynamic transitions".to_string();
    nova.timeline = timeline(
        now,
        &[(Stage::Uploaded, MILLIS_PER_DAY), (Stage::Assigned, half_day), (Stage::Editing, 0)],
    );

    let mut techcorp = Project::from_draft(
        ProjectDraft::new("TechCorp – Behind the Scenes")
            .with_client("TechCorp")
            .with_editor("Leo")
            .with_platform("YouTube")
            .with_channel("Client Channel")
            .with_priority(Priority::Medium)
            .with_stage(Stage::Revisions)
            .with_checklist(checklist(&[
                ("First cut complete", true),
                ("Client feedback received", true),
                ("Implement revisions", false),
            ])),
        now.offset(-2 * MILLIS_PER_DAY),
    );
    techcorp.due = "2025-09-02".to_string();
    techcorp.color = CardColor::Navy;
    techcorp.notes = "Documentary style editing with interviews.".to_string();
    techcorp.hook = "Cold open with team at work".to_string();
    techcorp.ending = "Subscribe for more content".to_string();
    techcorp.key_shots = "Interview setups\nOffice b-roll\nTeam collaboration".to_string();
    techcorp.locations = "Client office\nConference room".to_string();
    techcorp.music = "Corporate upbeat".to_string();
    techcorp.edit_notes = "Keep pace engaging, use split screens".to_string();
    techcorp.timeline = timeline(
        now,
        &[
            (Stage::Uploaded, 2 * MILLIS_PER_DAY),
            (Stage::Assigned, 3 * half_day),
            (Stage::Editing, MILLIS_PER_DAY),
            (Stage::Revisions, half_day),
        ],
    );

    vec![nova, techcorp]
}

/// Fresh store holding the sample projects and default pick-lists
#[must_use]
pub fn sample_store(now: Timestamp) -> ProjectStore {
    ProjectStore::from_parts(sample_projects(now), Vec::new(), crate::PickLists::default())
}
