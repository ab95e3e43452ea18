//! Testing utilities for the Cutboard workspace
//!
//! Shared fixtures: pinned clocks, in-memory sessions, drafts and
//! legacy state documents.

#![allow(missing_docs)]

use cutboard_core::{Session, TrackerConfig};
use cutboard_model::{ManualClock, ProjectDraft, Timestamp};
use cutboard_store::MemoryStorage;
use serde_json::{json, Value};
use std::sync::Arc;

/// 2024-06-01T12:00:00Z
pub const FIXED_NOW: Timestamp = Timestamp::from_millis(1_717_243_200_000);

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub type TestSession = Session<Arc<MemoryStorage>>;

/// Session plus handles to its storage and clock
#[derive(Debug)]
pub struct Harness {
    pub session: TestSession,
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Reopen a fresh session over the same storage and clock
    #[must_use]
    pub fn reopen(&self, config: TrackerConfig) -> TestSession {
        Session::open_with_clock(config, Arc::clone(&self.storage), self.clock.clone())
    }
}

pub fn harness_with(config: TrackerConfig, storage: MemoryStorage) -> Harness {
    let storage = Arc::new(storage);
    let clock = Arc::new(ManualClock::new(FIXED_NOW));
    let session = Session::open_with_clock(config, Arc::clone(&storage), clock.clone());
    Harness { session, storage, clock }
}

/// Seeded board, nobody logged in
pub fn seeded_harness() -> Harness {
    harness_with(TrackerConfig::default(), MemoryStorage::new())
}

/// Empty board, nobody logged in
pub fn empty_harness() -> Harness {
    harness_with(TrackerConfig::default().with_seed_sample_data(false), MemoryStorage::new())
}

/// Seeded board with `password` logged in
pub fn logged_in(password: &str) -> Harness {
    let mut harness = seeded_harness();
    harness.session.login(password).unwrap();
    harness
}

pub fn draft(title: &str, editor: &str, platform: &str, channel: &str) -> ProjectDraft {
    ProjectDraft::new(title)
        .with_editor(editor)
        .with_platform(platform)
        .with_channel(channel)
}

/// Stored state in the pre-migration shape: numeric ids, legacy stage keys
/// and checklist items without ids
pub fn legacy_state(projects: Vec<Value>) -> String {
    json!({
        "version": "2.0",
        "projects": projects,
        "trash": [],
        "editors": ["Mia", "Leo"],
        "platforms": ["YouTube"],
        "channels": ["Main Brand", "Client Channel"],
    })
    .to_string()
}

pub fn legacy_project(id: i64, title: &str, stage: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "stage": stage,
        "editor": "Mia",
        "channel": "Main Brand",
        "priority": "urgent",
        "createdAt": 1_717_000_000_000_i64,
        "timeline": { stage: 1_717_000_000_000_i64 },
        "checklist": [{ "text": "Cut intro", "done": true }, "Color grade"],
    })
}
