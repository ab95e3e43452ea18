//! Persisted and exported documents
//!
//! - [`StateDocument`]: the versioned board state written on every save
//! - [`ExportDocument`]: the downloadable snapshot, with its own version tag
//! - [`ImportBundle`]: a parsed export waiting for confirmation
//!
//! Stored and imported projects pass through the same per-record migration:
//! missing ids are generated, unknown stages (and timeline keys) are remapped
//! through the legacy table, and malformed optional fields fall back to their
//! defaults. Records that are not JSON objects are dropped.

use crate::error::{ImportError, PersistenceError};
use crate::picklist::{PickLists, DEFAULT_CHANNELS, DEFAULT_EDITORS, DEFAULT_PLATFORMS};
use crate::store::ProjectStore;
use cutboard_access::{CustomRoles, Role};
use cutboard_model::{CardColor, ItemId, Priority, Project, ProjectId, Stage, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Version tag of the stored state document
pub const STORAGE_VERSION: &str = "3.0";

/// Version tag of exported documents
pub const EXPORT_VERSION: &str = "2.0";

const STRING_FIELDS: [&str; 19] = [
    "title",
    "client",
    "editor",
    "platform",
    "channel",
    "due",
    "uploadDate",
    "links",
    "rawFootage",
    "notes",
    "hook",
    "ending",
    "script",
    "voiceover",
    "keyShots",
    "locations",
    "music",
    "editNotes",
    "id",
];

/// Board state as stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    pub version: String,
    pub projects: Vec<Project>,
    pub trash: Vec<Project>,
    pub editors: Vec<String>,
    pub platforms: Vec<String>,
    pub channels: Vec<String>,
    pub last_saved: Timestamp,
}

impl StateDocument {
    /// Snapshot the store
    #[must_use]
    pub fn capture(store: &ProjectStore, now: Timestamp) -> Self {
        let lists = store.lists();
        Self {
            version: STORAGE_VERSION.to_string(),
            projects: store.projects().to_vec(),
            trash: store.trash().to_vec(),
            editors: lists.editors.clone(),
            platforms: lists.platforms.clone(),
            channels: lists.channels.clone(),
            last_saved: now,
        }
    }

    /// Encode for storage
    ///
    /// # Errors
    /// `PersistenceError::Encode` if serialization fails.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string(self).map_err(PersistenceError::Encode)
    }

    /// Decode a stored value
    ///
    /// Returns `Ok(None)` when the value carries no version tag, which means
    /// there is no existing data.
    ///
    /// # Errors
    /// `PersistenceError::Decode` if the value is not JSON.
    pub fn decode(raw: &str, key: &str) -> Result<Option<Self>, PersistenceError> {
        let value: Value = serde_json::from_str(raw).map_err(|source| PersistenceError::Decode {
            key: key.to_string(),
            source,
        })?;
        let Some(version) = value.get("version").filter(|v| is_truthy(v)) else {
            tracing::debug!(key, "Stored state has no version tag");
            return Ok(None);
        };

        let projects = migrate_all(value.get("projects"));
        let trash = migrate_all(value.get("trash"));
        Ok(Some(Self {
            version: match version {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            projects,
            trash,
            editors: string_list(value.get("editors"), &DEFAULT_EDITORS),
            platforms: string_list(value.get("platforms"), &DEFAULT_PLATFORMS),
            channels: string_list(value.get("channels"), &DEFAULT_CHANNELS),
            last_saved: value
                .get("lastSaved")
                .and_then(as_millis)
                .map(Timestamp::from_millis)
                .unwrap_or_default(),
        }))
    }

    /// Rebuild a store from the document
    #[must_use]
    pub fn into_store(self) -> ProjectStore {
        ProjectStore::from_parts(
            self.projects,
            self.trash,
            PickLists {
                editors: self.editors,
                platforms: self.platforms,
                channels: self.channels,
            },
        )
    }
}

/// Downloadable snapshot of the whole board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub projects: Vec<Project>,
    pub trash: Vec<Project>,
    pub editors: Vec<String>,
    pub platforms: Vec<String>,
    pub channels: Vec<String>,
    /// RFC 3339
    pub export_date: String,
    pub version: String,
}

impl ExportDocument {
    /// Snapshot the store
    #[must_use]
    pub fn capture(store: &ProjectStore, now: Timestamp) -> Self {
        let lists = store.lists();
        Self {
            projects: store.projects().to_vec(),
            trash: store.trash().to_vec(),
            editors: lists.editors.clone(),
            platforms: lists.platforms.clone(),
            channels: lists.channels.clone(),
            export_date: now
                .to_datetime()
                .unwrap_or_default()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        }
    }

    /// Suggested file name, e.g. `mhm-tracker-2025-09-01.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        let day = self.export_date.get(..10).unwrap_or("export");
        format!("mhm-tracker-{day}.json")
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// `PersistenceError::Encode` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(PersistenceError::Encode)
    }
}

/// Parsed import document, not yet applied
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBundle {
    pub projects: Vec<Project>,
    pub trash: Vec<Project>,
    pub lists: PickLists,
}

impl ImportBundle {
    /// Check and migrate an import document
    ///
    /// Missing or non-list `trash` becomes empty; missing pick-lists fall
    /// back to the defaults.
    ///
    /// # Errors
    /// - `ImportError::Json` if the input is not JSON
    /// - `ImportError::InvalidFormat` if `projects` is not a list
    pub fn parse(raw: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.get("projects").is_some_and(Value::is_array) {
            return Err(ImportError::InvalidFormat(
                "expected a 'projects' list".to_string(),
            ));
        }
        Ok(Self {
            projects: migrate_all(value.get("projects")),
            trash: migrate_all(value.get("trash")),
            lists: PickLists {
                editors: string_list(value.get("editors"), &DEFAULT_EDITORS),
                platforms: string_list(value.get("platforms"), &DEFAULT_PLATFORMS),
                channels: string_list(value.get("channels"), &DEFAULT_CHANNELS),
            },
        })
    }

    /// Replace the store's contents with the bundle
    pub fn apply_to(self, store: &mut ProjectStore) {
        store.replace(self.projects, self.trash, self.lists);
    }
}

/// Decode stored custom roles, skipping malformed entries
///
/// # Errors
/// `PersistenceError::Decode` if the value is not a JSON object.
pub fn decode_custom_roles(raw: &str, key: &str) -> Result<CustomRoles, PersistenceError> {
    let entries: Map<String, Value> =
        serde_json::from_str(raw).map_err(|source| PersistenceError::Decode {
            key: key.to_string(),
            source,
        })?;

    let mut roles = CustomRoles::new();
    for (role_key, mut value) in entries {
        if let Value::Object(fields) = &mut value {
            fields.insert("key".to_string(), Value::String(role_key.clone()));
        }
        match serde_json::from_value::<Role>(value) {
            Ok(role) => {
                roles.insert(role.key.clone(), role);
            }
            Err(e) => tracing::warn!(role = %role_key, error = %e, "Skipping malformed custom role"),
        }
    }
    Ok(roles)
}

/// Encode custom roles for storage
///
/// # Errors
/// `PersistenceError::Encode` if serialization fails.
pub fn encode_custom_roles(roles: &CustomRoles) -> Result<String, PersistenceError> {
    serde_json::to_string(roles).map_err(PersistenceError::Encode)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn as_millis(value: &Value) -> Option<i64> {
    #[allow(clippy::cast_possible_truncation)]
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn string_list(value: Option<&Value>, defaults: &[&str]) -> Vec<String> {
    match value.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        None => defaults.iter().map(ToString::to_string).collect(),
    }
}

fn migrate_all(value: Option<&Value>) -> Vec<Project> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let project = migrate_project(item.clone());
            if project.is_none() {
                tracing::warn!("Dropping unreadable project record");
            }
            project
        })
        .collect()
}

/// Migrate one stored project record
#[must_use]
pub fn migrate_project(value: Value) -> Option<Project> {
    let Value::Object(mut record) = value else {
        return None;
    };

    if let Some(Value::Number(n)) = record.get("id") {
        let id = n.to_string();
        record.insert("id".to_string(), Value::String(id));
    }
    for field in STRING_FIELDS {
        if record.get(field).is_some_and(|v| !v.is_string()) {
            record.remove(field);
        }
    }
    if record
        .get("id")
        .and_then(Value::as_str)
        .map_or(true, str::is_empty)
    {
        record.insert(
            "id".to_string(),
            Value::String(ProjectId::generate().as_str().to_string()),
        );
    }

    let stage = Stage::migrate(record.get("stage").and_then(Value::as_str).unwrap_or_default());
    record.insert("stage".to_string(), Value::String(stage.id().to_string()));

    let priority = record
        .get("priority")
        .and_then(Value::as_str)
        .and_then(|raw| Priority::from_str(raw).ok())
        .unwrap_or_default();
    record.insert("priority".to_string(), Value::String(priority.to_string()));

    let color = record
        .get("color")
        .and_then(Value::as_str)
        .and_then(|raw| CardColor::from_str(raw).ok())
        .unwrap_or_default();
    record.insert("color".to_string(), Value::String(color.as_str().to_string()));

    let timeline = migrate_timeline(record.get("timeline"));
    record.insert("timeline".to_string(), Value::Object(timeline));

    let checklist = migrate_checklist(record.get("checklist"));
    record.insert("checklist".to_string(), Value::Array(checklist));

    for field in ["createdAt", "deletedAt"] {
        match record.get(field).and_then(as_millis) {
            Some(ms) => {
                record.insert(field.to_string(), Value::from(ms));
            }
            None => {
                record.remove(field);
            }
        }
    }

    match serde_json::from_value(Value::Object(record)) {
        Ok(project) => Some(project),
        Err(e) => {
            tracing::warn!(error = %e, "Project record failed to decode");
            None
        }
    }
}

fn migrate_timeline(value: Option<&Value>) -> Map<String, Value> {
    let mut timeline = Map::new();
    let Some(entries) = value.and_then(Value::as_object) else {
        return timeline;
    };
    for (raw_stage, at) in entries {
        let stage = Stage::from_str(raw_stage)
            .ok()
            .or_else(|| Stage::from_legacy(raw_stage));
        if let (Some(stage), Some(ms)) = (stage, as_millis(at)) {
            timeline.insert(stage.id().to_string(), Value::from(ms));
        }
    }
    timeline
}

fn migrate_checklist(value: Option<&Value>) -> Vec<Value> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let id = match item.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => ItemId::generate().as_str().to_string(),
            };
            let mut migrated = Map::new();
            migrated.insert("id".to_string(), Value::String(id));
            migrated.insert(
                "text".to_string(),
                Value::String(item.get("text").and_then(Value::as_str).unwrap_or_default().to_string()),
            );
            migrated.insert(
                "done".to_string(),
                Value::Bool(item.get("done").and_then(Value::as_bool).unwrap_or_default()),
            );
            Value::Object(migrated)
        })
        .collect()
}
