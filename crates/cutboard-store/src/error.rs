//! Error types for the project store
//!
//! Provides error handling for:
//! - Store mutations (validation, permission, missing records)
//! - Persistence backend reads and writes
//! - Import document parsing

use cutboard_access::PermissionDenied;
use cutboard_model::ProjectId;
use std::path::PathBuf;

/// Errors from store mutations
///
/// Every variant is raised before any in-memory state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Required field missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Identity lacks the permission or scope
    #[error(transparent)]
    Permission(#[from] PermissionDenied),

    /// No project with this id in the expected collection
    #[error("project not found: {0}")]
    NotFound(ProjectId),
}

impl StoreError {
    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Errors from the persistence backend
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// File system failure
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored value is not valid JSON
    #[error("stored value under '{key}' is unreadable: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// State could not be encoded
    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),

    /// Backend refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors rejecting an import document
///
/// Nothing is applied when any of these is raised.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Not JSON at all
    #[error("error reading file: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON, but not an export document
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}
