//! Error types for the tracker session
//!
//! [`TrackerError`] wraps the errors of every layer so callers can match on
//! one type. None of them is fatal; the session stays usable after any error.

use cutboard_access::{AuthError, PermissionDenied, RoleError};
use cutboard_store::{ImportError, PersistenceError, StoreError};

/// Main tracker error type
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// No identity is logged in
    #[error("not logged in")]
    NotAuthenticated,

    /// Login failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Store mutation rejected
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Global permission check failed
    #[error(transparent)]
    Permission(#[from] PermissionDenied),

    /// Custom role operation rejected
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Storage backend failure
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Import document rejected
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Bad configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    /// Check if the identity lacked permission or scope
    #[inline]
    #[must_use]
    pub fn is_permission(&self) -> bool {
        matches!(
            self,
            Self::Permission(_) | Self::Store(StoreError::Permission(_)) | Self::NotAuthenticated
        )
    }

    /// Check if the input was rejected
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Validation(_))
                | Self::Role(
                    RoleError::EmptyName
                        | RoleError::EmptyPassword
                        | RoleError::RoleExists(_)
                        | RoleError::PasswordInUse
                        | RoleError::EmptyChannelScope
                )
        )
    }

    /// Check if a referenced record was missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::NotFound(_)) | Self::Role(RoleError::NotFound(_))
        )
    }
}
