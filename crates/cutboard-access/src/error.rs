//! Error types for access control
//!
//! Provides error handling for:
//! - Authentication failures (deliberately uninformative)
//! - Permission and scope denials
//! - Custom role lifecycle errors

use crate::role::RoleKey;

/// A value outside the identity's resource scope
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} '{value}' is outside your access scope")]
pub struct ScopeViolation {
    /// Project field name
    pub field: &'static str,
    /// Offending value
    pub value: String,
}

impl ScopeViolation {
    /// Create violation for a field
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Guarded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a project
    Create,
    /// Edit a project
    Edit,
    /// Move a project to the trash
    Delete,
    /// Duplicate a project
    Duplicate,
    /// Manage custom roles
    ManageRoles,
    /// Manage pick-lists
    ManageLists,
    /// Import or export the board
    ImportExport,
    /// Restore or purge trash entries
    ManageTrash,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Create => "create projects",
            Action::Edit => "edit this project",
            Action::Delete => "delete this project",
            Action::Duplicate => "duplicate this project",
            Action::ManageRoles => "manage roles",
            Action::ManageLists => "manage lists",
            Action::ImportExport => "import or export data",
            Action::ManageTrash => "manage the trash",
        })
    }
}

/// Why an action was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// Identity is view-only
    ViewOnly,
    /// Role lacks the permission bit
    MissingPermission,
    /// Project is outside the identity's scope
    OutOfScope,
    /// A written value is outside the identity's scope
    Assignment(ScopeViolation),
}

/// Refusal from the access evaluator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("you do not have permission to {action}{}", reason_suffix(.reason))]
pub struct PermissionDenied {
    /// Refused action
    pub action: Action,
    /// Why it was refused
    pub reason: DenialReason,
}

fn reason_suffix(reason: &DenialReason) -> String {
    match reason {
        DenialReason::ViewOnly => " (view-only access)".to_string(),
        DenialReason::MissingPermission => String::new(),
        DenialReason::OutOfScope => " (outside your access scope)".to_string(),
        DenialReason::Assignment(violation) => format!(" ({violation})"),
    }
}

impl PermissionDenied {
    /// Create denial
    #[inline]
    #[must_use]
    pub fn new(action: Action, reason: DenialReason) -> Self {
        Self { action, reason }
    }
}

/// Authentication failure
///
/// Carries no detail about which rule was tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Credential matched nothing
    #[error("incorrect password")]
    InvalidCredentials,
}

/// Custom role lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// Role name is blank
    #[error("role name must not be empty")]
    EmptyName,

    /// Password is blank
    #[error("role password must not be empty")]
    EmptyPassword,

    /// Derived key already taken
    #[error("role '{0}' already exists")]
    RoleExists(RoleKey),

    /// Password already used by another role or the master password
    #[error("password is already in use")]
    PasswordInUse,

    /// No channel selected for a channel-scoped role
    #[error("select at least one channel")]
    EmptyChannelScope,

    /// Built-in roles cannot be removed
    #[error("built-in role '{0}' cannot be deleted")]
    BuiltinRole(RoleKey),

    /// No such custom role
    #[error("role '{0}' not found")]
    NotFound(RoleKey),
}
