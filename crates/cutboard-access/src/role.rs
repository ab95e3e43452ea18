//! Role definitions
//!
//! A [`Role`] bundles a permission set, a view-only flag and a
//! [`ResourceScope`]. Built-in roles are fixed; custom roles are created at
//! runtime by an administrator.

use crate::permission::{Permission, PermissionSet};
use crate::scope::{AllowList, ResourceScope};
use serde::{Deserialize, Serialize};

/// Unique role key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleKey(String);

impl RoleKey {
    /// Wrap an existing key
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive a key from a display name: lower-cased, whitespace removed
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(
            name.split_whitespace()
                .collect::<String>()
                .to_lowercase(),
        )
    }

    /// Borrow the key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Whether a role ships with the tracker or was created at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Always present, never removable
    BuiltIn,
    /// Created and deletable by an administrator
    Custom,
}

/// A named capability bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique key
    pub key: RoleKey,
    /// Display name
    pub name: String,
    /// Shared-secret password
    pub password: String,
    /// Permission bits
    pub permissions: PermissionSet,
    /// View-only roles never create, edit, delete or duplicate
    #[serde(default)]
    pub view_only: bool,
    /// Resource reach
    #[serde(default)]
    pub scope: ResourceScope,
}

impl Role {
    /// Whether the role holds a permission
    #[inline]
    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }
}

/// Key of the administrator role
pub const ADMIN_ROLE: &str = "admin";

/// Key of the built-in client role used by pattern-coded logins
pub const CLIENT_ROLE: &str = "client";

fn editor_permissions() -> PermissionSet {
    [
        Permission::View,
        Permission::Create,
        Permission::Edit,
        Permission::Delete,
        Permission::ManageLists,
        Permission::ManageTrash,
    ]
    .into_iter()
    .collect()
}

/// The roles that always exist, in display order
#[must_use]
pub fn builtin_roles() -> Vec<Role> {
    vec![
        Role {
            key: RoleKey::new(ADMIN_ROLE),
            name: "Admin".to_string(),
            password: "admin2024".to_string(),
            permissions: PermissionSet::all(),
            view_only: false,
            scope: ResourceScope::unrestricted(),
        },
        Role {
            key: RoleKey::new("mia"),
            name: "Mia".to_string(),
            password: "mia2024".to_string(),
            permissions: editor_permissions(),
            view_only: false,
            scope: ResourceScope::channels(["Main Brand", "Clips Channel"])
                .with_platforms(AllowList::only(["Instagram", "TikTok", "YouTube"]))
                .with_editors(AllowList::only(["Mia"])),
        },
        Role {
            key: RoleKey::new("leo"),
            name: "Leo".to_string(),
            password: "leo2024".to_string(),
            permissions: editor_permissions(),
            view_only: false,
            scope: ResourceScope::channels(["Client Channel", "Main Brand"])
                .with_platforms(AllowList::only(["YouTube", "Facebook", "LinkedIn"]))
                .with_editors(AllowList::only(["Leo"])),
        },
        Role {
            key: RoleKey::new(CLIENT_ROLE),
            name: "Client".to_string(),
            password: "client2024".to_string(),
            permissions: PermissionSet::new().with(Permission::View),
            view_only: true,
            scope: ResourceScope::channels(["Client Channel"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_name_strips_whitespace() {
        assert_eq!(RoleKey::from_name("  Night  Shift Editor ").as_str(), "nightshifteditor");
        assert_eq!(RoleKey::from_name("KAI").as_str(), "kai");
    }

    #[test]
    fn builtins_have_unique_keys_and_passwords() {
        let roles = builtin_roles();
        let mut keys: Vec<_> = roles.iter().map(|r| r.key.as_str()).collect();
        let mut passwords: Vec<_> = roles.iter().map(|r| r.password.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        passwords.sort_unstable();
        passwords.dedup();
        assert_eq!(keys.len(), roles.len());
        assert_eq!(passwords.len(), roles.len());
    }

    #[test]
    fn client_is_view_only() {
        let roles = builtin_roles();
        let client = roles.iter().find(|r| r.key.as_str() == CLIENT_ROLE).unwrap();
        assert!(client.view_only);
        assert!(!client.has(Permission::Create));
    }
}
