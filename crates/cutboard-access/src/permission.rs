//! Permission bits carried by roles

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    /// See projects within scope
    View,
    /// Create projects
    Create,
    /// Edit projects within scope
    Edit,
    /// Move projects within scope to the trash
    Delete,
    /// Create and delete custom roles
    ManageRoles,
    /// Edit the editor/platform/channel pick-lists
    ManageLists,
    /// Export and import the whole board
    ImportExport,
    /// Restore and purge trash entries
    ManageTrash,
}

impl Permission {
    /// Every permission
    pub const ALL: [Permission; 8] = [
        Permission::View,
        Permission::Create,
        Permission::Edit,
        Permission::Delete,
        Permission::ManageRoles,
        Permission::ManageLists,
        Permission::ImportExport,
        Permission::ManageTrash,
    ];

    /// Short label for listings
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Create => "create",
            Permission::Edit => "edit",
            Permission::Delete => "delete",
            Permission::ManageRoles => "manage-roles",
            Permission::ManageLists => "manage-lists",
            Permission::ImportExport => "import-export",
            Permission::ManageTrash => "manage-trash",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("unknown permission: '{s}'"))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of permissions held by a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every permission
    #[must_use]
    pub fn all() -> Self {
        Self(Permission::ALL.into_iter().collect())
    }

    /// Whether `permission` is held
    #[inline]
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Add a permission
    #[inline]
    #[must_use]
    pub fn with(mut self, permission: Permission) -> Self {
        self.0.insert(permission);
        self
    }

    /// Remove a permission
    #[inline]
    #[must_use]
    pub fn without(mut self, permission: Permission) -> Self {
        self.0.remove(&permission);
        self
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Number of permissions held
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no permission is held
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<_> = self.iter().map(Permission::label).collect();
        f.write_str(&labels.join(", "))
    }
}
