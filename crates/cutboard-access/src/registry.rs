//! Role registry
//!
//! Holds the built-in roles and the runtime-created custom roles under one
//! unique key space. Built-in roles are listed first, in declaration order,
//! followed by custom roles in creation order.

use crate::error::RoleError;
use crate::permission::{Permission, PermissionSet};
use crate::role::{builtin_roles, Role, RoleKey, RoleKind};
use crate::scope::{AllowList, ResourceScope};
use indexmap::IndexMap;

/// Custom roles as persisted: role key to definition
pub type CustomRoles = IndexMap<RoleKey, Role>;

/// Selections submitted when creating a custom role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomRoleRequest {
    /// Display name (the key is derived from it)
    pub name: String,
    /// Password
    pub password: String,
    /// Requested permissions; manage-roles and import-export are always stripped
    pub permissions: PermissionSet,
    /// View-only flag
    pub view_only: bool,
    /// Selected channels (at least one)
    pub channels: Vec<String>,
    /// Selected platforms (empty means every known platform)
    pub platforms: Vec<String>,
    /// Selected editors (empty means every known editor)
    pub editors: Vec<String>,
}

impl CustomRoleRequest {
    /// Request with name and password, no permissions and no scope
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// With permissions
    #[inline]
    #[must_use]
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    /// With view-only flag
    #[inline]
    #[must_use]
    pub fn view_only(mut self, view_only: bool) -> Self {
        self.view_only = view_only;
        self
    }

    /// With channels
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// With platforms
    #[must_use]
    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    /// With editors
    #[must_use]
    pub fn with_editors<I, S>(mut self, editors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.editors = editors.into_iter().map(Into::into).collect();
        self
    }
}

/// Union of built-in and custom roles
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    builtin: IndexMap<RoleKey, Role>,
    custom: CustomRoles,
    legacy_password: String,
}

impl RoleRegistry {
    /// Registry with the built-in roles and the given master password
    #[must_use]
    pub fn new(legacy_password: impl Into<String>) -> Self {
        Self {
            builtin: builtin_roles()
                .into_iter()
                .map(|role| (role.key.clone(), role))
                .collect(),
            custom: CustomRoles::new(),
            legacy_password: legacy_password.into(),
        }
    }

    /// Master password mapping to the administrator
    #[inline]
    #[must_use]
    pub fn legacy_password(&self) -> &str {
        &self.legacy_password
    }

    /// Every role, built-in first
    pub fn all(&self) -> impl Iterator<Item = &Role> {
        self.builtin.values().chain(self.custom.values())
    }

    /// Look up a role by key
    #[must_use]
    pub fn get(&self, key: &RoleKey) -> Option<&Role> {
        self.builtin.get(key).or_else(|| self.custom.get(key))
    }

    /// Whether the key belongs to a built-in or a custom role
    #[must_use]
    pub fn kind_of(&self, key: &RoleKey) -> Option<RoleKind> {
        if self.builtin.contains_key(key) {
            Some(RoleKind::BuiltIn)
        } else if self.custom.contains_key(key) {
            Some(RoleKind::Custom)
        } else {
            None
        }
    }

    /// Custom roles only
    #[inline]
    #[must_use]
    pub fn custom_roles(&self) -> &CustomRoles {
        &self.custom
    }

    /// Number of roles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    /// Always false: built-in roles are never removed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any role or the master password already uses `password`
    #[must_use]
    pub fn password_in_use(&self, password: &str) -> bool {
        password == self.legacy_password || self.all().any(|role| role.password == password)
    }

    /// Create a custom role
    ///
    /// Empty platform/editor selections fall back to the given pick-lists.
    ///
    /// # Errors
    /// - `RoleError::EmptyName` / `RoleError::EmptyPassword` for blank input
    /// - `RoleError::RoleExists` if the derived key is taken
    /// - `RoleError::PasswordInUse` if the password matches another role or the master password
    /// - `RoleError::EmptyChannelScope` if no channel was selected
    pub fn create_custom(
        &mut self,
        request: CustomRoleRequest,
        known_platforms: &[String],
        known_editors: &[String],
    ) -> Result<&Role, RoleError> {
        let name = request.name.trim();
        let password = request.password.trim();
        if name.is_empty() {
            return Err(RoleError::EmptyName);
        }
        if password.is_empty() {
            return Err(RoleError::EmptyPassword);
        }

        let key = RoleKey::from_name(name);
        if self.kind_of(&key).is_some() {
            return Err(RoleError::RoleExists(key));
        }
        if self.password_in_use(password) {
            return Err(RoleError::PasswordInUse);
        }
        if request.channels.is_empty() {
            return Err(RoleError::EmptyChannelScope);
        }

        let or_known = |selected: Vec<String>, known: &[String]| {
            if selected.is_empty() {
                AllowList::only(known.iter().cloned())
            } else {
                AllowList::only(selected)
            }
        };

        let role = Role {
            key: key.clone(),
            name: name.to_string(),
            password: password.to_string(),
            permissions: admin_only_stripped(request.permissions),
            view_only: request.view_only,
            scope: ResourceScope::channels(request.channels)
                .with_platforms(or_known(request.platforms, known_platforms))
                .with_editors(or_known(request.editors, known_editors)),
        };

        tracing::info!(role = %key, "Custom role created");
        Ok(self.custom.entry(key).or_insert(role))
    }

    /// Delete a custom role
    ///
    /// # Errors
    /// - `RoleError::BuiltinRole` for built-in keys
    /// - `RoleError::NotFound` if no custom role has the key
    pub fn delete_custom(&mut self, key: &RoleKey) -> Result<Role, RoleError> {
        if self.builtin.contains_key(key) {
            return Err(RoleError::BuiltinRole(key.clone()));
        }
        let removed = self
            .custom
            .shift_remove(key)
            .ok_or_else(|| RoleError::NotFound(key.clone()))?;
        tracing::info!(role = %key, "Custom role deleted");
        Ok(removed)
    }

    /// Replace custom roles with a persisted set
    ///
    /// Entries whose key collides with a built-in role, or whose password
    /// collides with a built-in role or the master password, are skipped.
    /// Returns the keys that were skipped.
    pub fn load_custom(&mut self, roles: CustomRoles) -> Vec<RoleKey> {
        self.custom.clear();
        let mut skipped = Vec::new();
        for (key, mut role) in roles {
            let password_taken = role.password == self.legacy_password
                || self.builtin.values().any(|b| b.password == role.password)
                || self.custom.values().any(|c| c.password == role.password);
            if self.builtin.contains_key(&key) || password_taken || role.password.is_empty() {
                tracing::warn!(role = %key, "Skipping conflicting custom role");
                skipped.push(key);
                continue;
            }
            role.key = key.clone();
            role.permissions = admin_only_stripped(role.permissions);
            self.custom.insert(key, role);
        }
        skipped
    }
}

/// Custom roles never carry role management or whole-board import/export
fn admin_only_stripped(permissions: PermissionSet) -> PermissionSet {
    permissions
        .without(Permission::ManageRoles)
        .without(Permission::ImportExport)
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new("mhm2024")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::ADMIN_ROLE;

    fn known(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn request(name: &str, password: &str) -> CustomRoleRequest {
        CustomRoleRequest::new(name, password)
            .with_permissions(PermissionSet::all())
            .with_channels(["Main Brand"])
    }

    #[test]
    fn registry_with_builtins() {
        let registry = RoleRegistry::default();
        assert_eq!(registry.len(), 4);
        let keys: Vec<_> = registry.all().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["admin", "mia", "leo", "client"]);
        assert!(!registry.is_empty());
    }

    #[test]
    fn create_custom_role() {
        let mut registry = RoleRegistry::default();
        let role = registry
            .create_custom(request("Night Shift", "night1"), &known(&["YouTube"]), &known(&["Kai"]))
            .unwrap();

        assert_eq!(role.key.as_str(), "nightshift");
        assert!(!role.has(Permission::ManageRoles));
        assert!(!role.has(Permission::ImportExport));
        assert!(role.has(Permission::ManageTrash));
        assert_eq!(role.scope.platforms, AllowList::only(["YouTube"]));
        assert_eq!(role.scope.editors, AllowList::only(["Kai"]));
        assert_eq!(registry.kind_of(&RoleKey::new("nightshift")), Some(RoleKind::Custom));
    }

    #[test]
    fn create_rejects_blank_fields() {
        let mut registry = RoleRegistry::default();
        assert_eq!(
            registry.create_custom(request("  ", "x"), &[], &[]).unwrap_err(),
            RoleError::EmptyName
        );
        assert_eq!(
            registry.create_custom(request("Kai", " "), &[], &[]).unwrap_err(),
            RoleError::EmptyPassword
        );
    }

    #[test]
    fn create_rejects_key_collision_with_builtin() {
        let mut registry = RoleRegistry::default();
        let err = registry.create_custom(request("A dmin", "fresh"), &[], &[]).unwrap_err();
        assert_eq!(err, RoleError::RoleExists(RoleKey::new(ADMIN_ROLE)));
    }

    #[test]
    fn create_rejects_password_reuse() {
        let mut registry = RoleRegistry::default();
        assert_eq!(
            registry.create_custom(request("Kai", "mhm2024"), &[], &[]).unwrap_err(),
            RoleError::PasswordInUse
        );
        assert_eq!(
            registry.create_custom(request("Kai", "leo2024"), &[], &[]).unwrap_err(),
            RoleError::PasswordInUse
        );
    }

    #[test]
    fn create_requires_channel() {
        let mut registry = RoleRegistry::default();
        let req = CustomRoleRequest::new("Kai", "kai1");
        assert_eq!(
            registry.create_custom(req, &[], &[]).unwrap_err(),
            RoleError::EmptyChannelScope
        );
    }

    #[test]
    fn delete_custom_only() {
        let mut registry = RoleRegistry::default();
        registry.create_custom(request("Kai", "kai1"), &[], &[]).unwrap();

        assert!(registry.delete_custom(&RoleKey::new("kai")).is_ok());
        assert_eq!(
            registry.delete_custom(&RoleKey::new("kai")).unwrap_err(),
            RoleError::NotFound(RoleKey::new("kai"))
        );
        assert_eq!(
            registry.delete_custom(&RoleKey::new(ADMIN_ROLE)).unwrap_err(),
            RoleError::BuiltinRole(RoleKey::new(ADMIN_ROLE))
        );
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn load_custom_skips_conflicts() {
        let mut source = RoleRegistry::default();
        source.create_custom(request("Kai", "kai1"), &[], &[]).unwrap();
        let mut roles = source.custom_roles().clone();
        if let Some(kai) = roles.get_mut(&RoleKey::new("kai")) {
            kai.permissions = PermissionSet::all();
        }

        let mut shadow = roles[&RoleKey::new("kai")].clone();
        shadow.password = "mhm2024".to_string();
        roles.insert(RoleKey::new("shadow"), shadow);

        let mut registry = RoleRegistry::default();
        let skipped = registry.load_custom(roles);
        assert_eq!(skipped, vec![RoleKey::new("shadow")]);
        let kai = registry.get(&RoleKey::new("kai")).unwrap();
        assert!(!kai.has(Permission::ImportExport));
        assert!(!kai.has(Permission::ManageRoles));
    }
}
