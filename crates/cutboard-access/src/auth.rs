//! Authentication gate
//!
//! Maps a submitted password to an [`Identity`]. Rules are tried in order and
//! the first match wins:
//! 1. exact match against any built-in or custom role password
//! 2. the master (legacy) password, which always means the administrator
//! 3. pattern-coded passwords such as `client-<name>`, when enabled
//!
//! Failure never reveals which rule was tried.

use crate::error::AuthError;
use crate::permission::{Permission, PermissionSet};
use crate::registry::RoleRegistry;
use crate::role::{Role, RoleKey, ADMIN_ROLE, CLIENT_ROLE};
use crate::scope::{ResourceScope, ScopeNarrowing};
use serde::{Deserialize, Serialize};

/// Prefix of pattern-coded client passwords
pub const CLIENT_PASSWORD_PREFIX: &str = "client-";

/// Which rule resolved an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    /// Role password
    RolePassword,
    /// Master password
    MasterPassword,
    /// Pattern-coded password
    PatternCode,
}

/// The authenticated actor for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Role the identity is bound to
    pub role: RoleKey,
    /// Name shown in the header
    pub display_name: String,
    /// Permission bits
    pub permissions: PermissionSet,
    /// View-only flag inherited from the role
    pub view_only: bool,
    /// Effective scope (role scope, narrowed if applicable)
    pub scope: ResourceScope,
    /// Rule that matched
    pub method: AuthMethod,
}

impl Identity {
    /// Identity for a role, optionally narrowed
    #[must_use]
    pub fn for_role(role: &Role, narrowing: Option<&ScopeNarrowing>, method: AuthMethod) -> Self {
        let scope = match narrowing {
            Some(narrowing) => role.scope.narrowed(narrowing),
            None => role.scope.clone(),
        };
        Self {
            role: role.key.clone(),
            display_name: role.name.clone(),
            permissions: role.permissions.clone(),
            view_only: role.view_only,
            scope,
            method,
        }
    }

    /// Whether the identity holds a permission bit
    #[inline]
    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Administrator-equivalent identities see every project
    #[inline]
    #[must_use]
    pub fn is_admin_equivalent(&self) -> bool {
        !self.view_only && self.has(Permission::ManageRoles)
    }
}

/// Password-to-identity resolver
#[derive(Debug, Clone, Copy)]
pub struct AuthGate {
    pattern_logins: bool,
}

impl AuthGate {
    /// Gate with pattern-coded logins enabled
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            pattern_logins: true,
        }
    }

    /// Enable or disable pattern-coded logins
    #[inline]
    #[must_use]
    pub fn with_pattern_logins(mut self, enabled: bool) -> Self {
        self.pattern_logins = enabled;
        self
    }

    /// Resolve a password
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// `AuthError::InvalidCredentials` when no rule matches.
    pub fn authenticate(&self, registry: &RoleRegistry, password: &str) -> Result<Identity, AuthError> {
        let password = password.trim();
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(role) = registry.all().find(|role| role.password == password) {
            return Ok(Identity::for_role(role, None, AuthMethod::RolePassword));
        }

        if password == registry.legacy_password() {
            if let Some(admin) = registry.get(&RoleKey::new(ADMIN_ROLE)) {
                return Ok(Identity::for_role(admin, None, AuthMethod::MasterPassword));
            }
        }

        if self.pattern_logins {
            if let Some(identity) = Self::decode_pattern(registry, password) {
                return Ok(identity);
            }
        }

        Err(AuthError::InvalidCredentials)
    }

    fn decode_pattern(registry: &RoleRegistry, password: &str) -> Option<Identity> {
        let client = password.strip_prefix(CLIENT_PASSWORD_PREFIX)?.trim();
        if client.is_empty() {
            return None;
        }
        let role = registry.get(&RoleKey::new(CLIENT_ROLE))?;
        let mut identity = Identity::for_role(
            role,
            Some(&ScopeNarrowing::client(client)),
            AuthMethod::PatternCode,
        );
        identity.display_name = client.to_string();
        Some(identity)
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CustomRoleRequest;
    use crate::scope::{AllowList, ScopeBasis};

    #[test]
    fn role_password_matches() {
        let registry = RoleRegistry::default();
        let identity = AuthGate::new().authenticate(&registry, "mia2024").unwrap();
        assert_eq!(identity.role.as_str(), "mia");
        assert_eq!(identity.method, AuthMethod::RolePassword);
    }

    #[test]
    fn password_is_trimmed() {
        let registry = RoleRegistry::default();
        let identity = AuthGate::new().authenticate(&registry, "  leo2024\n").unwrap();
        assert_eq!(identity.role.as_str(), "leo");
    }

    #[test]
    fn master_password_is_admin() {
        let registry = RoleRegistry::default();
        let identity = AuthGate::new().authenticate(&registry, "mhm2024").unwrap();
        assert_eq!(identity.role.as_str(), ADMIN_ROLE);
        assert_eq!(identity.method, AuthMethod::MasterPassword);
        assert!(identity.is_admin_equivalent());
    }

    #[test]
    fn custom_role_password_matches() {
        let mut registry = RoleRegistry::default();
        registry
            .create_custom(
                CustomRoleRequest::new("Kai", "kai1")
                    .with_permissions(PermissionSet::new().with(Permission::View))
                    .with_channels(["Clips Channel"]),
                &[],
                &[],
            )
            .unwrap();
        let identity = AuthGate::new().authenticate(&registry, "kai1").unwrap();
        assert_eq!(identity.role.as_str(), "kai");
    }

    #[test]
    fn client_pattern_narrows_scope() {
        let registry = RoleRegistry::default();
        let identity = AuthGate::new().authenticate(&registry, "client-Nova").unwrap();
        assert_eq!(identity.role.as_str(), CLIENT_ROLE);
        assert_eq!(identity.display_name, "Nova");
        assert_eq!(identity.scope.basis, ScopeBasis::Client);
        assert_eq!(identity.scope.clients, AllowList::only(["Nova"]));
        assert!(identity.view_only);
    }

    #[test]
    fn pattern_logins_can_be_disabled() {
        let registry = RoleRegistry::default();
        let gate = AuthGate::new().with_pattern_logins(false);
        assert_eq!(
            gate.authenticate(&registry, "client-Nova").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn failures_are_uniform() {
        let registry = RoleRegistry::default();
        let gate = AuthGate::new();
        for bad in ["", "   ", "wrong", "client-", "admin"] {
            assert_eq!(gate.authenticate(&registry, bad).unwrap_err(), AuthError::InvalidCredentials);
        }
    }
}
