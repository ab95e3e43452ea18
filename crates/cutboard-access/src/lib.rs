//! Cutboard Access Control
//!
//! Decides who is logged in and what they may see and do:
//! - [`RoleRegistry`]: built-in and custom roles under one key space
//! - [`AuthGate`]: password to [`Identity`] resolution
//! - [`AccessEvaluator`]: visibility, per-project write checks and UI affordances
//! - [`ScopeResolver`]: identity scope as a predicate over projects
//!
//! # Example
//!
//! ```rust,ignore
//! use cutboard_access::{AccessEvaluator, AuthGate, RoleRegistry};
//!
//! let registry = RoleRegistry::default();
//! let identity = AuthGate::new().authenticate(&registry, "mia2024")?;
//! let access = AccessEvaluator::new(&identity);
//!
//! let visible = access.visible_projects(&projects);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod auth;
pub mod error;
pub mod evaluator;
pub mod permission;
pub mod registry;
pub mod role;
pub mod scope;

pub use auth::{AuthGate, AuthMethod, Identity, CLIENT_PASSWORD_PREFIX};
pub use error::{Action, AuthError, DenialReason, PermissionDenied, RoleError, ScopeViolation};
pub use evaluator::{AccessEvaluator, Affordances};
pub use permission::{Permission, PermissionSet};
pub use registry::{CustomRoleRequest, CustomRoles, RoleRegistry};
pub use role::{builtin_roles, Role, RoleKey, RoleKind, ADMIN_ROLE, CLIENT_ROLE};
pub use scope::{
    AllowList, ChannelScope, ClientScope, EditorScope, ResourceScope, ScopeBasis, ScopeNarrowing,
    ScopeResolver, Unrestricted,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod property_tests {
    use super::*;
    use cutboard_model::{Project, ProjectDraft, Timestamp};
    use proptest::prelude::*;

    const CHANNELS: [&str; 4] = ["Main Brand", "Clips Channel", "Client Channel", ""];
    const EDITORS: [&str; 4] = ["Mia", "Leo", "Kai", ""];

    fn identities() -> Vec<Identity> {
        let registry = RoleRegistry::default();
        let gate = AuthGate::new();
        ["admin2024", "mia2024", "leo2024", "client2024", "client-Nova", "mhm2024"]
            .iter()
            .map(|pw| gate.authenticate(&registry, pw).unwrap())
            .collect()
    }

    fn arb_project() -> impl Strategy<Value = Project> {
        (0..CHANNELS.len(), 0..EDITORS.len(), prop::bool::ANY).prop_map(|(c, e, nova)| {
            Project::from_draft(
                ProjectDraft::new("p")
                    .with_channel(CHANNELS[c])
                    .with_editor(EDITORS[e])
                    .with_client(if nova { "Nova" } else { "TechCorp" }),
                Timestamp::from_millis(0),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_edit_never_exceeds_visibility(project in arb_project()) {
            for identity in identities() {
                let access = AccessEvaluator::new(&identity);
                let visible = access.visible_projects([&project]).len() == 1;
                if access.can_edit(&project) || access.can_delete(&project) || access.can_duplicate(&project) {
                    prop_assert!(visible);
                }
            }
        }

        #[test]
        fn prop_view_only_never_writes(project in arb_project(), bits in prop::collection::vec(0..Permission::ALL.len(), 0..8)) {
            let mut identity = identities().remove(3);
            identity.permissions = bits.into_iter().map(|i| Permission::ALL[i]).collect();
            prop_assert!(identity.view_only);

            let access = AccessEvaluator::new(&identity);
            prop_assert!(!access.can_create());
            prop_assert!(!access.can_edit(&project));
            prop_assert!(!access.can_delete(&project));
            prop_assert!(!access.can_duplicate(&project));
        }
    }
}
