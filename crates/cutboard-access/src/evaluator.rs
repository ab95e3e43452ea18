//! Access control evaluator
//!
//! The single authorization decision point. Every check is a pure function of
//! the identity and the project in question; the evaluator never mutates
//! anything.
//!
//! Project-scoped checks are the permission bit AND'd with scope membership,
//! so a project outside scope is never editable, deletable or duplicable.
//! View-only identities fail every write check regardless of their bits.

use crate::auth::Identity;
use crate::error::{Action, DenialReason, PermissionDenied};
use crate::permission::Permission;
use crate::scope::{ScopeResolver, Unrestricted};
use cutboard_model::Project;

/// Which management surfaces the presentation layer should offer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    /// "Add project" buttons
    pub add_project: bool,
    /// Pick-list management
    pub manage_lists: bool,
    /// Import button
    pub import: bool,
    /// Export button
    pub export: bool,
    /// Role administration panel
    pub admin_panel: bool,
    /// Trash restore/purge controls
    pub trash: bool,
}

/// Authorization decisions for one identity
#[derive(Debug)]
pub struct AccessEvaluator<'a> {
    identity: &'a Identity,
    resolver: Box<dyn ScopeResolver>,
}

impl<'a> AccessEvaluator<'a> {
    /// Evaluator for an identity
    #[must_use]
    pub fn new(identity: &'a Identity) -> Self {
        let resolver: Box<dyn ScopeResolver> = if identity.is_admin_equivalent() {
            Box::new(Unrestricted)
        } else {
            identity.scope.resolver()
        };
        Self { identity, resolver }
    }

    /// The identity being evaluated
    #[inline]
    #[must_use]
    pub fn identity(&self) -> &'a Identity {
        self.identity
    }

    /// Whether the project lies within the identity's visibility scope
    #[must_use]
    pub fn can_view(&self, project: &Project) -> bool {
        self.identity.has(Permission::View) && self.resolver.admits(project)
    }

    /// Subset of `projects` the identity may see, order preserved
    pub fn visible_projects<'p, I>(&self, projects: I) -> Vec<&'p Project>
    where
        I: IntoIterator<Item = &'p Project>,
    {
        projects.into_iter().filter(|p| self.can_view(p)).collect()
    }

    /// Whether new projects may be created
    #[must_use]
    pub fn can_create(&self) -> bool {
        self.require_create().is_ok()
    }

    /// Whether the project may be edited
    #[must_use]
    pub fn can_edit(&self, project: &Project) -> bool {
        self.require_edit(project).is_ok()
    }

    /// Whether the project may be moved to the trash
    #[must_use]
    pub fn can_delete(&self, project: &Project) -> bool {
        self.require_delete(project).is_ok()
    }

    /// Whether the project may be duplicated
    #[must_use]
    pub fn can_duplicate(&self, project: &Project) -> bool {
        self.require_duplicate(project).is_ok()
    }

    /// Whether custom roles may be managed
    #[must_use]
    pub fn can_manage_roles(&self) -> bool {
        self.require_global(Action::ManageRoles, Permission::ManageRoles).is_ok()
    }

    /// Whether pick-lists may be managed
    #[must_use]
    pub fn can_manage_lists(&self) -> bool {
        self.require_global(Action::ManageLists, Permission::ManageLists).is_ok()
    }

    /// Whether the board may be exported or imported
    #[must_use]
    pub fn can_import_export(&self) -> bool {
        self.require_import_export().is_ok()
    }

    /// Whether trash entries may be restored or purged
    #[must_use]
    pub fn can_manage_trash(&self) -> bool {
        self.require_global(Action::ManageTrash, Permission::ManageTrash).is_ok()
    }

    /// Whether a trash entry may be restored or purged
    #[must_use]
    pub fn can_manage_trash_entry(&self, project: &Project) -> bool {
        self.require_trash_entry(project).is_ok()
    }

    /// Surfaces to show for this identity
    #[must_use]
    pub fn affordances(&self) -> Affordances {
        Affordances {
            add_project: self.can_create(),
            manage_lists: self.can_manage_lists(),
            import: self.can_import_export(),
            export: self.can_import_export(),
            admin_panel: self.can_manage_roles(),
            trash: self.can_manage_trash(),
        }
    }

    /// Check create permission
    ///
    /// # Errors
    /// `PermissionDenied` for view-only identities or a missing create bit.
    pub fn require_create(&self) -> Result<(), PermissionDenied> {
        self.require_global(Action::Create, Permission::Create)
    }

    /// Check edit permission on a project
    ///
    /// # Errors
    /// `PermissionDenied` for view-only identities, a missing bit, or an
    /// out-of-scope project.
    pub fn require_edit(&self, project: &Project) -> Result<(), PermissionDenied> {
        self.require_scoped(Action::Edit, Permission::Edit, project)
    }

    /// Check delete permission on a project
    ///
    /// # Errors
    /// As [`AccessEvaluator::require_edit`].
    pub fn require_delete(&self, project: &Project) -> Result<(), PermissionDenied> {
        self.require_scoped(Action::Delete, Permission::Delete, project)
    }

    /// Check duplicate permission on a project (create bit plus scope)
    ///
    /// # Errors
    /// As [`AccessEvaluator::require_edit`].
    pub fn require_duplicate(&self, project: &Project) -> Result<(), PermissionDenied> {
        self.require_scoped(Action::Duplicate, Permission::Create, project)
    }

    /// Check trash-management permission on one trash entry
    ///
    /// # Errors
    /// As [`AccessEvaluator::require_edit`].
    pub fn require_trash_entry(&self, project: &Project) -> Result<(), PermissionDenied> {
        self.require_scoped(Action::ManageTrash, Permission::ManageTrash, project)
    }

    /// Check whole-board import/export
    ///
    /// Only administrator-equivalent identities pass, even when a scoped
    /// role holds the bit.
    ///
    /// # Errors
    /// `PermissionDenied` for a missing bit or a scoped identity.
    pub fn require_import_export(&self) -> Result<(), PermissionDenied> {
        self.require_global(Action::ImportExport, Permission::ImportExport)?;
        if !self.identity.is_admin_equivalent() {
            return Err(PermissionDenied::new(Action::ImportExport, DenialReason::OutOfScope));
        }
        Ok(())
    }

    /// Check a global (not project-scoped) permission
    ///
    /// # Errors
    /// `PermissionDenied` for view-only identities or a missing bit.
    pub fn require(&self, action: Action) -> Result<(), PermissionDenied> {
        let permission = match action {
            Action::Create => Permission::Create,
            Action::ManageRoles => Permission::ManageRoles,
            Action::ManageLists => Permission::ManageLists,
            Action::ImportExport => return self.require_import_export(),
            Action::ManageTrash => Permission::ManageTrash,
            Action::Edit | Action::Delete | Action::Duplicate => {
                return Err(PermissionDenied::new(action, DenialReason::OutOfScope));
            }
        };
        self.require_global(action, permission)
    }

    /// Check values about to be written to a project against the scope
    ///
    /// Administrator-equivalent identities may assign anything.
    ///
    /// # Errors
    /// `PermissionDenied` naming the offending field.
    pub fn check_assignment(
        &self,
        action: Action,
        channel: &str,
        platform: &str,
        editor: &str,
    ) -> Result<(), PermissionDenied> {
        if self.identity.is_admin_equivalent() {
            return Ok(());
        }
        self.identity
            .scope
            .check_assignment(channel, platform, editor)
            .map_err(|violation| PermissionDenied::new(action, DenialReason::Assignment(violation)))
    }

    fn require_global(&self, action: Action, permission: Permission) -> Result<(), PermissionDenied> {
        if self.identity.view_only {
            return Err(PermissionDenied::new(action, DenialReason::ViewOnly));
        }
        if !self.identity.has(permission) {
            return Err(PermissionDenied::new(action, DenialReason::MissingPermission));
        }
        Ok(())
    }

    fn require_scoped(
        &self,
        action: Action,
        permission: Permission,
        project: &Project,
    ) -> Result<(), PermissionDenied> {
        self.require_global(action, permission)?;
        if !self.can_view(project) {
            return Err(PermissionDenied::new(action, DenialReason::OutOfScope));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthGate;
    use crate::permission::PermissionSet;
    use crate::registry::RoleRegistry;
    use cutboard_model::{ProjectDraft, Timestamp};

    fn login(password: &str) -> Identity {
        AuthGate::new()
            .authenticate(&RoleRegistry::default(), password)
            .unwrap()
    }

    fn project(channel: &str) -> Project {
        Project::from_draft(
            ProjectDraft::new(format!("on {channel}"))
                .with_channel(channel)
                .with_client("Nova"),
            Timestamp::from_millis(0),
        )
    }

    #[test]
    fn admin_sees_everything() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let projects = [project("Main Brand"), project("Client Channel"), project("")];
        assert_eq!(access.visible_projects(&projects).len(), 3);
        assert!(access.can_edit(&projects[2]));
        assert_eq!(
            access.affordances(),
            Affordances {
                add_project: true,
                manage_lists: true,
                import: true,
                export: true,
                admin_panel: true,
                trash: true,
            }
        );
    }

    #[test]
    fn channel_scope_limits_visibility_and_edits() {
        let client_channel_only = login("client2024");
        let access = AccessEvaluator::new(&client_channel_only);
        let main = project("Main Brand");
        let client = project("Client Channel");

        assert!(!access.can_view(&main));
        assert!(access.can_view(&client));
        assert!(!access.can_edit(&client));
    }

    #[test]
    fn scoped_editor_cannot_touch_other_channels() {
        let mia = login("mia2024");
        let access = AccessEvaluator::new(&mia);
        let own = project("Clips Channel");
        let other = project("Client Channel");

        assert!(access.can_edit(&own));
        assert!(access.can_delete(&own));
        assert!(access.can_duplicate(&own));

        let err = access.require_edit(&other).unwrap_err();
        assert_eq!(err.reason, DenialReason::OutOfScope);
        assert!(!access.can_delete(&other));
        assert!(!access.can_duplicate(&other));
    }

    #[test]
    fn view_only_denied_writes() {
        let client = login("client2024");
        let access = AccessEvaluator::new(&client);
        assert!(!access.can_create());
        assert_eq!(
            access.require_create().unwrap_err().reason,
            DenialReason::ViewOnly
        );
        assert_eq!(access.affordances(), Affordances::default());
    }

    #[test]
    fn assignment_checked_against_scope() {
        let leo = login("leo2024");
        let access = AccessEvaluator::new(&leo);
        assert!(access
            .check_assignment(Action::Create, "Main Brand", "YouTube", "Leo")
            .is_ok());
        let err = access
            .check_assignment(Action::Create, "Clips Channel", "YouTube", "Leo")
            .unwrap_err();
        assert!(matches!(err.reason, DenialReason::Assignment(ref v) if v.field == "channel"));
    }

    #[test]
    fn client_pattern_sees_own_client() {
        let nova = login("client-nova");
        let access = AccessEvaluator::new(&nova);
        let mut other = project("Client Channel");
        other.client = "TechCorp".to_string();

        assert!(access.can_view(&project("Main Brand")));
        assert!(!access.can_view(&other));
    }

    #[test]
    fn trash_entries_follow_scope() {
        let mia = login("mia2024");
        let access = AccessEvaluator::new(&mia);
        assert!(access.can_manage_trash());
        assert!(access.can_manage_trash_entry(&project("Clips Channel")));

        let err = access.require_trash_entry(&project("Client Channel")).unwrap_err();
        assert_eq!(err.action, Action::ManageTrash);
        assert_eq!(err.reason, DenialReason::OutOfScope);
    }

    #[test]
    fn scoped_identity_cannot_export() {
        let mut ops = login("mia2024");
        ops.permissions = PermissionSet::new()
            .with(Permission::View)
            .with(Permission::ImportExport);
        let access = AccessEvaluator::new(&ops);

        assert!(!access.can_import_export());
        assert_eq!(
            access.require(Action::ImportExport).unwrap_err().reason,
            DenialReason::OutOfScope
        );
        assert!(!access.affordances().export);
        assert!(AccessEvaluator::new(&login("mhm2024")).can_import_export());
    }

    #[test]
    fn require_rejects_project_scoped_actions() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        assert!(access.require(Action::ManageTrash).is_ok());
        assert!(access.require(Action::Edit).is_err());
    }
}
