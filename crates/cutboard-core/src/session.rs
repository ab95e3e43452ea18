//! Tracker session
//!
//! The explicit application state: role registry, project store, current
//! identity and the storage backend they serialize to. All mutation goes
//! through the methods here, each of which:
//! 1. resolves an [`AccessEvaluator`] for the logged-in identity
//! 2. runs the all-or-nothing store operation
//! 3. writes the whole state through to storage
//!
//! Storage failures never undo a mutation. They are logged, kept as
//! warnings for the presentation layer and retried by the next save.

use crate::board::{Board, BoardFilter};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use cutboard_access::{
    AccessEvaluator, Action, Affordances, AuthGate, CustomRoleRequest, Identity, Role, RoleKey,
    RoleRegistry,
};
use cutboard_model::{Clock, Project, ProjectDraft, ProjectId, ProjectPatch, Stage, SystemClock, Timestamp};
use cutboard_store::{
    decode_custom_roles, encode_custom_roles, sample_store, BoardStats, ExportDocument,
    ImportBundle, ListKind, PersistenceError, ProjectForm, ProjectStore, StateDocument,
    StorageBackend, Transition,
};
use std::sync::Arc;

fn evaluator(identity: Option<&Identity>) -> Result<AccessEvaluator<'_>, TrackerError> {
    identity
        .map(AccessEvaluator::new)
        .ok_or(TrackerError::NotAuthenticated)
}

/// One user's view of the tracker
#[derive(Debug)]
pub struct Session<S: StorageBackend> {
    config: TrackerConfig,
    storage: S,
    clock: Arc<dyn Clock>,
    registry: RoleRegistry,
    gate: AuthGate,
    store: ProjectStore,
    identity: Option<Identity>,
    warnings: Vec<String>,
    last_saved: Option<Timestamp>,
}

impl<S: StorageBackend> Session<S> {
    /// Open a session on the system clock
    #[must_use]
    pub fn open(config: TrackerConfig, storage: S) -> Self {
        Self::open_with_clock(config, storage, Arc::new(SystemClock))
    }

    /// Open a session, loading custom roles and board state
    ///
    /// With no stored state the board is seeded with sample projects (when
    /// enabled) and saved. Unreadable storage is reported as a warning and
    /// treated as no data.
    #[must_use]
    pub fn open_with_clock(config: TrackerConfig, storage: S, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self {
            registry: RoleRegistry::new(config.legacy_password.clone()),
            gate: AuthGate::new().with_pattern_logins(config.pattern_logins),
            store: ProjectStore::new(),
            identity: None,
            warnings: Vec::new(),
            last_saved: None,
            config,
            storage,
            clock,
        };
        session.load_custom_roles();
        if !session.load_state() {
            session.seed();
        }
        session
    }

    fn load_custom_roles(&mut self) {
        let key = self.config.custom_roles_key.clone();
        let roles = match self.storage.read(&key) {
            Ok(Some(raw)) => decode_custom_roles(&raw, &key),
            Ok(None) => return,
            Err(e) => Err(e),
        };
        match roles {
            Ok(roles) => {
                for skipped in self.registry.load_custom(roles) {
                    self.warn(format!("custom role '{skipped}' conflicts with an existing role and was ignored"));
                }
            }
            Err(e) => self.warn(format!("failed to load custom roles: {e}")),
        }
    }

    fn load_state(&mut self) -> bool {
        let key = self.config.storage_key.clone();
        let document = match self.storage.read(&key) {
            Ok(Some(raw)) => StateDocument::decode(&raw, &key),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        match document {
            Ok(Some(document)) => {
                self.last_saved = Some(document.last_saved);
                self.store = document.into_store();
                tracing::info!(
                    projects = self.store.projects().len(),
                    trash = self.store.trash().len(),
                    "Board loaded"
                );
                true
            }
            Ok(None) => {
                tracing::info!("No existing data found");
                false
            }
            Err(e) => {
                self.warn(format!("failed to load data: {e}"));
                false
            }
        }
    }

    fn seed(&mut self) {
        if !self.config.seed_sample_data {
            return;
        }
        self.store = sample_store(self.clock.now());
        tracing::info!("Seeded sample projects");
        self.persist();
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Write the board state to storage
    ///
    /// # Errors
    /// `PersistenceError` if encoding or the backend write fails.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        let now = self.clock.now();
        let raw = StateDocument::capture(&self.store, now).to_json()?;
        self.storage.write(&self.config.storage_key, &raw)?;
        self.last_saved = Some(now);
        tracing::debug!(at = %now, "Board saved");
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            self.warn(format!("failed to save data: {e}"));
        }
    }

    fn persist_custom_roles(&mut self) {
        let result = encode_custom_roles(self.registry.custom_roles()).and_then(|raw| {
            self.storage
                .write(&self.config.custom_roles_key, &raw)
        });
        if let Err(e) = result {
            self.warn(format!("failed to save custom roles: {e}"));
        }
    }

    /// Periodic tick: save only while someone is logged in
    pub fn autosave(&mut self) -> bool {
        if self.identity.is_none() {
            return false;
        }
        self.persist();
        true
    }

    /// Warnings raised since the last call
    pub fn drain_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Storage backend
    #[inline]
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Project store, unfiltered
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Role registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Logged-in identity
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Time of the last successful save
    #[inline]
    #[must_use]
    pub fn last_saved(&self) -> Option<Timestamp> {
        self.last_saved
    }

    /// Current time from the session clock
    #[inline]
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Authenticate, replacing any current identity
    ///
    /// # Errors
    /// `TrackerError::Auth` when the password matches nothing.
    pub fn login(&mut self, password: &str) -> Result<&Identity, TrackerError> {
        let identity = self.gate.authenticate(&self.registry, password)?;
        tracing::info!(role = %identity.role, method = ?identity.method, "Logged in");
        Ok(self.identity.insert(identity))
    }

    /// Flush state to storage, then clear the identity
    pub fn logout(&mut self) -> Option<Identity> {
        if self.identity.is_some() {
            self.persist();
        }
        let identity = self.identity.take();
        if let Some(identity) = &identity {
            tracing::info!(role = %identity.role, "Logged out");
        }
        identity
    }

    /// Evaluator for the logged-in identity
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn access(&self) -> Result<AccessEvaluator<'_>, TrackerError> {
        evaluator(self.identity.as_ref())
    }

    /// Surfaces to offer the logged-in identity
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn affordances(&self) -> Result<Affordances, TrackerError> {
        Ok(self.access()?.affordances())
    }

    /// Active projects within scope
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn visible_projects(&self) -> Result<Vec<&Project>, TrackerError> {
        let access = self.access()?;
        Ok(self.store.visible(&access))
    }

    /// Trash entries within scope
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn visible_trash(&self) -> Result<Vec<&Project>, TrackerError> {
        let access = self.access()?;
        Ok(self.store.visible_trash(&access))
    }

    /// Visible project by id
    ///
    /// # Errors
    /// - `TrackerError::NotAuthenticated` when nobody is logged in
    /// - `TrackerError::Store(NotFound)` if the id is absent or outside scope
    pub fn project(&self, id: &ProjectId) -> Result<&Project, TrackerError> {
        let access = self.access()?;
        self.store
            .get(id)
            .filter(|p| access.can_view(p))
            .ok_or_else(|| cutboard_store::StoreError::NotFound(id.clone()).into())
    }

    /// Filtered board columns
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn board(&self, filter: &BoardFilter) -> Result<Board<'_>, TrackerError> {
        Ok(Board::build(self.visible_projects()?, filter))
    }

    /// Stats over the visible projects and trash
    ///
    /// # Errors
    /// `TrackerError::NotAuthenticated` when nobody is logged in.
    pub fn stats(&self) -> Result<BoardStats, TrackerError> {
        let trash = self.visible_trash()?.len();
        Ok(BoardStats::compute(self.visible_projects()?, trash))
    }

    /// Create a project
    ///
    /// # Errors
    /// See [`ProjectStore::create`].
    pub fn create(&mut self, draft: ProjectDraft) -> Result<Project, TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        let project = self.store.create(draft, &access, now)?.clone();
        self.persist();
        Ok(project)
    }

    /// Merge fields into a project
    ///
    /// # Errors
    /// See [`ProjectStore::update`].
    pub fn update(&mut self, id: &ProjectId, patch: ProjectPatch) -> Result<Project, TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        let project = self.store.update(id, patch, &access, now)?.clone();
        self.persist();
        Ok(project)
    }

    /// Blank edit form for a new card
    ///
    /// # Errors
    /// `TrackerError::Permission` without create permission.
    pub fn new_form(&self, stage: Stage) -> Result<ProjectForm, TrackerError> {
        self.access()?.require_create()?;
        Ok(ProjectForm::blank(stage))
    }

    /// Edit form for an existing card
    ///
    /// # Errors
    /// See [`ProjectForm::edit`].
    pub fn edit_form(&self, id: &ProjectId) -> Result<ProjectForm, TrackerError> {
        let access = self.access()?;
        Ok(ProjectForm::edit(&self.store, id, &access)?)
    }

    /// Commit an edit form
    ///
    /// # Errors
    /// See [`ProjectForm::submit`].
    pub fn submit_form(&mut self, form: &ProjectForm) -> Result<ProjectId, TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        let id = form.submit(&mut self.store, &access, now)?;
        self.persist();
        Ok(id)
    }

    /// Move a project to another stage; no-ops are not saved
    ///
    /// # Errors
    /// See [`ProjectStore::move_stage`].
    pub fn move_stage(&mut self, id: &ProjectId, stage: Stage) -> Result<Transition, TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        let transition = self.store.move_stage(id, stage, &access, now)?;
        if transition.is_change() {
            self.persist();
        }
        Ok(transition)
    }

    /// Move a project straight to Posted
    ///
    /// # Errors
    /// See [`ProjectStore::move_stage`].
    pub fn quick_complete(&mut self, id: &ProjectId) -> Result<Transition, TrackerError> {
        self.move_stage(id, Stage::TERMINAL)
    }

    /// Move a project to the trash
    ///
    /// # Errors
    /// See [`ProjectStore::delete`].
    pub fn delete(&mut self, id: &ProjectId) -> Result<(), TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        self.store.delete(id, &access, now)?;
        self.persist();
        Ok(())
    }

    /// Copy a project
    ///
    /// # Errors
    /// See [`ProjectStore::duplicate`].
    pub fn duplicate(&mut self, id: &ProjectId) -> Result<Project, TrackerError> {
        let now = self.clock.now();
        let access = evaluator(self.identity.as_ref())?;
        let copy = self.store.duplicate(id, &access, now)?.clone();
        self.persist();
        Ok(copy)
    }

    /// Restore a trash entry; `false` if it was not in the trash
    ///
    /// # Errors
    /// See [`ProjectStore::restore`].
    pub fn restore(&mut self, id: &ProjectId) -> Result<bool, TrackerError> {
        let access = evaluator(self.identity.as_ref())?;
        let restored = self.store.restore(id, &access)?;
        if restored {
            self.persist();
        }
        Ok(restored)
    }

    /// Delete one trash entry for good
    ///
    /// # Errors
    /// See [`ProjectStore::permanently_delete`].
    pub fn permanently_delete(&mut self, id: &ProjectId) -> Result<bool, TrackerError> {
        let access = evaluator(self.identity.as_ref())?;
        let removed = self.store.permanently_delete(id, &access)?;
        if removed {
            self.persist();
        }
        Ok(removed)
    }

    /// Empty the trash
    ///
    /// # Errors
    /// See [`ProjectStore::empty_trash`].
    pub fn empty_trash(&mut self) -> Result<usize, TrackerError> {
        let access = evaluator(self.identity.as_ref())?;
        let count = self.store.empty_trash(&access)?;
        if count > 0 {
            self.persist();
        }
        Ok(count)
    }

    /// Add a pick-list entry
    ///
    /// # Errors
    /// See [`ProjectStore::add_list_entry`].
    pub fn add_list_entry(&mut self, kind: ListKind, value: &str) -> Result<(), TrackerError> {
        let access = evaluator(self.identity.as_ref())?;
        self.store.add_list_entry(kind, value, &access)?;
        self.persist();
        Ok(())
    }

    /// Remove a pick-list entry
    ///
    /// # Errors
    /// See [`ProjectStore::remove_list_entry`].
    pub fn remove_list_entry(&mut self, kind: ListKind, value: &str) -> Result<bool, TrackerError> {
        let access = evaluator(self.identity.as_ref())?;
        let removed = self.store.remove_list_entry(kind, value, &access)?;
        if removed {
            self.persist();
        }
        Ok(removed)
    }

    /// Every role, built-in first
    ///
    /// # Errors
    /// `TrackerError::Permission` without manage-roles.
    pub fn roles(&self) -> Result<Vec<&Role>, TrackerError> {
        self.access()?.require(Action::ManageRoles)?;
        Ok(self.registry.all().collect())
    }

    /// Create a custom role; unset platforms/editors default to the pick-lists
    ///
    /// # Errors
    /// - `TrackerError::Permission` without manage-roles
    /// - `TrackerError::Role` for rejected input
    pub fn create_role(&mut self, request: CustomRoleRequest) -> Result<Role, TrackerError> {
        self.access()?.require(Action::ManageRoles)?;
        let lists = self.store.lists();
        let role = self
            .registry
            .create_custom(request, &lists.platforms, &lists.editors)?
            .clone();
        self.persist_custom_roles();
        Ok(role)
    }

    /// Delete a custom role
    ///
    /// # Errors
    /// - `TrackerError::Permission` without manage-roles
    /// - `TrackerError::Role` for built-in or unknown keys
    pub fn delete_role(&mut self, key: &RoleKey) -> Result<Role, TrackerError> {
        self.access()?.require(Action::ManageRoles)?;
        let role = self.registry.delete_custom(key)?;
        self.persist_custom_roles();
        Ok(role)
    }

    /// Snapshot the whole board for download
    ///
    /// # Errors
    /// `TrackerError::Permission` without import/export or for a scoped identity.
    pub fn export(&self) -> Result<ExportDocument, TrackerError> {
        self.access()?.require(Action::ImportExport)?;
        Ok(ExportDocument::capture(&self.store, self.clock.now()))
    }

    /// Replace the board with an import bundle
    ///
    /// Nothing changes unless `confirmed`. Returns whether the bundle was applied.
    ///
    /// # Errors
    /// `TrackerError::Permission` without import/export or for a scoped identity.
    pub fn import(&mut self, bundle: ImportBundle, confirmed: bool) -> Result<bool, TrackerError> {
        self.access()?.require(Action::ImportExport)?;
        if !confirmed {
            tracing::debug!("Import cancelled");
            return Ok(false);
        }
        let (projects, trash) = (bundle.projects.len(), bundle.trash.len());
        bundle.apply_to(&mut self.store);
        tracing::info!(projects, trash, "Board imported");
        self.persist();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutboard_model::ManualClock;
    use cutboard_store::MemoryStorage;

    fn session() -> Session<Arc<MemoryStorage>> {
        Session::open_with_clock(
            TrackerConfig::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::new(Timestamp::from_millis(1_000_000))),
        )
    }

    #[test]
    fn first_open_seeds_and_saves() {
        let session = session();
        assert_eq!(session.store().projects().len(), 2);
        assert!(session.storage().get("mhm-tracker-data-v3").is_some());
        assert!(session.last_saved().is_some());
    }

    #[test]
    fn operations_require_login() {
        let mut session = session();
        assert!(matches!(session.visible_projects(), Err(TrackerError::NotAuthenticated)));
        assert!(session.create(ProjectDraft::new("x")).unwrap_err().is_permission());
        assert!(!session.autosave());
    }

    #[test]
    fn logout_flushes_then_clears() {
        let mut session = session();
        session.login("admin2024").unwrap();
        let writes = session.storage().write_count();
        assert_eq!(session.logout().unwrap().role.as_str(), "admin");
        assert_eq!(session.storage().write_count(), writes + 1);
        assert!(session.identity().is_none());
        assert!(session.logout().is_none());
    }

    #[test]
    fn relogin_replaces_identity() {
        let mut session = session();
        session.login("mia2024").unwrap();
        session.login("leo2024").unwrap();
        assert_eq!(session.identity().unwrap().role.as_str(), "leo");
    }

    #[test]
    fn failed_save_keeps_state_and_warns() {
        let mut session = session();
        session.login("admin2024").unwrap();
        session.storage().set_fail_writes(true);

        let project = session.create(ProjectDraft::new("Offline edit")).unwrap();
        assert!(session.store().get(&project.id).is_some());
        assert_eq!(session.drain_warnings().len(), 1);
        assert!(session.drain_warnings().is_empty());

        session.storage().set_fail_writes(false);
        assert!(session.autosave());
        let raw = session.storage().get("mhm-tracker-data-v3").unwrap();
        assert!(raw.contains("Offline edit"));
    }

    #[test]
    fn unconfirmed_import_changes_nothing() {
        let mut session = session();
        session.login("admin2024").unwrap();
        let before = session.store().clone();
        let bundle = ImportBundle::parse(r#"{"projects":[]}"#).unwrap();

        assert!(!session.import(bundle.clone(), false).unwrap());
        assert_eq!(session.store(), &before);
        assert!(session.import(bundle, true).unwrap());
        assert!(session.store().projects().is_empty());
    }

    #[test]
    fn scoped_editor_cannot_import_or_manage_roles() {
        let mut session = session();
        session.login("mia2024").unwrap();
        assert!(session.export().unwrap_err().is_permission());
        assert!(session.roles().unwrap_err().is_permission());
        assert!(session
            .create_role(CustomRoleRequest::new("Night", "night1").with_channels(["Main Brand"]))
            .unwrap_err()
            .is_permission());
    }
}
