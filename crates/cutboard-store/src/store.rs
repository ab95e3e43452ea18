//! Project store
//!
//! Single owner and writer of the active and trash collections and the
//! pick-lists. Every mutation asks the [`AccessEvaluator`] first and runs all
//! checks before touching state, so a failed call leaves everything as it was.
//!
//! Stage transitions are unrestricted point-to-point moves; each one records
//! the entry time in the project's timeline.

use crate::error::StoreError;
use crate::picklist::{ListKind, PickLists};
use cutboard_access::{AccessEvaluator, Action};
use cutboard_model::{Project, ProjectDraft, ProjectId, ProjectPatch, Stage, Timestamp};

/// Outcome of a stage move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stage changed and timeline recorded
    Moved {
        /// Previous stage
        from: Stage,
        /// New stage
        to: Stage,
    },
    /// Already in the target stage; nothing written
    Unchanged,
    /// No active project with that id; nothing written
    Missing,
}

impl Transition {
    /// Whether state changed
    #[inline]
    #[must_use]
    pub fn is_change(self) -> bool {
        matches!(self, Transition::Moved { .. })
    }
}

/// Active projects, trash and pick-lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStore {
    projects: Vec<Project>,
    trash: Vec<Project>,
    lists: PickLists,
}

impl ProjectStore {
    /// Empty store with default pick-lists
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the given collections
    #[must_use]
    pub fn from_parts(projects: Vec<Project>, trash: Vec<Project>, lists: PickLists) -> Self {
        Self {
            projects,
            trash,
            lists,
        }
    }

    /// Replace every collection wholesale
    pub fn replace(&mut self, projects: Vec<Project>, trash: Vec<Project>, lists: PickLists) {
        self.projects = projects;
        self.trash = trash;
        self.lists = lists;
    }

    /// Active projects
    #[inline]
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Trash entries
    #[inline]
    #[must_use]
    pub fn trash(&self) -> &[Project] {
        &self.trash
    }

    /// Pick-lists
    #[inline]
    #[must_use]
    pub fn lists(&self) -> &PickLists {
        &self.lists
    }

    /// Active project by id
    #[must_use]
    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Trash entry by id
    #[must_use]
    pub fn get_trashed(&self, id: &ProjectId) -> Option<&Project> {
        self.trash.iter().find(|p| &p.id == id)
    }

    /// Active projects within the identity's scope
    #[must_use]
    pub fn visible<'s>(&'s self, access: &AccessEvaluator<'_>) -> Vec<&'s Project> {
        access.visible_projects(&self.projects)
    }

    /// Trash entries within the identity's scope
    #[must_use]
    pub fn visible_trash<'s>(&'s self, access: &AccessEvaluator<'_>) -> Vec<&'s Project> {
        access.visible_projects(&self.trash)
    }

    fn position(&self, id: &ProjectId) -> Result<usize, StoreError> {
        self.projects
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Create a project from a draft
    ///
    /// # Errors
    /// - `StoreError::Validation` if the title is empty
    /// - `StoreError::Permission` without create permission, or when the
    ///   channel/platform/editor is outside scope
    pub fn create(
        &mut self,
        draft: ProjectDraft,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<&Project, StoreError> {
        let draft = draft.trimmed();
        if draft.title.is_empty() {
            return Err(StoreError::validation("Please enter a project title"));
        }
        access.require_create()?;
        access.check_assignment(Action::Create, &draft.channel, &draft.platform, &draft.editor)?;

        let project = Project::from_draft(draft, now);
        self.lists
            .absorb(&project.editor, &project.platform, &project.channel);
        tracing::info!(id = %project.id, stage = %project.stage, "Project created");

        self.projects.push(project);
        Ok(&self.projects[self.projects.len() - 1])
    }

    /// Shallow-merge fields into an existing project
    ///
    /// The timeline is kept; a stage change in the patch is recorded like a move.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the id is not active
    /// - `StoreError::Permission` if the project is not editable or a new
    ///   channel/platform/editor is outside scope
    /// - `StoreError::Validation` if the patch blanks the title
    pub fn update(
        &mut self,
        id: &ProjectId,
        mut patch: ProjectPatch,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<&Project, StoreError> {
        let index = self.position(id)?;
        access.require_edit(&self.projects[index])?;

        for field in [
            &mut patch.title,
            &mut patch.client,
            &mut patch.editor,
            &mut patch.platform,
            &mut patch.channel,
        ]
        .into_iter()
        .flatten()
        {
            *field = field.trim().to_string();
        }
        if patch.clears_title() {
            return Err(StoreError::validation("Please enter a project title"));
        }
        let project = &mut self.projects[index];
        // Only values that change are checked; existing out-of-scope values may stay
        let changed = |new: &Option<String>, old: &str| match new.as_deref() {
            Some(value) if value != old => value.to_string(),
            _ => String::new(),
        };
        access.check_assignment(
            Action::Edit,
            &changed(&patch.channel, &project.channel),
            &changed(&patch.platform, &project.platform),
            &changed(&patch.editor, &project.editor),
        )?;

        project.apply(patch, now);
        self.lists
            .absorb(&project.editor, &project.platform, &project.channel);
        tracing::info!(id = %project.id, "Project updated");
        Ok(&self.projects[index])
    }

    /// Move a project to another stage
    ///
    /// A missing id or a move to the current stage is a silent no-op.
    ///
    /// # Errors
    /// `StoreError::Permission` if the project is not editable.
    pub fn move_stage(
        &mut self,
        id: &ProjectId,
        stage: Stage,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<Transition, StoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| &p.id == id) else {
            tracing::debug!(%id, "Move ignored: project not found");
            return Ok(Transition::Missing);
        };
        if project.stage == stage {
            return Ok(Transition::Unchanged);
        }
        access.require_edit(project)?;

        let from = project.stage;
        project.enter_stage(stage, now);
        tracing::info!(%id, %from, to = %stage, "Project moved");
        Ok(Transition::Moved { from, to: stage })
    }

    /// Move a project straight to the terminal stage
    ///
    /// # Errors
    /// As [`ProjectStore::move_stage`].
    pub fn quick_complete(
        &mut self,
        id: &ProjectId,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<Transition, StoreError> {
        self.move_stage(id, Stage::TERMINAL, access, now)
    }

    /// Move a project to the trash
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the id is not active
    /// - `StoreError::Permission` if the project is not deletable
    pub fn delete(
        &mut self,
        id: &ProjectId,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let index = self.position(id)?;
        access.require_delete(&self.projects[index])?;

        let mut project = self.projects.remove(index);
        project.deleted_at = Some(now);
        tracing::info!(%id, "Project moved to trash");
        self.trash.push(project);
        Ok(())
    }

    /// Copy a project as a new active project
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the id is not active
    /// - `StoreError::Permission` without create permission or scope
    pub fn duplicate(
        &mut self,
        id: &ProjectId,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<&Project, StoreError> {
        let index = self.position(id)?;
        access.require_duplicate(&self.projects[index])?;

        let copy = self.projects[index].duplicate(now);
        tracing::info!(%id, copy = %copy.id, "Project duplicated");
        self.projects.push(copy);
        Ok(&self.projects[self.projects.len() - 1])
    }

    /// Move a trash entry back to the active collection
    ///
    /// Returns `false` if the id is not in the trash.
    ///
    /// # Errors
    /// `StoreError::Permission` without trash-management permission or for an
    /// entry outside scope.
    pub fn restore(&mut self, id: &ProjectId, access: &AccessEvaluator<'_>) -> Result<bool, StoreError> {
        access.require(Action::ManageTrash)?;
        let Some(index) = self.trash.iter().position(|p| &p.id == id) else {
            tracing::debug!(%id, "Restore ignored: not in trash");
            return Ok(false);
        };
        access.require_trash_entry(&self.trash[index])?;

        let mut project = self.trash.remove(index);
        project.deleted_at = None;
        tracing::info!(%id, "Project restored");
        self.projects.push(project);
        Ok(true)
    }

    /// Remove one trash entry for good
    ///
    /// Returns `false` if the id is not in the trash.
    ///
    /// # Errors
    /// `StoreError::Permission` without trash-management permission or for an
    /// entry outside scope.
    pub fn permanently_delete(
        &mut self,
        id: &ProjectId,
        access: &AccessEvaluator<'_>,
    ) -> Result<bool, StoreError> {
        access.require(Action::ManageTrash)?;
        let Some(index) = self.trash.iter().position(|p| &p.id == id) else {
            tracing::debug!(%id, "Purge ignored: not in trash");
            return Ok(false);
        };
        access.require_trash_entry(&self.trash[index])?;

        self.trash.remove(index);
        tracing::info!(%id, "Project deleted permanently");
        Ok(true)
    }

    /// Remove every trash entry within scope; returns how many were removed
    ///
    /// Entries the identity cannot see stay in the trash.
    ///
    /// # Errors
    /// `StoreError::Permission` without trash-management permission.
    pub fn empty_trash(&mut self, access: &AccessEvaluator<'_>) -> Result<usize, StoreError> {
        access.require(Action::ManageTrash)?;
        let before = self.trash.len();
        self.trash.retain(|p| !access.can_manage_trash_entry(p));
        let count = before - self.trash.len();
        if count == 0 {
            tracing::debug!("Empty trash: nothing within scope");
        } else {
            tracing::info!(count, kept = self.trash.len(), "Trash emptied");
        }
        Ok(count)
    }

    /// Add a pick-list entry
    ///
    /// # Errors
    /// - `StoreError::Permission` without list-management permission
    /// - `StoreError::Validation` for blank or duplicate values
    pub fn add_list_entry(
        &mut self,
        kind: ListKind,
        value: &str,
        access: &AccessEvaluator<'_>,
    ) -> Result<(), StoreError> {
        access.require(Action::ManageLists)?;
        let value = value.trim();
        if value.is_empty() {
            return Err(StoreError::validation(format!("{} name must not be empty", kind.label())));
        }
        if !self.lists.add(kind, value) {
            return Err(StoreError::validation(format!("{} already exists", kind.label())));
        }
        tracing::info!(list = kind.label(), value, "Pick-list entry added");
        Ok(())
    }

    /// Remove a pick-list entry; projects using it are untouched
    ///
    /// # Errors
    /// `StoreError::Permission` without list-management permission.
    pub fn remove_list_entry(
        &mut self,
        kind: ListKind,
        value: &str,
        access: &AccessEvaluator<'_>,
    ) -> Result<bool, StoreError> {
        access.require(Action::ManageLists)?;
        let removed = self.lists.remove(kind, value);
        if removed {
            tracing::info!(list = kind.label(), value, "Pick-list entry removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutboard_access::{AuthGate, DenialReason, Identity, RoleRegistry};
    use cutboard_model::ChecklistItem;
    use pretty_assertions::assert_eq;

    fn login(password: &str) -> Identity {
        AuthGate::new()
            .authenticate(&RoleRegistry::default(), password)
            .unwrap()
    }

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn seeded(admin: &Identity) -> (ProjectStore, ProjectId) {
        let mut store = ProjectStore::new();
        let access = AccessEvaluator::new(admin);
        let id = store
            .create(
                ProjectDraft::new("Nova launch")
                    .with_channel("Main Brand")
                    .with_editor("Mia")
                    .with_checklist(vec![ChecklistItem::new("Rough cut")]),
                &access,
                at(100),
            )
            .unwrap()
            .id
            .clone();
        (store, id)
    }

    #[test]
    fn create_requires_title() {
        let admin = login("admin2024");
        let mut store = ProjectStore::new();
        let err = store
            .create(ProjectDraft::new("   "), &AccessEvaluator::new(&admin), at(0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn create_seeds_timeline_and_lists() {
        let admin = login("admin2024");
        let mut store = ProjectStore::new();
        let project = store
            .create(
                ProjectDraft::new(" Podcast ep 1 ")
                    .with_channel("Podcast")
                    .with_editor("Ava"),
                &AccessEvaluator::new(&admin),
                at(42),
            )
            .unwrap();
        assert_eq!(project.title, "Podcast ep 1");
        assert_eq!(project.timeline.get(&Stage::Uploaded), Some(&at(42)));
        assert_eq!(project.created_at, at(42));
        assert_eq!(store.lists().editors, ["Ava", "Kai", "Leo", "Mia"]);
        assert!(store.lists().channels.contains(&"Podcast".to_string()));
    }

    #[test]
    fn create_out_of_scope_channel_denied() {
        let mia = login("mia2024");
        let mut store = ProjectStore::new();
        let err = store
            .create(
                ProjectDraft::new("Client spot").with_channel("Client Channel"),
                &AccessEvaluator::new(&mia),
                at(0),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Permission(ref d) if matches!(d.reason, DenialReason::Assignment(_))));
        assert!(store.projects().is_empty());
    }

    #[test]
    fn view_only_cannot_create() {
        let client = login("client2024");
        let mut store = ProjectStore::new();
        let err = store
            .create(ProjectDraft::new("x"), &AccessEvaluator::new(&client), at(0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Permission(_)));
    }

    #[test]
    fn update_merges_and_keeps_timeline() {
        let admin = login("admin2024");
        let (mut store, id) = seeded(&admin);
        let before = store.get(&id).unwrap().timeline.clone();

        let updated = store
            .update(
                &id,
                ProjectPatch::new().with_client("Nova").with_notes("hero first"),
                &AccessEvaluator::new(&admin),
                at(200),
            )
            .unwrap();
        assert_eq!(updated.client, "Nova");
        assert_eq!(updated.notes, "hero first");
        assert_eq!(updated.editor, "Mia");
        assert_eq!(updated.timeline, before);
    }

    #[test]
    fn update_missing_is_not_found() {
        let admin = login("admin2024");
        let mut store = ProjectStore::new();
        let err = store
            .update(&ProjectId::new("nope"), ProjectPatch::new(), &AccessEvaluator::new(&admin), at(0))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(ProjectId::new("nope")));
    }

    #[test]
    fn update_out_of_scope_denied() {
        let admin = login("admin2024");
        let (mut store, id) = seeded(&admin);
        let client = login("client2024");
        let err = store
            .update(&id, ProjectPatch::new().with_title("hijack"), &AccessEvaluator::new(&client), at(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Permission(_)));
        assert_eq!(store.get(&id).unwrap().title, "Nova launch");
    }

    #[test]
    fn update_rejects_blank_title() {
        let admin = login("admin2024");
        let (mut store, id) = seeded(&admin);
        let err = store
            .update(&id, ProjectPatch::new().with_title("  "), &AccessEvaluator::new(&admin), at(1))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn move_stage_records_and_noops() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let (mut store, id) = seeded(&admin);

        assert_eq!(store.move_stage(&id, Stage::Uploaded, &access, at(150)).unwrap(), Transition::Unchanged);
        assert_eq!(
            store.move_stage(&id, Stage::Final, &access, at(300)).unwrap(),
            Transition::Moved { from: Stage::Uploaded, to: Stage::Final }
        );
        assert_eq!(store.get(&id).unwrap().timeline[&Stage::Final], at(300));
        assert_eq!(
            store.move_stage(&ProjectId::new("ghost"), Stage::Final, &access, at(300)).unwrap(),
            Transition::Missing
        );
    }

    #[test]
    fn move_stage_requires_edit() {
        let admin = login("admin2024");
        let (mut store, id) = seeded(&admin);
        let leo = login("leo2024");
        // Main Brand is shared by Mia and Leo
        assert!(store.move_stage(&id, Stage::Editing, &AccessEvaluator::new(&leo), at(1)).is_ok());

        let client = login("client2024");
        assert!(store
            .move_stage(&id, Stage::Posted, &AccessEvaluator::new(&client), at(2))
            .is_err());
        assert_eq!(store.get(&id).unwrap().stage, Stage::Editing);
    }

    #[test]
    fn delete_then_restore_round_trips() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let (mut store, id) = seeded(&admin);
        let original = store.get(&id).unwrap().clone();

        store.delete(&id, &access, at(500)).unwrap();
        assert!(store.get(&id).is_none());
        assert_eq!(store.get_trashed(&id).unwrap().deleted_at, Some(at(500)));

        assert!(store.restore(&id, &access).unwrap());
        assert_eq!(store.get(&id).unwrap(), &original);
        assert!(!store.restore(&id, &access).unwrap());
    }

    #[test]
    fn duplicate_copies_without_progress() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let (mut store, id) = seeded(&admin);

        let copy = store.duplicate(&id, &access, at(900)).unwrap().clone();
        let original = store.get(&id).unwrap();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, "Nova launch (Copy)");
        assert_eq!(copy.timeline.len(), 1);
        assert_eq!(store.projects().len(), 2);
    }

    #[test]
    fn trash_management_requires_permission() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let (mut store, id) = seeded(&admin);
        store.delete(&id, &access, at(1)).unwrap();

        let client = login("client2024");
        let viewer = AccessEvaluator::new(&client);
        assert!(store.restore(&id, &viewer).is_err());
        assert!(store.permanently_delete(&id, &viewer).is_err());
        assert!(store.empty_trash(&viewer).is_err());
        assert_eq!(store.trash().len(), 1);

        assert_eq!(store.empty_trash(&access).unwrap(), 1);
        assert!(store.trash().is_empty());
    }

    #[test]
    fn trash_management_respects_scope() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();
        let mut trash_on = |channel: &str| {
            let id = store
                .create(ProjectDraft::new(channel).with_channel(channel), &access, at(1))
                .unwrap()
                .id
                .clone();
            store.delete(&id, &access, at(2)).unwrap();
            id
        };
        let hidden = trash_on("Client Channel");
        let own = trash_on("Clips Channel");

        let mia = login("mia2024");
        let scoped = AccessEvaluator::new(&mia);
        assert_eq!(store.visible_trash(&scoped).len(), 1);

        let err = store.restore(&hidden, &scoped).unwrap_err();
        assert!(matches!(err, StoreError::Permission(ref d) if d.reason == DenialReason::OutOfScope));
        assert!(store.permanently_delete(&hidden, &scoped).is_err());
        assert_eq!(store.trash().len(), 2);

        assert_eq!(store.empty_trash(&scoped).unwrap(), 1);
        assert!(store.get_trashed(&own).is_none());
        assert!(store.get_trashed(&hidden).is_some());
        assert_eq!(store.empty_trash(&scoped).unwrap(), 0);
    }

    #[test]
    fn list_entries_validated() {
        let admin = login("admin2024");
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();

        store.add_list_entry(ListKind::Platform, " Threads ", &access).unwrap();
        assert!(store.lists().contains(ListKind::Platform, "Threads"));
        assert!(matches!(
            store.add_list_entry(ListKind::Platform, "Threads", &access),
            Err(StoreError::Validation(_))
        ));
        assert!(store.remove_list_entry(ListKind::Platform, "Threads", &access).unwrap());

        let client = login("client2024");
        assert!(store
            .add_list_entry(ListKind::Editor, "Zoe", &AccessEvaluator::new(&client))
            .is_err());
    }
}
