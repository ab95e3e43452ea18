//! Project edit form
//!
//! A [`ProjectForm`] holds the draft fields and the checklist buffer for one
//! card while it is open. Nothing reaches the store until [`ProjectForm::submit`];
//! dropping the form discards every buffered change.

use crate::error::StoreError;
use crate::store::ProjectStore;
use cutboard_access::AccessEvaluator;
use cutboard_model::{ChecklistItem, ItemId, ProjectDraft, ProjectId, ProjectPatch, Stage, Timestamp};

/// What a submitted form writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    /// Creates a new project
    New,
    /// Updates an existing project
    Existing(ProjectId),
}

/// Open edit buffer for one card
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    target: FormTarget,
    /// Field values as currently entered
    pub draft: ProjectDraft,
}

impl ProjectForm {
    /// Blank form for a new card in `stage`
    #[must_use]
    pub fn blank(stage: Stage) -> Self {
        Self {
            target: FormTarget::New,
            draft: ProjectDraft::default().with_stage(stage),
        }
    }

    /// Form pre-filled from an existing card
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the id is not active
    /// - `StoreError::Permission` if the card is not editable
    pub fn edit(store: &ProjectStore, id: &ProjectId, access: &AccessEvaluator<'_>) -> Result<Self, StoreError> {
        let project = store.get(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        access.require_edit(project)?;
        Ok(Self {
            target: FormTarget::Existing(id.clone()),
            draft: ProjectDraft::from_project(project),
        })
    }

    /// Where a submit will write
    #[inline]
    #[must_use]
    pub fn target(&self) -> &FormTarget {
        &self.target
    }

    /// Buffered checklist
    #[inline]
    #[must_use]
    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.draft.checklist
    }

    /// Append a checklist item; blank text is ignored
    pub fn add_item(&mut self, text: &str) -> Option<ItemId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let item = ChecklistItem::new(text);
        let id = item.id.clone();
        self.draft.checklist.push(item);
        Some(id)
    }

    /// Flip an item's done flag; returns whether the item exists
    pub fn toggle_item(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        item.done = !item.done;
        true
    }

    /// Replace an item's text; returns whether the item exists
    pub fn update_item_text(&mut self, id: &ItemId, text: &str) -> bool {
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        item.text = text.to_string();
        true
    }

    /// Drop an item; returns whether the item existed
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let before = self.draft.checklist.len();
        self.draft.checklist.retain(|item| &item.id != id);
        self.draft.checklist.len() != before
    }

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut ChecklistItem> {
        self.draft.checklist.iter_mut().find(|item| &item.id == id)
    }

    /// Commit the buffer through create or update
    ///
    /// The form is left intact on failure so the user can correct it.
    ///
    /// # Errors
    /// Whatever [`ProjectStore::create`] or [`ProjectStore::update`] raise.
    pub fn submit(
        &self,
        store: &mut ProjectStore,
        access: &AccessEvaluator<'_>,
        now: Timestamp,
    ) -> Result<ProjectId, StoreError> {
        let draft = self.draft.clone();
        let project = match &self.target {
            FormTarget::New => store.create(draft, access, now)?,
            FormTarget::Existing(id) => store.update(id, ProjectPatch::from(draft), access, now)?,
        };
        Ok(project.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutboard_access::{AuthGate, Identity, RoleRegistry};

    fn admin() -> Identity {
        AuthGate::new()
            .authenticate(&RoleRegistry::default(), "admin2024")
            .unwrap()
    }

    #[test]
    fn checklist_buffer_not_committed_until_submit() {
        let admin = admin();
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();

        let mut form = ProjectForm::blank(Stage::Assigned);
        form.draft.title = "Reel".to_string();
        let first = form.add_item("Rough cut").unwrap();
        let second = form.add_item("Color grade").unwrap();
        assert!(form.add_item("   ").is_none());
        assert!(form.toggle_item(&first));
        assert!(form.update_item_text(&second, "Grade"));
        assert!(form.remove_item(&first));
        assert!(store.projects().is_empty());

        let id = form.submit(&mut store, &access, Timestamp::from_millis(5)).unwrap();
        let project = store.get(&id).unwrap();
        assert_eq!(project.stage, Stage::Assigned);
        assert_eq!(project.checklist.len(), 1);
        assert_eq!(project.checklist[0].text, "Grade");
    }

    #[test]
    fn abandoned_edit_changes_nothing() {
        let admin = admin();
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();
        let id = store
            .create(ProjectDraft::new("Reel"), &access, Timestamp::from_millis(0))
            .unwrap()
            .id
            .clone();

        let mut form = ProjectForm::edit(&store, &id, &access).unwrap();
        form.add_item("Never saved");
        form.draft.title = "Renamed".to_string();
        drop(form);

        let project = store.get(&id).unwrap();
        assert_eq!(project.title, "Reel");
        assert!(project.checklist.is_empty());
    }

    #[test]
    fn failed_submit_keeps_form() {
        let admin = admin();
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();

        let mut form = ProjectForm::blank(Stage::Uploaded);
        form.add_item("Keep me");
        assert!(matches!(
            form.submit(&mut store, &access, Timestamp::from_millis(0)),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(form.checklist().len(), 1);
    }

    #[test]
    fn edit_submit_updates_in_place() {
        let admin = admin();
        let access = AccessEvaluator::new(&admin);
        let mut store = ProjectStore::new();
        let id = store
            .create(ProjectDraft::new("Reel"), &access, Timestamp::from_millis(0))
            .unwrap()
            .id
            .clone();

        let mut form = ProjectForm::edit(&store, &id, &access).unwrap();
        form.draft.stage = Stage::Editing;
        assert_eq!(form.submit(&mut store, &access, Timestamp::from_millis(10)).unwrap(), id);

        let project = store.get(&id).unwrap();
        assert_eq!(project.stage, Stage::Editing);
        assert_eq!(project.timeline.len(), 2);
        assert_eq!(store.projects().len(), 1);
    }

    #[test]
    fn edit_out_of_scope_denied() {
        let admin = admin();
        let mut store = ProjectStore::new();
        let id = store
            .create(
                ProjectDraft::new("Brand reel").with_channel("Main Brand"),
                &AccessEvaluator::new(&admin),
                Timestamp::from_millis(0),
            )
            .unwrap()
            .id
            .clone();

        let client = AuthGate::new()
            .authenticate(&RoleRegistry::default(), "client2024")
            .unwrap();
        assert!(matches!(
            ProjectForm::edit(&store, &id, &AccessEvaluator::new(&client)),
            Err(StoreError::Permission(_))
        ));
    }
}
