//! Checklist entries attached to a project

use crate::ids::ItemId;
use serde::{Deserialize, Serialize};

/// One to-do line on a project card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item id, unique within its project
    #[serde(default)]
    pub id: ItemId,
    /// Item text
    #[serde(default)]
    pub text: String,
    /// Whether the item is ticked
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    /// Create an unticked item with a fresh id
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            text: text.into(),
            done: false,
        }
    }

    /// Copy the text into a fresh, unticked item
    #[inline]
    #[must_use]
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.text.clone())
    }
}
