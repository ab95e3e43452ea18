//! Cutboard Store
//!
//! Owns the board's data and everything that changes it:
//! - [`ProjectStore`]: active and trash collections, stage moves, pick-lists
//! - [`ProjectForm`]: edit buffer committed through create or update
//! - [`BoardStats`]: counts and cycle time over a visible set
//! - [`StorageBackend`]: blocking key-value persistence ([`MemoryStorage`], [`FileStorage`])
//! - [`StateDocument`], [`ExportDocument`], [`ImportBundle`]: on-disk formats and migration
//!
//! Every mutating operation takes an [`cutboard_access::AccessEvaluator`] and
//! is all-or-nothing against in-memory state.
//!
//! # Example
//!
//! ```rust,ignore
//! use cutboard_store::{ProjectStore, Transition};
//!
//! let mut store = ProjectStore::new();
//! let id = store.create(draft, &access, now)?.id.clone();
//! assert!(store.move_stage(&id, Stage::Editing, &access, now)?.is_change());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod document;
pub mod error;
pub mod form;
pub mod persistence;
pub mod picklist;
pub mod seed;
pub mod stats;
pub mod store;

pub use document::{
    decode_custom_roles, encode_custom_roles, migrate_project, ExportDocument, ImportBundle,
    StateDocument, EXPORT_VERSION, STORAGE_VERSION,
};
pub use error::{ImportError, PersistenceError, StoreError};
pub use form::{FormTarget, ProjectForm};
pub use persistence::{FileStorage, MemoryStorage, StorageBackend};
pub use picklist::{ListKind, PickLists, DEFAULT_CHANNELS, DEFAULT_EDITORS, DEFAULT_PLATFORMS};
pub use seed::{sample_projects, sample_store};
pub use stats::BoardStats;
pub use store::{ProjectStore, Transition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
