//! Cutboard Core
//!
//! Session layer of the tracker:
//! - [`Session`]: identity, registry, store and storage in one explicit context
//! - [`TrackerConfig`]: storage keys, master password, autosave period
//! - [`spawn_autosave`]: periodic save while someone is logged in
//! - [`Board`]: filtered stage columns for display
//!
//! # Example
//!
//! ```rust,ignore
//! use cutboard_core::{Session, TrackerConfig};
//! use cutboard_store::FileStorage;
//!
//! let mut session = Session::open(TrackerConfig::default(), FileStorage::new("./data"));
//! session.login("mia2024")?;
//! for project in session.visible_projects()? {
//!     println!("{}", project.title);
//! }
//! session.logout();
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod autosave;
pub mod board;
pub mod config;
pub mod error;
pub mod session;

pub use autosave::{share, spawn_autosave, SharedSession};
pub use board::{Board, BoardFilter, Column};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use session::Session;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
