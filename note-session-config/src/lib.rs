//! Configuration and persisted state for the note-session coordinator.
//!
//! This crate provides:
//!
//! - Per-account preferences with serde defaults (tab limit, empty-note
//!   cleanup, save/expunge deadlines, geometry debounce delay)
//! - Account-scoped persisted state (open tabs, open windows, last focused
//!   tab, saved window geometry)
//! - The `StateStore` persistence seam with YAML-file and in-memory backends
//! - Shared identifier types used by the coordinator crate

pub mod account_state;
pub mod defaults;
pub mod error;
pub mod preferences;
pub mod storage;
mod types;

pub use account_state::AccountState;
pub use error::ConfigError;
pub use preferences::Preferences;
pub use storage::{MemoryStateStore, StateStore, YamlStateStore};
pub use types::{Account, AccountKind, GeometryBlob, NoteId};
