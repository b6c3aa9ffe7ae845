//! Typed error types for the coordinator.
//!
//! Store failures and timeouts on the close path are logged and reported to
//! the host but never stop a slot from closing. `NotFound` and
//! `WidgetCastFailure` abandon the triggering operation before any state is
//! touched. Nothing here is fatal to the process.

use crate::store::StoreError;
use note_session_config::{ConfigError, NoteId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A note store call was rejected.
    #[error("{operation} failed: {source}")]
    StoreFailure {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A blocking wait on the note store passed its deadline.
    #[error("{operation} timed out after {timeout_ms} ms")]
    StoreTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Internal consistency check: a slot held something other than a
    /// session widget. Signals a programming error.
    #[error("expected a note editor widget: {0}")]
    WidgetCastFailure(String),

    /// No live session or slot holds the note.
    #[error("no open session for note {0}")]
    NotFound(NoteId),

    /// Preferences or persisted state could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
