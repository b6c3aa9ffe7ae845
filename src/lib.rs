// Library exports for the note editor session coordinator.
//
// # Threading
//
// The coordinator and the `UiHost` live on one control thread and every
// coordinator method takes `&mut self`. Note store calls run as tokio tasks;
// their results come back over a channel and are applied by `pump`,
// `process_next` or `settle`. Shared state behind the store and the state
// store uses `parking_lot::Mutex`; no lock is held across an await.

/// Crate version, for hosts that log it at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coordinator;
pub mod decrypted_cache;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod note;
pub mod session;
pub mod slots;
pub mod store;

pub use coordinator::{CloseReason, Coordinator};
pub use decrypted_cache::{DecryptedEntry, DecryptedTextCache, DecryptedTextCacheRegistry};
pub use error::{CoordinatorError, Result};
pub use events::CoordinatorEvent;
pub use host::{OpenIn, SlotKind, UiHost, WidgetHandle};
pub use note::{Note, NoteAttributes};
pub use session::{Session, SessionSerial, SessionState};
pub use store::{FindOptions, InMemoryNoteStore, NoteStore, StoreError};

pub use note_session_config::{
    Account, AccountKind, AccountState, ConfigError, GeometryBlob, MemoryStateStore, NoteId,
    Preferences, StateStore, YamlStateStore,
};
