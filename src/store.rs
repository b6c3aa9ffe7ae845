//! The note store seam.
//!
//! The coordinator never persists note content itself. It talks to a
//! `NoteStore` whose calls are all asynchronous and may fail with a
//! `StoreError`. `InMemoryNoteStore` is a complete implementation backed by
//! a map, for hosts that keep notes in memory and for tests.

use crate::note::Note;
use async_trait::async_trait;
use note_session_config::NoteId;
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by a note store call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store refused the request.
    #[error("note store rejected the request: {0}")]
    Rejected(String),

    /// The referenced note does not exist in the store.
    #[error("note {0} not found in store")]
    NotFound(NoteId),

    /// The store could not be reached.
    #[error("note store unavailable: {0}")]
    Unavailable(String),
}

/// What to materialize along with a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub with_resource_metadata: bool,
    pub with_resource_binary_data: bool,
}

impl FindOptions {
    /// Options used when loading a note into an editor session.
    pub fn for_editing() -> Self {
        Self {
            with_resource_metadata: true,
            with_resource_binary_data: true,
        }
    }
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert or replace a note, returning its id.
    async fn put(&self, note: Note) -> Result<NoteId, StoreError>;

    async fn find_by_id(
        &self,
        id: &NoteId,
        options: FindOptions,
    ) -> Result<Option<Note>, StoreError>;

    async fn find_by_guid(
        &self,
        guid: &str,
        options: FindOptions,
    ) -> Result<Option<Note>, StoreError>;

    /// Permanently delete a note.
    async fn expunge_by_id(&self, id: &NoteId) -> Result<(), StoreError>;
}

/// Map-backed note store.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: Mutex<HashMap<NoteId, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let store = Self::new();
        for note in notes {
            store.insert(note);
        }
        store
    }

    /// Insert or replace a note without going through the async API.
    pub fn insert(&self, note: Note) {
        self.notes.lock().insert(note.id.clone(), note);
    }

    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.notes.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.lock().is_empty()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn put(&self, note: Note) -> Result<NoteId, StoreError> {
        let id = note.id.clone();
        if id.is_empty() {
            return Err(StoreError::Rejected("note id must not be empty".to_string()));
        }
        self.notes.lock().insert(id.clone(), note);
        Ok(id)
    }

    async fn find_by_id(
        &self,
        id: &NoteId,
        _options: FindOptions,
    ) -> Result<Option<Note>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_by_guid(
        &self,
        guid: &str,
        _options: FindOptions,
    ) -> Result<Option<Note>, StoreError> {
        Ok(self
            .notes
            .lock()
            .values()
            .find(|n| n.guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn expunge_by_id(&self, id: &NoteId) -> Result<(), StoreError> {
        match self.notes.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }
}
