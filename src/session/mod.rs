//! Editor sessions: one per open note.
//!
//! A session owns the in-memory copy of its note, the modified flags, and a
//! small lifecycle state machine:
//!
//! ```text
//! Empty -> Loading -> Resolved <-> Modified <-> Saving
//!                         \___________\___________\____> Closing
//! ```
//!
//! Sessions are owned by exactly one slot and dropped when that slot is
//! released. Relocating a note between a tab and a window moves the session
//! value; it is never cloned.

pub mod deadline;

use crate::note::Note;
use note_session_config::NoteId;
use std::fmt;

/// Process-unique identity of a session, stable across relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionSerial(pub u64);

impl fmt::Display for SessionSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Resolved,
    Modified,
    Saving,
    Closing,
}

/// What closing a session requires before its slot can be released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePlan {
    /// Unsaved edits: flush to the store first.
    Save,
    /// Untouched new note with cleanup enabled: delete it from the store.
    Expunge,
    Release,
}

#[derive(Debug)]
pub struct Session {
    serial: SessionSerial,
    note_id: NoteId,
    is_new_note: bool,
    state: SessionState,
    modified: bool,
    ever_modified: bool,
    title_or_preview: String,
    note: Option<Note>,
    /// Bumped by every edit; lets a save completion tell whether newer edits
    /// arrived while it was in flight.
    edit_generation: u64,
}

impl Session {
    pub fn new(serial: SessionSerial, note_id: NoteId, is_new_note: bool) -> Self {
        Self {
            serial,
            note_id,
            is_new_note,
            state: SessionState::Empty,
            modified: false,
            ever_modified: false,
            title_or_preview: String::new(),
            note: None,
            edit_generation: 0,
        }
    }

    pub fn serial(&self) -> SessionSerial {
        self.serial
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note_id
    }

    pub fn is_new_note(&self) -> bool {
        self.is_new_note
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn ever_modified(&self) -> bool {
        self.ever_modified
    }

    pub fn title_or_preview(&self) -> &str {
        &self.title_or_preview
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.note.is_some()
    }

    pub fn begin_loading(&mut self) {
        if self.state == SessionState::Empty {
            self.state = SessionState::Loading;
        }
    }

    /// Install the note loaded from the store.
    ///
    /// Returns `true` if the displayed title changed. Ignored once the
    /// session is closing.
    pub fn resolve(&mut self, note: Note) -> bool {
        if self.state == SessionState::Closing {
            log::debug!("Ignoring late load of note {} into closing session", self.note_id);
            return false;
        }

        let title = note.title_or_preview();
        let changed = title != self.title_or_preview;
        self.title_or_preview = title;
        self.note = Some(note);
        if matches!(self.state, SessionState::Empty | SessionState::Loading) {
            self.state = SessionState::Resolved;
        }
        changed
    }

    /// Apply an edit from the editing surface.
    ///
    /// Returns `Some(changed_title)` if accepted, `None` when the session has
    /// no note loaded yet or is closing.
    pub fn apply_edit(&mut self, title: Option<String>, content: Option<String>) -> Option<bool> {
        if self.state == SessionState::Closing {
            return None;
        }
        let note = self.note.as_mut()?;

        if let Some(title) = title {
            note.title = Some(title);
        }
        if let Some(content) = content {
            note.content = Some(content);
        }
        note.touch();

        self.modified = true;
        self.ever_modified = true;
        self.edit_generation += 1;
        if self.state != SessionState::Saving {
            self.state = SessionState::Modified;
        }

        let title = note.title_or_preview();
        let changed = title != self.title_or_preview;
        self.title_or_preview = title;
        Some(changed)
    }

    /// Snapshot the note for a save request.
    ///
    /// Returns the note and the edit generation it reflects, or `None` if
    /// there is nothing to save.
    pub fn begin_saving(&mut self) -> Option<(Note, u64)> {
        if !self.modified || self.state == SessionState::Closing {
            return None;
        }
        let note = self.note.clone()?;
        self.state = SessionState::Saving;
        Some((note, self.edit_generation))
    }

    /// Record the outcome of a save started at `generation`.
    pub fn finish_save(&mut self, generation: u64, succeeded: bool) {
        if succeeded {
            self.is_new_note = false;
            if generation == self.edit_generation {
                self.modified = false;
            }
        }

        if self.state == SessionState::Saving {
            self.state = if self.modified {
                SessionState::Modified
            } else {
                SessionState::Resolved
            };
        }
    }

    /// Decide what closing requires, given the empty-note cleanup preference.
    pub fn close_plan(&self, cleanup_enabled: bool) -> ClosePlan {
        if self.modified {
            ClosePlan::Save
        } else if self.should_expunge(cleanup_enabled) {
            ClosePlan::Expunge
        } else {
            ClosePlan::Release
        }
    }

    /// A new note that was never edited is dropped from the store on close.
    pub fn should_expunge(&self, cleanup_enabled: bool) -> bool {
        cleanup_enabled && self.is_new_note && !self.ever_modified
    }

    pub fn begin_closing(&mut self) {
        self.state = SessionState::Closing;
    }
}
