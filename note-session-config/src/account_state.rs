//! Account-scoped state persisted between runs.
//!
//! Records which notes were open in tabs (in tab-sequence order), which were
//! open in detached windows, which tab had focus last, and the saved geometry
//! of each detached window. The coordinator rewrites it on every relevant
//! mutation and reads it back on startup and account switch.

use crate::types::{GeometryBlob, NoteId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Notes open in tabs, oldest placement first.
    #[serde(default)]
    pub tab_note_ids: Vec<NoteId>,

    /// Notes open in detached windows. Order carries no meaning; kept sorted.
    #[serde(default)]
    pub window_note_ids: Vec<NoteId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_focused_tab: Option<NoteId>,

    /// Saved geometry of detached windows, keyed by note.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub window_geometry: BTreeMap<NoteId, GeometryBlob>,
}

impl AccountState {
    /// Replace the window list, normalizing it to a sorted set.
    pub fn set_window_note_ids(&mut self, ids: impl IntoIterator<Item = NoteId>) {
        let mut ids: Vec<NoteId> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        self.window_note_ids = ids;
    }

    pub fn geometry(&self, note_id: &NoteId) -> Option<&GeometryBlob> {
        self.window_geometry.get(note_id)
    }

    pub fn set_geometry(&mut self, note_id: NoteId, blob: GeometryBlob) {
        self.window_geometry.insert(note_id, blob);
    }

    pub fn remove_geometry(&mut self, note_id: &NoteId) -> bool {
        self.window_geometry.remove(note_id).is_some()
    }
}
