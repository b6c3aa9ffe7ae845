//! Detached editor windows, keyed by note id. No capacity bound.

use crate::host::WidgetHandle;
use crate::session::Session;
use note_session_config::NoteId;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct WindowSlot {
    pub widget: WidgetHandle,
    pub session: Session,
}

#[derive(Debug, Default)]
pub struct WindowSet {
    windows: BTreeMap<NoteId, WindowSlot>,
}

impl WindowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, note_id: &NoteId) -> bool {
        self.windows.contains_key(note_id)
    }

    pub fn get(&self, note_id: &NoteId) -> Option<&WindowSlot> {
        self.windows.get(note_id)
    }

    pub fn get_mut(&mut self, note_id: &NoteId) -> Option<&mut WindowSlot> {
        self.windows.get_mut(note_id)
    }

    pub fn insert(&mut self, slot: WindowSlot) {
        let id = slot.session.note_id().clone();
        log::debug!("Window {} added for note {}", slot.widget, id);
        self.windows.insert(id, slot);
    }

    pub fn remove(&mut self, note_id: &NoteId) -> Option<WindowSlot> {
        self.windows.remove(note_id)
    }

    pub fn note_id_of_widget(&self, widget: WidgetHandle) -> Option<&NoteId> {
        self.windows
            .iter()
            .find(|(_, slot)| slot.widget == widget)
            .map(|(id, _)| id)
    }

    pub fn note_ids(&self) -> Vec<NoteId> {
        self.windows.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NoteId, &WindowSlot)> {
        self.windows.iter()
    }

    pub fn drain(&mut self) -> Vec<WindowSlot> {
        std::mem::take(&mut self.windows).into_values().collect()
    }
}
