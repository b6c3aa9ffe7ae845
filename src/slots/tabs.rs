//! The tab area: editor widgets in visual tab order.
//!
//! There is always at least one tab. When no note is open in a tab, the
//! single remaining tab is the blank placeholder: a slot with a widget but
//! no session. The blank tab is never counted against the tab limit.

use crate::host::WidgetHandle;
use crate::session::Session;
use note_session_config::NoteId;

#[derive(Debug)]
pub struct TabSlot {
    pub widget: WidgetHandle,
    /// `None` for the blank placeholder.
    pub session: Option<Session>,
}

impl TabSlot {
    pub fn blank(widget: WidgetHandle) -> Self {
        Self {
            widget,
            session: None,
        }
    }

    pub fn with_session(widget: WidgetHandle, session: Session) -> Self {
        Self {
            widget,
            session: Some(session),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.session.is_none()
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        self.session.as_ref().map(Session::note_id)
    }
}

#[derive(Debug, Default)]
pub struct TabArea {
    tabs: Vec<TabSlot>,
    current: Option<WidgetHandle>,
}

impl TabArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn slots(&self) -> &[TabSlot] {
        &self.tabs
    }

    /// Number of tabs holding a note.
    pub fn note_count(&self) -> usize {
        self.tabs.iter().filter(|t| !t.is_blank()).count()
    }

    /// Note ids in visual order, blank tab excluded.
    pub fn note_ids(&self) -> Vec<NoteId> {
        self.tabs.iter().filter_map(|t| t.note_id().cloned()).collect()
    }

    pub fn blank_index(&self) -> Option<usize> {
        self.tabs.iter().position(TabSlot::is_blank)
    }

    pub fn position_of_note(&self, note_id: &NoteId) -> Option<usize> {
        self.tabs
            .iter()
            .position(|t| t.note_id() == Some(note_id))
    }

    pub fn position_of_widget(&self, widget: WidgetHandle) -> Option<usize> {
        self.tabs.iter().position(|t| t.widget == widget)
    }

    pub fn get(&self, index: usize) -> Option<&TabSlot> {
        self.tabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TabSlot> {
        self.tabs.get_mut(index)
    }

    pub fn session(&self, note_id: &NoteId) -> Option<&Session> {
        self.tabs
            .iter()
            .find_map(|t| t.session.as_ref().filter(|s| s.note_id() == note_id))
    }

    pub fn session_mut(&mut self, note_id: &NoteId) -> Option<&mut Session> {
        self.tabs
            .iter_mut()
            .find_map(|t| t.session.as_mut().filter(|s| s.note_id() == note_id))
    }

    pub fn push(&mut self, slot: TabSlot) {
        log::debug!(
            "Tab {} added for {:?} (total: {})",
            slot.widget,
            slot.note_id(),
            self.tabs.len() + 1
        );
        self.tabs.push(slot);
    }

    /// Remove the tab at `index`.
    ///
    /// If it was current, the tab now at the same position (or the previous
    /// one at the end) becomes current.
    pub fn remove(&mut self, index: usize) -> Option<TabSlot> {
        if index >= self.tabs.len() {
            return None;
        }
        let slot = self.tabs.remove(index);

        if self.current == Some(slot.widget) {
            self.current = if self.tabs.is_empty() {
                None
            } else {
                let new_idx = index.min(self.tabs.len().saturating_sub(1));
                Some(self.tabs[new_idx].widget)
            };
        }
        Some(slot)
    }

    pub fn current(&self) -> Option<WidgetHandle> {
        self.current
    }

    pub fn current_slot(&self) -> Option<&TabSlot> {
        let widget = self.current?;
        self.tabs.iter().find(|t| t.widget == widget)
    }

    pub fn current_note_id(&self) -> Option<&NoteId> {
        self.current_slot().and_then(TabSlot::note_id)
    }

    /// Make the tab holding `widget` current. Returns `false` if absent.
    pub fn set_current(&mut self, widget: WidgetHandle) -> bool {
        if self.tabs.iter().any(|t| t.widget == widget) {
            self.current = Some(widget);
            true
        } else {
            false
        }
    }

    pub fn drain(&mut self) -> Vec<TabSlot> {
        self.current = None;
        std::mem::take(&mut self.tabs)
    }
}
