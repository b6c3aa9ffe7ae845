//! Placing notes in tabs and windows.
//!
//! A note is open in at most one slot. Opening a note that is already open
//! focuses it, or moves its widget and session to the other container when
//! the caller asked for that container explicitly. Moving a slot never
//! closes its session.

use super::Coordinator;
use crate::error::Result;
use crate::events::CoordinatorEvent;
use crate::host::{OpenIn, SlotKind, WidgetHandle};
use crate::note::Note;
use crate::slots::{TabSlot, WindowSlot};
use note_session_config::NoteId;

impl Coordinator {
    /// Open `note_id` in a tab or window.
    ///
    /// `is_new` marks a note created moments ago, which is expunged on close
    /// if it was never edited. A note already open is focused or relocated
    /// instead of opened twice.
    pub async fn open(&mut self, note_id: NoteId, open_in: OpenIn, is_new: bool) -> Result<()> {
        self.prune_dead_slots();

        if let Some(index) = self.tabs.position_of_note(&note_id) {
            if open_in == OpenIn::Window {
                self.move_tab_to_window(index);
            } else if let Some(slot) = self.tabs.get(index) {
                let widget = slot.widget;
                self.set_current_tab(widget);
            }
            return Ok(());
        }

        if let Some(slot) = self.windows.get(&note_id) {
            if open_in == OpenIn::Tab {
                self.move_window_to_tab(&note_id).await;
            } else {
                let widget = slot.widget;
                self.host.raise_window(widget);
            }
            return Ok(());
        }

        match open_in {
            OpenIn::Window => self.open_in_window(note_id, is_new),
            OpenIn::Tab | OpenIn::Any => self.open_in_tab(note_id, is_new).await,
        }
        Ok(())
    }

    /// Create an empty note in `notebook_id` and open it once the store has
    /// accepted it.
    ///
    /// Returns the id the note was created with. The note is stamped with the
    /// configured source application and marked local-only for a local
    /// account.
    pub fn create_new(&mut self, notebook_id: &str, open_in: OpenIn) -> NoteId {
        let note = Note::new_empty(
            &self.account,
            notebook_id,
            &self.prefs.source_application,
        );
        let note_id = note.id.clone();
        log::debug!("Creating note {} in notebook {}", note_id, notebook_id);
        self.request_create(note, open_in);
        note_id
    }

    /// Resolve a note link by guid and open the note it points to.
    pub fn open_by_link(&mut self, guid: impl Into<String>, open_in: OpenIn) {
        self.request_link(guid.into(), open_in);
    }

    /// Focus the tab holding `note_id`. Returns `false` if it is not in a tab.
    ///
    /// Focusing a tab does not change its place in the eviction order.
    pub fn focus_tab(&mut self, note_id: &NoteId) -> bool {
        let Some(widget) = self
            .tabs
            .position_of_note(note_id)
            .and_then(|idx| self.tabs.get(idx))
            .map(|slot| slot.widget)
        else {
            return false;
        };
        self.set_current_tab(widget);
        true
    }

    async fn open_in_tab(&mut self, note_id: NoteId, is_new: bool) {
        let session = self.new_session(note_id.clone(), is_new);

        let widget = match self.tabs.blank_index() {
            Some(index) => {
                // The blank tab's widget is reused for the note.
                let Some(slot) = self.tabs.get_mut(index) else {
                    return;
                };
                slot.session = Some(session);
                let widget = slot.widget;
                self.host.bind_editor(widget, Some(&note_id));
                log::debug!("Note {} opened in blank tab {}", note_id, widget);
                widget
            }
            None => {
                let widget = self.host.create_editor(Some(&note_id));
                self.host.insert_tab(widget, "");
                self.tabs.push(TabSlot::with_session(widget, session));
                widget
            }
        };
        self.host.install_event_filter(widget);

        self.request_note(&note_id);
        self.events.emit(CoordinatorEvent::SessionCreated {
            note_id: note_id.clone(),
            kind: SlotKind::Tab,
        });

        // Announce even when the reused blank tab was already current.
        if self.tabs.current() == Some(widget) {
            self.host.set_current_tab(widget);
            self.current_tab_changed();
        } else {
            self.set_current_tab(widget);
        }

        self.tab_sequence.push(note_id);
        self.close_evicted_tabs().await;
        self.persist_open_notes();
    }

    fn open_in_window(&mut self, note_id: NoteId, is_new: bool) {
        let session = self.new_session(note_id.clone(), is_new);
        let widget = self.host.create_editor(Some(&note_id));
        self.host.install_event_filter(widget);
        self.host.show_window(widget, "");
        self.restore_geometry(&note_id, widget);

        self.windows.insert(WindowSlot { widget, session });
        self.request_note(&note_id);
        self.events.emit(CoordinatorEvent::SessionCreated {
            note_id,
            kind: SlotKind::Window,
        });
        self.persist_open_notes();
    }

    /// Move the tab at `index` into its own window, keeping its session.
    fn move_tab_to_window(&mut self, index: usize) {
        if self.tabs.len() == 1 {
            // The tab area never goes empty.
            let blank = self.host.create_editor(None);
            self.host.insert_tab(blank, "");
            self.tabs.push(TabSlot::blank(blank));
        }

        let previous = self.tabs.current();
        let Some(slot) = self.tabs.remove(index) else {
            return;
        };
        let Some(session) = slot.session else {
            return;
        };
        let note_id = session.note_id().clone();
        log::info!("Moving note {} from a tab to a window", note_id);

        self.host.remove_tab(slot.widget);
        self.tab_sequence.remove(&note_id);
        let title = session.title_or_preview().to_string();
        self.host.show_window(slot.widget, &title);
        self.restore_geometry(&note_id, slot.widget);
        self.windows.insert(WindowSlot {
            widget: slot.widget,
            session,
        });

        if let Some(current) = self.tabs.current()
            && previous != Some(current)
        {
            self.host.set_current_tab(current);
            self.current_tab_changed();
        }
        self.persist_open_notes();
    }

    /// Move a window's widget and session into the tab area.
    async fn move_window_to_tab(&mut self, note_id: &NoteId) {
        let Some(slot) = self.windows.remove(note_id) else {
            return;
        };
        log::info!("Moving note {} from a window to a tab", note_id);

        // Pending geometry is discarded; the stored key is kept.
        self.geometry.cancel(note_id);
        self.host.detach_window(slot.widget);

        if let Some(index) = self.tabs.blank_index()
            && let Some(blank) = self.tabs.remove(index)
        {
            self.host.remove_tab(blank.widget);
            self.host.destroy_widget(blank.widget);
        }

        let title = slot.session.title_or_preview().to_string();
        self.host.insert_tab(slot.widget, &title);
        self.tabs
            .push(TabSlot::with_session(slot.widget, slot.session));
        self.set_current_tab(slot.widget);

        self.tab_sequence.push(note_id.clone());
        self.close_evicted_tabs().await;
        self.persist_open_notes();
    }

    fn restore_geometry(&mut self, note_id: &NoteId, widget: WidgetHandle) {
        let Some(blob) = self.persisted.geometry(note_id) else {
            return;
        };
        if !self.host.restore_window_geometry(widget, blob) {
            log::warn!("Could not restore saved geometry for note {}", note_id);
        }
    }
}
