//! Events the host forwards from its widgets.
//!
//! The host installs an event filter on every editor widget the coordinator
//! hands it and routes close, resize, focus and activation events here.
//! Widgets are identified by handle; a handle the coordinator does not know
//! is either a stale editor (ignored) or not an editor at all (an error).

use super::Coordinator;
use super::close::CloseReason;
use crate::error::{CoordinatorError, Result};
use crate::events::CoordinatorEvent;
use crate::host::WidgetHandle;
use crate::slots::TabSlot;
use note_session_config::NoteId;

impl Coordinator {
    /// The user asked to close the tab holding `widget`.
    pub async fn on_tab_close_requested(&mut self, widget: WidgetHandle) -> Result<()> {
        self.prune_dead_slots();
        let Some(index) = self.tabs.position_of_widget(widget) else {
            return self.unknown_widget(widget);
        };
        let Some(note_id) = self.tabs.get(index).and_then(TabSlot::note_id).cloned() else {
            log::debug!("Close requested on the blank tab, nothing to do");
            return Ok(());
        };
        self.close_note(&note_id, CloseReason::UserRequest).await;
        Ok(())
    }

    /// The user closed the detached window holding `widget`.
    pub async fn on_window_close_requested(&mut self, widget: WidgetHandle) -> Result<()> {
        self.prune_dead_slots();
        let Some(note_id) = self.windows.note_id_of_widget(widget).cloned() else {
            return self.unknown_widget(widget);
        };
        self.close_note(&note_id, CloseReason::UserRequest).await;
        Ok(())
    }

    /// A detached window was moved or resized.
    ///
    /// The geometry is written once, after events stop arriving for the
    /// debounce delay.
    pub fn on_window_resized(&mut self, widget: WidgetHandle) -> Result<()> {
        let Some(note_id) = self.windows.note_id_of_widget(widget).cloned() else {
            return self.unknown_widget(widget);
        };
        self.schedule_geometry_write(&note_id);
        Ok(())
    }

    /// The editor lost keyboard focus; modified content is saved without
    /// blocking.
    pub fn on_focus_lost(&mut self, widget: WidgetHandle) -> Result<()> {
        let note_id = match self.tabs.position_of_widget(widget) {
            Some(index) => self.tabs.get(index).and_then(TabSlot::note_id).cloned(),
            None => match self.windows.note_id_of_widget(widget) {
                Some(id) => Some(id.clone()),
                None => return self.unknown_widget(widget),
            },
        };

        if let Some(note_id) = note_id
            && self.session(&note_id).is_some_and(|s| s.is_modified())
        {
            self.request_save(&note_id);
        }
        Ok(())
    }

    /// The user switched to another tab.
    pub fn on_tab_activated(&mut self, widget: WidgetHandle) -> Result<()> {
        if self.tabs.position_of_widget(widget).is_none() {
            return self.unknown_widget(widget);
        }
        self.set_current_tab(widget);
        Ok(())
    }

    /// The editing surface changed the note's title or content.
    pub fn apply_edit(
        &mut self,
        note_id: &NoteId,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<()> {
        let Some(session) = self.session_mut(note_id) else {
            return Err(CoordinatorError::NotFound(note_id.clone()));
        };
        let Some(title_changed) = session.apply_edit(title, content) else {
            log::debug!("Edit to note {} dropped, session not ready", note_id);
            return Ok(());
        };
        if title_changed {
            let title = session.title_or_preview().to_string();
            if let Some(widget) = self.widget_of(note_id) {
                self.host.set_title(widget, &title);
            }
            self.events.emit(CoordinatorEvent::TitleChanged {
                note_id: note_id.clone(),
                title,
            });
        }
        Ok(())
    }

    /// The note was deleted by another part of the application; its session
    /// is dropped without saving.
    pub fn on_note_deleted_externally(&mut self, note_id: &NoteId) {
        if self.discard(note_id, CloseReason::Invalidated) {
            log::info!("Note {} was deleted, closing its editor", note_id);
            self.events.emit(CoordinatorEvent::SessionInvalidated {
                note_id: note_id.clone(),
            });
        }
    }

    /// Forget slots whose widget the host destroyed behind our back.
    ///
    /// Their sessions are dropped without saving; the widget is gone.
    pub(super) fn prune_dead_slots(&mut self) {
        let dead_tabs: Vec<WidgetHandle> = self
            .tabs
            .slots()
            .iter()
            .map(|slot| slot.widget)
            .filter(|widget| !self.host.is_alive(*widget))
            .collect();
        let dead_windows: Vec<NoteId> = self
            .windows
            .iter()
            .filter(|(_, slot)| !self.host.is_alive(slot.widget))
            .map(|(id, _)| id.clone())
            .collect();

        if dead_tabs.is_empty() && dead_windows.is_empty() {
            return;
        }

        let previous = self.tabs.current();
        for widget in dead_tabs {
            let Some(index) = self.tabs.position_of_widget(widget) else {
                continue;
            };
            let Some(slot) = self.tabs.remove(index) else {
                continue;
            };
            if let Some(note_id) = slot.note_id() {
                log::warn!("Editor widget for tab note {} was destroyed, pruning", note_id);
                self.tab_sequence.remove(note_id);
                self.caches.release(note_id);
            }
        }
        for note_id in &dead_windows {
            log::warn!("Window for note {} was destroyed, pruning", note_id);
            self.geometry.cancel(note_id);
            self.caches.release(note_id);
            self.windows.remove(note_id);
        }

        if self.tabs.is_empty() {
            let blank = self.host.create_editor(None);
            self.host.insert_tab(blank, "");
            self.tabs.push(TabSlot::blank(blank));
        }
        let current = self
            .tabs
            .current()
            .or_else(|| self.tabs.slots().first().map(|slot| slot.widget));
        if let Some(current) = current
            && previous != Some(current)
        {
            self.tabs.set_current(current);
            self.host.set_current_tab(current);
            self.current_tab_changed();
        }
        self.persist_open_notes();
    }

    /// Record the current geometry of the window holding `note_id`.
    pub(super) fn write_geometry(&mut self, note_id: &NoteId) {
        let Some(widget) = self.windows.get(note_id).map(|slot| slot.widget) else {
            return;
        };
        if !self.host.is_alive(widget) {
            return;
        }
        match self.host.window_geometry(widget) {
            Some(blob) => {
                log::debug!("Saving geometry for note {} ({} bytes)", note_id, blob.as_bytes().len());
                self.persisted.set_geometry(note_id.clone(), blob);
                self.write_state();
            }
            None => log::warn!("No geometry available for window of note {}", note_id),
        }
    }

    fn unknown_widget(&mut self, widget: WidgetHandle) -> Result<()> {
        if self.host.is_editor(widget) {
            log::debug!("Event from editor {} that holds no session, ignoring", widget);
            return Ok(());
        }
        let error = CoordinatorError::WidgetCastFailure(format!(
            "widget {widget} is not a note editor"
        ));
        log::error!("{}", error);
        self.events.error(error.to_string());
        Err(error)
    }
}
