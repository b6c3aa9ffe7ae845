//! Startup restore and account switching.

use super::close::CloseReason;
use super::{Coordinator, load_preferences, load_state};
use crate::events::CoordinatorEvent;
use crate::host::OpenIn;
use crate::store::NoteStore;
use note_session_config::{Account, AccountState};
use std::sync::Arc;

impl Coordinator {
    /// Reopen the tabs and windows recorded for the active account.
    ///
    /// Tabs are reopened in their recorded order, then windows. The recorded
    /// last focused tab becomes current again if it was reopened; otherwise
    /// whichever tab ended up current is recorded instead.
    pub async fn restore(&mut self) {
        self.persisted = match load_state(self.state_store.as_ref(), &self.account) {
            Some(state) => state,
            None => {
                self.events.error("Failed to load open notes");
                AccountState::default()
            }
        };

        let tab_ids = self.persisted.tab_note_ids.clone();
        let window_ids = self.persisted.window_note_ids.clone();
        let last_focused = self.persisted.last_focused_tab.clone();
        log::info!(
            "Restoring {} tab(s) and {} window(s) for account {}",
            tab_ids.len(),
            window_ids.len(),
            self.account.id
        );

        self.tab_tracking = false;
        self.persist_suspended = true;

        for note_id in tab_ids {
            if let Err(e) = self.open(note_id, OpenIn::Tab, false).await {
                self.report(e);
            }
        }
        for note_id in window_ids {
            if let Err(e) = self.open(note_id, OpenIn::Window, false).await {
                self.report(e);
            }
        }

        self.tab_tracking = true;
        self.persist_suspended = false;

        let last_focused_widget = last_focused
            .as_ref()
            .and_then(|id| self.tabs.position_of_note(id))
            .and_then(|idx| self.tabs.get(idx))
            .map(|slot| slot.widget);
        match last_focused_widget {
            Some(widget) => {
                self.tabs.set_current(widget);
                self.host.set_current_tab(widget);
            }
            None if self.prefs.track_last_focused_tab => {
                self.persisted.last_focused_tab = self.tabs.current_note_id().cloned();
            }
            None => {}
        }
        self.events.emit(CoordinatorEvent::CurrentNoteChanged(
            self.tabs.current_note_id().cloned(),
        ));
        self.persist_open_notes();
    }

    /// Switch to another account and its note store.
    ///
    /// Every open slot is closed against the old store first, outstanding
    /// requests are cancelled, then the new account's preferences and open
    /// notes are restored. Switching to the active account does nothing.
    pub async fn switch_account(&mut self, account: Account, store: Arc<dyn NoteStore>) {
        if account == self.account {
            log::debug!("Already on account {}, not switching", account.id);
            return;
        }
        log::info!("Switching account {} -> {}", self.account.id, account.id);

        self.close_all(CloseReason::AccountSwitch).await;
        self.cancel_requests();
        // Drop completions that raced with the cancellation.
        while self.completion_rx.try_recv().is_ok() {}

        self.account = account;
        self.store = store;
        self.prefs = load_preferences(self.state_store.as_ref(), &self.account);
        self.tab_sequence.set_capacity(self.prefs.max_tabs);
        self.geometry.set_delay(self.prefs.geometry_debounce());

        self.restore().await;
    }
}
