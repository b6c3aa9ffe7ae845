//! Tab limit enforcement.
//!
//! Tabs are evicted oldest-placed first. The eviction order is the tab
//! sequence, which only changes when a note enters or leaves the tab area;
//! focusing a tab does not refresh it.

use super::Coordinator;
use super::close::CloseReason;
use note_session_config::NoteId;

impl Coordinator {
    /// Change the tab limit (at least 1) and persist it.
    ///
    /// Raising the limit closes nothing. Lowering it below the current number
    /// of tabs closes the oldest ones until the tabs fit.
    pub async fn set_max_tabs(&mut self, max_tabs: usize) {
        let max_tabs = max_tabs.max(1);
        if max_tabs == self.tab_sequence.capacity() {
            return;
        }
        log::info!(
            "Tab limit changed from {} to {}",
            self.tab_sequence.capacity(),
            max_tabs
        );

        self.prefs.max_tabs = max_tabs;
        self.save_preferences();

        let evicted = self.tab_sequence.set_capacity(max_tabs);
        if !evicted.is_empty() {
            self.close_evicted_tabs().await;
            self.persist_open_notes();
        }
    }

    /// Close every tab whose note is no longer in the tab sequence.
    pub(super) async fn close_evicted_tabs(&mut self) {
        let evicted: Vec<NoteId> = self
            .tabs
            .note_ids()
            .into_iter()
            .filter(|id| !self.tab_sequence.contains(id))
            .collect();

        for note_id in evicted {
            log::info!("Evicting tab for note {}", note_id);
            self.close_note(&note_id, CloseReason::Eviction).await;
        }
    }
}
