//! Closing sessions.
//!
//! Every path that ends a session funnels through `close_note`: a user
//! closing a tab or window, eviction, account switch and shutdown. The
//! session is saved (if modified) or expunged (if new and never edited)
//! while its slot is still registered, with a bounded wait. Store failures
//! and timeouts are reported but never keep a slot open.

use super::Coordinator;
use crate::error::CoordinatorError;
use crate::events::CoordinatorEvent;
use crate::host::SlotKind;
use crate::session::ClosePlan;
use crate::session::deadline::{DeadlineOutcome, wait_with_deadline};
use crate::slots::TabSlot;
use crate::store::StoreError;
use note_session_config::NoteId;
use std::time::Duration;

/// Why a slot is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The user closed the tab or window.
    UserRequest,
    /// The tab fell out of the tab limit.
    Eviction,
    /// Everything is closing for an account switch.
    AccountSwitch,
    /// Everything is closing because the host is shutting down.
    Shutdown,
    /// The note is gone from the store; nothing is saved.
    Invalidated,
}

impl CloseReason {
    /// Only a window the user closed forgets its saved geometry.
    fn forgets_geometry(self) -> bool {
        self == CloseReason::UserRequest
    }
}

impl Coordinator {
    /// Close the slot holding `note_id`. Closing a note that is not open is
    /// a no-op and returns `false`.
    pub async fn close(&mut self, note_id: &NoteId) -> bool {
        self.prune_dead_slots();
        self.close_note(note_id, CloseReason::UserRequest).await
    }

    /// Close every slot, then cancel all outstanding store requests.
    ///
    /// The persisted open-note lists are left as they were so the same notes
    /// come back on the next restore. Leaves a single blank tab.
    pub async fn clear(&mut self) {
        self.close_all(CloseReason::Shutdown).await;
        self.cancel_requests();
    }

    /// Host teardown. Same as [`clear`](Self::clear).
    pub async fn shutdown(&mut self) {
        log::info!("Shutting down note sessions for {}", self.account.id);
        self.clear().await;
    }

    pub(super) async fn close_all(&mut self, reason: CloseReason) {
        log::info!(
            "Closing {} tab(s) and {} window(s) ({:?})",
            self.tabs.note_count(),
            self.windows.len(),
            reason
        );
        let had_tabs = self.tabs.note_count() > 0;
        self.persist_suspended = true;
        self.tab_tracking = false;

        for note_id in self.windows.note_ids() {
            self.close_note(&note_id, reason).await;
        }
        for note_id in self.tabs.note_ids() {
            self.close_note(&note_id, reason).await;
        }

        self.geometry.cancel_all();
        self.caches.clear();
        self.tab_sequence.clear();
        self.persist_suspended = false;
        self.tab_tracking = true;

        if had_tabs {
            self.events.emit(CoordinatorEvent::CurrentNoteChanged(None));
        }
    }

    /// Abandon every in-flight store request; late completions are dropped.
    pub(super) fn cancel_requests(&mut self) {
        self.cancel.cancel();
        self.cancel = tokio_util::sync::CancellationToken::new();
        self.in_flight = 0;
    }

    pub(super) async fn close_note(&mut self, note_id: &NoteId, reason: CloseReason) -> bool {
        let cleanup = self.prefs.expunge_empty_new_notes;
        let Some(plan) = self.session(note_id).map(|s| s.close_plan(cleanup)) else {
            log::debug!("Close of note {} ignored, not open", note_id);
            return false;
        };
        log::debug!("Closing note {} ({:?}, {:?})", note_id, reason, plan);

        match plan {
            ClosePlan::Save => self.save_before_close(note_id).await,
            ClosePlan::Expunge => self.expunge_before_close(note_id).await,
            ClosePlan::Release => {}
        }

        self.release_slot(note_id, reason);
        true
    }

    /// Drop a session without saving or expunging.
    pub(super) fn discard(&mut self, note_id: &NoteId, reason: CloseReason) -> bool {
        if self.session(note_id).is_none() {
            return false;
        }
        self.release_slot(note_id, reason);
        true
    }

    async fn save_before_close(&mut self, note_id: &NoteId) {
        let Some((note, generation)) = self.session_mut(note_id).and_then(|s| s.begin_saving())
        else {
            return;
        };

        let timeout = self.prefs.save_timeout();
        let store = self.store.clone();
        let outcome = wait_with_deadline(timeout, async move { store.put(note).await }).await;

        let succeeded = outcome.is_completed();
        if let Some(session) = self.session_mut(note_id) {
            session.finish_save(generation, succeeded);
        }

        match outcome {
            DeadlineOutcome::Completed(_) => log::debug!("Saved note {} before close", note_id),
            DeadlineOutcome::Failed(source) => self.report(CoordinatorError::StoreFailure {
                operation: "save note on close",
                source,
            }),
            DeadlineOutcome::TimedOut => {
                log::warn!("Save of note {} did not finish in time, closing anyway", note_id);
                self.report(CoordinatorError::StoreTimeout {
                    operation: "save note on close",
                    timeout_ms: duration_ms(timeout),
                });
            }
        }
    }

    async fn expunge_before_close(&mut self, note_id: &NoteId) {
        let timeout = self.prefs.expunge_timeout();
        let store = self.store.clone();
        let token = self.cancel.child_token();
        let id = note_id.clone();
        let outcome = wait_with_deadline(timeout, async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(StoreError::Unavailable("request cancelled".to_string())),
                result = store.expunge_by_id(&id) => result,
            }
        })
        .await;

        match outcome {
            DeadlineOutcome::Completed(()) => {
                log::info!("Expunged empty new note {}", note_id);
                self.events.emit(CoordinatorEvent::NoteExpunged {
                    note_id: note_id.clone(),
                });
            }
            DeadlineOutcome::Failed(source) => {
                self.events.emit(CoordinatorEvent::NoteExpungeFailed {
                    note_id: note_id.clone(),
                });
                self.report(CoordinatorError::StoreFailure {
                    operation: "expunge empty note",
                    source,
                });
            }
            DeadlineOutcome::TimedOut => {
                log::warn!("Expunge of note {} did not finish in time", note_id);
                self.events.emit(CoordinatorEvent::NoteExpungeFailed {
                    note_id: note_id.clone(),
                });
                self.report(CoordinatorError::StoreTimeout {
                    operation: "expunge empty note",
                    timeout_ms: duration_ms(timeout),
                });
            }
        }
    }

    /// Tear down the slot holding `note_id` and forget its session.
    fn release_slot(&mut self, note_id: &NoteId, reason: CloseReason) {
        if let Some(session) = self.session_mut(note_id) {
            session.begin_closing();
        }
        self.geometry.cancel(note_id);
        self.caches.release(note_id);

        match self.placement_of(note_id) {
            Some(SlotKind::Tab) => self.release_tab(note_id),
            Some(SlotKind::Window) => self.release_window(note_id, reason),
            None => return,
        }
        self.persist_open_notes();
    }

    fn release_tab(&mut self, note_id: &NoteId) {
        let Some(index) = self.tabs.position_of_note(note_id) else {
            return;
        };
        self.tab_sequence.remove(note_id);

        if self.tabs.len() == 1 {
            // The only tab turns into the blank tab.
            let Some(slot) = self.tabs.get_mut(index) else {
                return;
            };
            slot.session = None;
            let widget = slot.widget;
            self.host.remove_event_filter(widget);
            self.host.bind_editor(widget, None);
            self.host.set_title(widget, "");
            self.current_tab_changed();
            return;
        }

        let previous = self.tabs.current();
        let Some(TabSlot { widget, .. }) = self.tabs.remove(index) else {
            return;
        };
        self.host.remove_event_filter(widget);
        self.host.remove_tab(widget);
        self.host.destroy_widget(widget);

        if let Some(current) = self.tabs.current()
            && previous != Some(current)
        {
            self.host.set_current_tab(current);
            self.current_tab_changed();
        }
    }

    fn release_window(&mut self, note_id: &NoteId, reason: CloseReason) {
        let Some(slot) = self.windows.remove(note_id) else {
            return;
        };
        self.host.remove_event_filter(slot.widget);
        self.host.detach_window(slot.widget);
        self.host.destroy_widget(slot.widget);

        if reason.forgets_geometry() && self.persisted.remove_geometry(note_id) {
            log::debug!("Forgot saved geometry for note {}", note_id);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
