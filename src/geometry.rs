//! Debounced persistence of detached-window geometry.
//!
//! A resize starts a one-shot timer for the window's note unless one is
//! already pending, in which case the resize is coalesced into it. When the
//! timer fires the coordinator writes the window's current geometry once.
//! Closing the window cancels the timer without firing.
//!
//! Timers are tokio tasks that report back through a callback; each carries
//! an id so a firing that raced with cancellation is recognised as stale.

use note_session_config::NoteId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Delivered when a debounce timer elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFired {
    pub note_id: NoteId,
    pub timer: TimerId,
}

#[derive(Debug)]
struct PendingTimer {
    id: TimerId,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct GeometryDebouncer {
    delay: Duration,
    pending: HashMap<NoteId, PendingTimer>,
    next_id: u64,
}

impl GeometryDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Applies to timers started after the change.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn is_pending(&self, note_id: &NoteId) -> bool {
        self.pending.contains_key(note_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Start a timer for `note_id` unless one is pending.
    ///
    /// Returns `false` when the event was coalesced into a pending timer.
    pub fn schedule<F>(&mut self, note_id: &NoteId, on_fire: F) -> bool
    where
        F: FnOnce(TimerFired) + Send + 'static,
    {
        if self.pending.contains_key(note_id) {
            log::trace!("Geometry write for {} already pending, coalescing", note_id);
            return false;
        }

        let id = TimerId(self.next_id);
        self.next_id += 1;

        let delay = self.delay;
        let fired = TimerFired {
            note_id: note_id.clone(),
            timer: id,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(fired);
        });

        self.pending
            .insert(note_id.clone(), PendingTimer { id, task });
        true
    }

    /// Consume a firing. Returns `true` if it belongs to the pending timer
    /// for its note (the write should happen), `false` if stale.
    pub fn fire(&mut self, fired: &TimerFired) -> bool {
        match self.pending.get(&fired.note_id) {
            Some(timer) if timer.id == fired.timer => {
                self.pending.remove(&fired.note_id);
                true
            }
            _ => {
                log::trace!("Discarding stale geometry timer for {}", fired.note_id);
                false
            }
        }
    }

    /// Cancel the pending timer for `note_id` without firing it.
    pub fn cancel(&mut self, note_id: &NoteId) -> bool {
        match self.pending.remove(note_id) {
            Some(timer) => {
                timer.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, timer) in self.pending.drain() {
            timer.task.abort();
        }
    }
}

impl Drop for GeometryDebouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
