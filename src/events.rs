//! Notifications delivered to the UI host.
//!
//! The coordinator is the single dispatcher: every lifecycle change is
//! emitted here, and any number of subscribers receive every event in order.

use crate::host::SlotKind;
use note_session_config::NoteId;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A session was attached to a slot and its note requested from the store.
    SessionCreated { note_id: NoteId, kind: SlotKind },
    /// The note finished loading into its session.
    SessionResolved { note_id: NoteId },
    TitleChanged { note_id: NoteId, title: String },
    /// The note vanished from the store; its session was dropped unsaved.
    SessionInvalidated { note_id: NoteId },
    /// A background (non-close) save failed; edits are still in memory.
    SaveFailed { note_id: NoteId, message: String },
    Error { message: String },
    /// The current tab changed; `None` when the blank tab is current.
    CurrentNoteChanged(Option<NoteId>),
    NoteExpunged { note_id: NoteId },
    NoteExpungeFailed { note_id: NoteId },
}

/// Fan-out of coordinator events to subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<CoordinatorEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CoordinatorEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver to every live subscriber, dropping those whose receiver is gone.
    pub fn emit(&mut self, event: CoordinatorEvent) {
        log::trace!("Emitting {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.emit(CoordinatorEvent::Error {
            message: message.into(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
