//! Dispatch of note store requests and application of their completions.
//!
//! Requests run as spawned tasks. Each carries a child of the coordinator's
//! cancellation token and reports back over the completion channel; the
//! coordinator applies completions on the control thread, discarding any
//! whose token was cancelled by `clear` or an account switch.

use super::Coordinator;
use super::close::CloseReason;
use crate::error::CoordinatorError;
use crate::events::CoordinatorEvent;
use crate::geometry::TimerFired;
use crate::host::OpenIn;
use crate::note::Note;
use crate::session::SessionSerial;
use crate::store::{FindOptions, StoreError};
use note_session_config::NoteId;
use std::future::Future;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(crate) enum Completion {
    NoteLoaded {
        note_id: NoteId,
        serial: SessionSerial,
        result: Result<Option<Note>, StoreError>,
    },
    NoteCreated {
        open_in: OpenIn,
        result: Result<NoteId, StoreError>,
    },
    LinkResolved {
        guid: String,
        open_in: OpenIn,
        result: Result<Option<Note>, StoreError>,
    },
    NoteSaved {
        note_id: NoteId,
        serial: SessionSerial,
        generation: u64,
        result: Result<NoteId, StoreError>,
    },
    GeometryTimer(TimerFired),
}

#[derive(Debug)]
pub(crate) struct Envelope {
    token: CancellationToken,
    /// Counted in `in_flight` while outstanding.
    tracked: bool,
    completion: Completion,
}

impl Coordinator {
    /// Apply every completion that has already arrived. Returns how many.
    pub async fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.completion_rx.try_recv() {
            self.apply(envelope).await;
            applied += 1;
        }
        applied
    }

    /// Wait for and apply the next completion.
    pub async fn process_next(&mut self) {
        if let Some(envelope) = self.completion_rx.recv().await {
            self.apply(envelope).await;
        }
    }

    /// Apply completions until no tracked store request is outstanding.
    ///
    /// Geometry timers are not tracked; they are applied only if they
    /// arrive while waiting.
    pub async fn settle(&mut self) {
        self.pump().await;
        while self.in_flight > 0 {
            self.process_next().await;
        }
    }

    /// Spawn `request` under a fresh child token and route its output back
    /// as a tracked completion. Cancellation drops the request silently.
    fn spawn_request<F, T, C>(&mut self, request: F, into_completion: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(T) -> Completion + Send + 'static,
    {
        let token = self.cancel.child_token();
        let tx = self.completion_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let output = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                output = request => output,
            };
            let _ = tx.send(Envelope {
                token,
                tracked: true,
                completion: into_completion(output),
            });
        });
    }

    /// Request the note for a freshly attached session.
    pub(super) fn request_note(&mut self, note_id: &NoteId) {
        let Some(session) = self.session_mut(note_id) else {
            return;
        };
        session.begin_loading();
        let serial = session.serial();

        let store = self.store.clone();
        let id = note_id.clone();
        let note_id = note_id.clone();
        self.spawn_request(
            async move { store.find_by_id(&id, FindOptions::for_editing()).await },
            move |result| Completion::NoteLoaded {
                note_id,
                serial,
                result,
            },
        );
    }

    pub(super) fn request_create(&mut self, note: Note, open_in: OpenIn) {
        let store = self.store.clone();
        self.spawn_request(async move { store.put(note).await }, move |result| {
            Completion::NoteCreated { open_in, result }
        });
    }

    pub(super) fn request_link(&mut self, guid: String, open_in: OpenIn) {
        let store = self.store.clone();
        let query = guid.clone();
        self.spawn_request(
            async move { store.find_by_guid(&query, FindOptions::for_editing()).await },
            move |result| Completion::LinkResolved {
                guid,
                open_in,
                result,
            },
        );
    }

    /// Start a non-blocking save of a modified session.
    pub(super) fn request_save(&mut self, note_id: &NoteId) {
        let Some(session) = self.session_mut(note_id) else {
            return;
        };
        let serial = session.serial();
        let Some((note, generation)) = session.begin_saving() else {
            return;
        };
        log::debug!("Saving note {} in the background", note_id);

        let store = self.store.clone();
        let note_id = note_id.clone();
        self.spawn_request(async move { store.put(note).await }, move |result| {
            Completion::NoteSaved {
                note_id,
                serial,
                generation,
                result,
            }
        });
    }

    /// Start (or coalesce into) the debounce timer for a window's geometry.
    pub(super) fn schedule_geometry_write(&mut self, note_id: &NoteId) {
        let token = self.cancel.child_token();
        let tx = self.completion_tx.clone();
        self.geometry.schedule(note_id, move |fired| {
            let _ = tx.send(Envelope {
                token,
                tracked: false,
                completion: Completion::GeometryTimer(fired),
            });
        });
    }

    async fn apply(&mut self, envelope: Envelope) {
        if envelope.token.is_cancelled() {
            log::debug!("Discarding cancelled completion {:?}", envelope.completion);
            return;
        }
        if envelope.tracked {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        match envelope.completion {
            Completion::NoteLoaded {
                note_id,
                serial,
                result,
            } => self.on_note_loaded(note_id, serial, result),
            Completion::NoteCreated { open_in, result } => match result {
                Ok(note_id) => {
                    log::info!("Created note {}", note_id);
                    if let Err(e) = self.open(note_id, open_in, true).await {
                        self.report(e);
                    }
                }
                Err(source) => self.report(CoordinatorError::StoreFailure {
                    operation: "create note",
                    source,
                }),
            },
            Completion::LinkResolved {
                guid,
                open_in,
                result,
            } => match result {
                Ok(Some(note)) => {
                    if let Err(e) = self.open(note.id, open_in, false).await {
                        self.report(e);
                    }
                }
                Ok(None) => {
                    log::warn!("No note matches link {}", guid);
                    self.report(CoordinatorError::StoreFailure {
                        operation: "open note link",
                        source: StoreError::NotFound(NoteId::new(guid)),
                    });
                }
                Err(source) => self.report(CoordinatorError::StoreFailure {
                    operation: "open note link",
                    source,
                }),
            },
            Completion::NoteSaved {
                note_id,
                serial,
                generation,
                result,
            } => self.on_note_saved(note_id, serial, generation, result),
            Completion::GeometryTimer(fired) => {
                if self.geometry.fire(&fired) {
                    self.write_geometry(&fired.note_id);
                }
            }
        }
    }

    fn on_note_loaded(
        &mut self,
        note_id: NoteId,
        serial: SessionSerial,
        result: Result<Option<Note>, StoreError>,
    ) {
        let current_serial = self.session(&note_id).map(|s| s.serial());
        if current_serial != Some(serial) {
            log::debug!("Load of note {} arrived for a session that is gone", note_id);
            return;
        }

        match result {
            Ok(Some(note)) => {
                let Some(session) = self.session_mut(&note_id) else {
                    return;
                };
                let title_changed = session.resolve(note);
                let title = session.title_or_preview().to_string();

                self.events.emit(CoordinatorEvent::SessionResolved {
                    note_id: note_id.clone(),
                });
                if title_changed {
                    if let Some(widget) = self.widget_of(&note_id) {
                        self.host.set_title(widget, &title);
                    }
                    self.events
                        .emit(CoordinatorEvent::TitleChanged { note_id, title });
                }
            }
            Ok(None) => {
                log::warn!("Note {} no longer exists, dropping its session", note_id);
                self.discard(&note_id, CloseReason::Invalidated);
                self.events
                    .emit(CoordinatorEvent::SessionInvalidated { note_id: note_id.clone() });
                self.report(CoordinatorError::NotFound(note_id));
            }
            Err(source) => {
                log::error!("Failed to load note {}: {}", note_id, source);
                self.discard(&note_id, CloseReason::Invalidated);
                self.report(CoordinatorError::StoreFailure {
                    operation: "load note",
                    source,
                });
            }
        }
    }

    fn on_note_saved(
        &mut self,
        note_id: NoteId,
        serial: SessionSerial,
        generation: u64,
        result: Result<NoteId, StoreError>,
    ) {
        let Some(session) = self.session_mut(&note_id) else {
            return;
        };
        if session.serial() != serial {
            return;
        }

        let succeeded = result.is_ok();
        session.finish_save(generation, succeeded);

        if let Err(e) = result {
            log::error!("Background save of note {} failed: {}", note_id, e);
            self.events.emit(CoordinatorEvent::SaveFailed {
                note_id,
                message: e.to_string(),
            });
        }
    }

    /// Log an error and surface it to subscribers.
    pub(super) fn report(&mut self, error: CoordinatorError) {
        log::error!("{}", error);
        self.events.error(error.to_string());
    }
}
