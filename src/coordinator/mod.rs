//! The note editor session coordinator.
//!
//! Owns every session and slot for the active account and is the only
//! place they are mutated. All methods run on the control thread; note
//! store requests run as tokio tasks whose completions come back through an
//! internal channel and are applied by `pump`/`settle`/`process_next`, so
//! registry mutation is always sequential.
//!
//! Submodules:
//! - `placement`: open/create/relocate
//! - `close`: the close-one-session workflow and close-all
//! - `eviction`: tab limit enforcement
//! - `completions`: store request dispatch and completion handling
//! - `host_events`: close/resize/focus events intercepted from widgets
//! - `account`: startup restore and account switching

mod account;
mod close;
mod completions;
mod eviction;
mod host_events;
mod placement;

use crate::decrypted_cache::{DecryptedTextCache, DecryptedTextCacheRegistry};
use crate::events::{CoordinatorEvent, EventBus};
use crate::geometry::GeometryDebouncer;
use crate::host::{SlotKind, UiHost, WidgetHandle};
use crate::session::{Session, SessionSerial};
use crate::slots::{TabArea, TabSequence, TabSlot, WindowSet};
use crate::store::NoteStore;
use completions::Envelope;
use note_session_config::{Account, AccountState, NoteId, Preferences, StateStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use close::CloseReason;

pub struct Coordinator {
    account: Account,
    store: Arc<dyn NoteStore>,
    state_store: Arc<dyn StateStore>,
    host: Box<dyn UiHost>,
    prefs: Preferences,
    /// In-memory mirror of the account's persisted state.
    persisted: AccountState,
    /// Set while restoring or closing everything, when intermediate states
    /// must not overwrite the persisted open-note lists.
    persist_suspended: bool,
    tabs: TabArea,
    tab_sequence: TabSequence,
    windows: WindowSet,
    caches: DecryptedTextCacheRegistry,
    geometry: GeometryDebouncer,
    events: EventBus,
    completion_tx: mpsc::UnboundedSender<Envelope>,
    completion_rx: mpsc::UnboundedReceiver<Envelope>,
    /// Parent of every in-flight request's token; replaced on `clear`.
    cancel: CancellationToken,
    /// Tracked store requests whose completion has not been applied yet.
    in_flight: usize,
    /// When false, current-tab changes are neither announced nor recorded.
    tab_tracking: bool,
    next_serial: u64,
}

impl Coordinator {
    /// Create a coordinator for `account` with a single blank tab.
    ///
    /// Preferences are read from `state_store`; unreadable preferences fall
    /// back to defaults. Call [`Coordinator::restore`] to reopen the notes
    /// recorded for the account.
    pub fn new(
        account: Account,
        store: Arc<dyn NoteStore>,
        state_store: Arc<dyn StateStore>,
        mut host: Box<dyn UiHost>,
    ) -> Self {
        let prefs = load_preferences(state_store.as_ref(), &account);
        let persisted = load_state(state_store.as_ref(), &account).unwrap_or_default();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let mut tabs = TabArea::new();
        let blank = host.create_editor(None);
        host.insert_tab(blank, "");
        host.set_current_tab(blank);
        tabs.push(TabSlot::blank(blank));
        tabs.set_current(blank);

        log::info!(
            "Session coordinator created for account {} (max tabs: {})",
            account.id,
            prefs.max_tabs
        );

        Self {
            account,
            store,
            state_store,
            host,
            tab_sequence: TabSequence::new(prefs.max_tabs),
            geometry: GeometryDebouncer::new(prefs.geometry_debounce()),
            prefs,
            persisted,
            persist_suspended: false,
            tabs,
            windows: WindowSet::new(),
            caches: DecryptedTextCacheRegistry::new(),
            events: EventBus::new(),
            completion_tx,
            completion_rx,
            cancel: CancellationToken::new(),
            in_flight: 0,
            tab_tracking: true,
            next_serial: 1,
        }
    }

    /// Receive every notification emitted from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CoordinatorEvent> {
        self.events.subscribe()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn max_tabs(&self) -> usize {
        self.tab_sequence.capacity()
    }

    /// Notes in tabs, oldest placement first.
    pub fn tab_note_ids(&self) -> Vec<NoteId> {
        self.tab_sequence.to_vec()
    }

    /// Notes in tabs, in visual order.
    pub fn visible_tab_note_ids(&self) -> Vec<NoteId> {
        self.tabs.note_ids()
    }

    pub fn window_note_ids(&self) -> Vec<NoteId> {
        self.windows.note_ids()
    }

    /// Tab count including the blank tab.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn has_blank_tab(&self) -> bool {
        self.tabs.blank_index().is_some()
    }

    pub fn current_note_id(&self) -> Option<&NoteId> {
        self.tabs.current_note_id()
    }

    pub fn last_focused_tab(&self) -> Option<&NoteId> {
        self.persisted.last_focused_tab.as_ref()
    }

    pub fn placement_of(&self, note_id: &NoteId) -> Option<SlotKind> {
        if self.tabs.position_of_note(note_id).is_some() {
            Some(SlotKind::Tab)
        } else if self.windows.contains(note_id) {
            Some(SlotKind::Window)
        } else {
            None
        }
    }

    pub fn session(&self, note_id: &NoteId) -> Option<&Session> {
        self.tabs
            .session(note_id)
            .or_else(|| self.windows.get(note_id).map(|w| &w.session))
    }

    pub fn session_count(&self) -> usize {
        self.tabs.note_count() + self.windows.len()
    }

    /// Store requests issued but not yet applied.
    pub fn in_flight_requests(&self) -> usize {
        self.in_flight
    }

    pub fn pending_geometry_writes(&self) -> usize {
        self.geometry.pending_count()
    }

    pub fn decrypted_text_cache(&self, note_id: &NoteId) -> Option<&DecryptedTextCache> {
        self.caches.get(note_id)
    }

    /// Cache of decrypted fragments for an open note.
    pub fn decrypted_text_cache_mut(&mut self, note_id: &NoteId) -> Option<&mut DecryptedTextCache> {
        if self.placement_of(note_id).is_none() {
            return None;
        }
        Some(self.caches.get_or_create(note_id))
    }

    pub fn set_expunge_empty_new_notes(&mut self, enabled: bool) {
        self.prefs.expunge_empty_new_notes = enabled;
        self.save_preferences();
    }

    pub fn set_save_timeout_ms(&mut self, timeout_ms: u64) {
        self.prefs.save_timeout_ms = timeout_ms;
        self.save_preferences();
    }

    pub fn set_expunge_timeout_ms(&mut self, timeout_ms: u64) {
        self.prefs.expunge_timeout_ms = timeout_ms;
        self.save_preferences();
    }

    pub fn set_geometry_debounce_ms(&mut self, delay_ms: u64) {
        self.prefs.geometry_debounce_ms = delay_ms;
        self.geometry.set_delay(self.prefs.geometry_debounce());
        self.save_preferences();
    }

    fn new_session(&mut self, note_id: NoteId, is_new_note: bool) -> Session {
        let serial = SessionSerial(self.next_serial);
        self.next_serial += 1;
        Session::new(serial, note_id, is_new_note)
    }

    fn widget_of(&self, note_id: &NoteId) -> Option<WidgetHandle> {
        self.tabs
            .position_of_note(note_id)
            .and_then(|idx| self.tabs.get(idx))
            .map(|slot| slot.widget)
            .or_else(|| self.windows.get(note_id).map(|w| w.widget))
    }

    fn session_mut(&mut self, note_id: &NoteId) -> Option<&mut Session> {
        if let Some(session) = self.tabs.session_mut(note_id) {
            return Some(session);
        }
        self.windows.get_mut(note_id).map(|w| &mut w.session)
    }

    /// Make `widget` the current tab in the host and in the tab area.
    ///
    /// With tab tracking active the change is announced and, if enabled,
    /// recorded as the last focused tab.
    fn set_current_tab(&mut self, widget: WidgetHandle) {
        if !self.tabs.set_current(widget) {
            return;
        }
        self.host.set_current_tab(widget);
        self.current_tab_changed();
    }

    fn current_tab_changed(&mut self) {
        if !self.tab_tracking {
            return;
        }

        let current = self.tabs.current_note_id().cloned();
        self.events
            .emit(CoordinatorEvent::CurrentNoteChanged(current.clone()));

        if self.prefs.track_last_focused_tab
            && let Some(note_id) = current
            && self.persisted.last_focused_tab.as_ref() != Some(&note_id)
        {
            self.persisted.last_focused_tab = Some(note_id);
            self.write_state();
        }
    }

    /// Mirror the open tabs and windows into persisted state and write it.
    fn persist_open_notes(&mut self) {
        if self.persist_suspended {
            return;
        }
        self.persisted.tab_note_ids = self.tab_sequence.to_vec();
        self.persisted.set_window_note_ids(self.windows.note_ids());
        self.write_state();
    }

    fn write_state(&mut self) {
        if self.persist_suspended {
            return;
        }
        if let Err(e) = self.state_store.save_state(&self.account, &self.persisted) {
            log::error!(
                "Failed to persist open notes for account {}: {}",
                self.account.id,
                e
            );
            self.events
                .error(format!("Failed to save open notes: {e}"));
        }
    }

    fn save_preferences(&mut self) {
        if let Err(e) = self.state_store.save_preferences(&self.account, &self.prefs) {
            log::error!("Failed to save preferences: {}", e);
            self.events.error(format!("Failed to save preferences: {e}"));
        }
    }
}

fn load_preferences(state_store: &dyn StateStore, account: &Account) -> Preferences {
    match state_store.load_preferences(account) {
        Ok(prefs) => prefs.normalized(),
        Err(e) => {
            log::warn!(
                "Failed to load preferences for account {}, using defaults: {}",
                account.id,
                e
            );
            Preferences::default()
        }
    }
}

/// Read the account's persisted state, logging a failure.
fn load_state(state_store: &dyn StateStore, account: &Account) -> Option<AccountState> {
    match state_store.load_state(account) {
        Ok(state) => Some(state),
        Err(e) => {
            log::error!("Failed to load open notes for account {}: {}", account.id, e);
            None
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("account", &self.account.id)
            .field("tabs", &self.tab_sequence.to_vec())
            .field("windows", &self.windows.note_ids())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
