//! Shared integration test helpers for note-session.
//!
//! Provides a scriptable note store, a fake UI host that records every
//! widget operation, and a `Harness` bundling both with a coordinator.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::Harness;
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use async_trait::async_trait;
use note_session::{
    Account, AccountState, Coordinator, CoordinatorEvent, FindOptions, GeometryBlob,
    InMemoryNoteStore, MemoryStateStore, Note, NoteId, NoteStore, Preferences, StateStore,
    StoreError, UiHost, WidgetHandle,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Note store
// ============================================================================

#[derive(Debug, Default)]
struct StoreBehaviour {
    put_delay: Option<Duration>,
    find_delay: Option<Duration>,
    expunge_delay: Option<Duration>,
    fail_put: bool,
    fail_expunge: bool,
    puts: Vec<NoteId>,
    finds: Vec<NoteId>,
    expunges: Vec<NoteId>,
}

/// In-memory store with injectable latency and failures that records calls.
#[derive(Debug, Default)]
pub struct FakeNoteStore {
    notes: InMemoryNoteStore,
    behaviour: Mutex<StoreBehaviour>,
}

impl FakeNoteStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Seed a note with the given id and title directly into the store.
    pub fn seed(&self, id: &str, title: &str) {
        let mut note = Note::new_empty(&Account::local("seed"), "notebook", "tests");
        note.id = NoteId::from(id);
        note.guid = Some(format!("guid-{id}"));
        note.title = Some(title.to_string());
        self.notes.insert(note);
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes.get(&NoteId::from(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn set_put_delay(&self, delay: Duration) {
        self.behaviour.lock().put_delay = Some(delay);
    }

    pub fn set_find_delay(&self, delay: Duration) {
        self.behaviour.lock().find_delay = Some(delay);
    }

    pub fn set_expunge_delay(&self, delay: Duration) {
        self.behaviour.lock().expunge_delay = Some(delay);
    }

    pub fn fail_puts(&self, fail: bool) {
        self.behaviour.lock().fail_put = fail;
    }

    pub fn fail_expunges(&self, fail: bool) {
        self.behaviour.lock().fail_expunge = fail;
    }

    pub fn put_calls(&self) -> Vec<NoteId> {
        self.behaviour.lock().puts.clone()
    }

    pub fn find_calls(&self) -> Vec<NoteId> {
        self.behaviour.lock().finds.clone()
    }

    pub fn expunge_calls(&self) -> Vec<NoteId> {
        self.behaviour.lock().expunges.clone()
    }
}

#[async_trait]
impl NoteStore for FakeNoteStore {
    async fn put(&self, note: Note) -> Result<NoteId, StoreError> {
        let (delay, fail) = {
            let mut b = self.behaviour.lock();
            b.puts.push(note.id.clone());
            (b.put_delay, b.fail_put)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(StoreError::Rejected("put refused by test".to_string()));
        }
        self.notes.put(note).await
    }

    async fn find_by_id(
        &self,
        id: &NoteId,
        options: FindOptions,
    ) -> Result<Option<Note>, StoreError> {
        let delay = {
            let mut b = self.behaviour.lock();
            b.finds.push(id.clone());
            b.find_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.notes.find_by_id(id, options).await
    }

    async fn find_by_guid(
        &self,
        guid: &str,
        options: FindOptions,
    ) -> Result<Option<Note>, StoreError> {
        self.notes.find_by_guid(guid, options).await
    }

    async fn expunge_by_id(&self, id: &NoteId) -> Result<(), StoreError> {
        let (delay, fail) = {
            let mut b = self.behaviour.lock();
            b.expunges.push(id.clone());
            (b.expunge_delay, b.fail_expunge)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(StoreError::Rejected("expunge refused by test".to_string()));
        }
        self.notes.expunge_by_id(id).await
    }
}

// ============================================================================
// UI host
// ============================================================================

#[derive(Debug, Clone)]
struct FakeWidget {
    generation: u32,
    alive: bool,
    editor: bool,
    note: Option<NoteId>,
    title: String,
}

#[derive(Debug, Default)]
struct HostState {
    widgets: Vec<FakeWidget>,
    tabs: Vec<WidgetHandle>,
    windows: Vec<WidgetHandle>,
    current_tab: Option<WidgetHandle>,
    filters: HashSet<WidgetHandle>,
    geometry: HashMap<WidgetHandle, GeometryBlob>,
    restored_geometry: Vec<(WidgetHandle, GeometryBlob)>,
    raised: Vec<WidgetHandle>,
    destroyed: Vec<WidgetHandle>,
}

impl HostState {
    fn widget(&self, handle: WidgetHandle) -> Option<&FakeWidget> {
        self.widgets
            .get(handle.index as usize)
            .filter(|w| w.generation == handle.generation)
    }

    fn widget_mut(&mut self, handle: WidgetHandle) -> Option<&mut FakeWidget> {
        self.widgets
            .get_mut(handle.index as usize)
            .filter(|w| w.generation == handle.generation)
    }

    fn new_widget(&mut self, note: Option<&NoteId>, editor: bool) -> WidgetHandle {
        let index = self.widgets.len() as u32;
        self.widgets.push(FakeWidget {
            generation: 0,
            alive: true,
            editor,
            note: note.cloned(),
            title: String::new(),
        });
        WidgetHandle::new(index, 0)
    }
}

/// Cloneable handle onto a recording UI host; clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> Vec<WidgetHandle> {
        self.state.lock().tabs.clone()
    }

    pub fn windows(&self) -> Vec<WidgetHandle> {
        self.state.lock().windows.clone()
    }

    pub fn current_tab(&self) -> Option<WidgetHandle> {
        self.state.lock().current_tab
    }

    pub fn note_of(&self, widget: WidgetHandle) -> Option<NoteId> {
        self.state.lock().widget(widget).and_then(|w| w.note.clone())
    }

    pub fn title_of(&self, widget: WidgetHandle) -> String {
        self.state
            .lock()
            .widget(widget)
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    /// Notes shown in the host's tab bar, blank tabs excluded.
    pub fn tab_notes(&self) -> Vec<NoteId> {
        let state = self.state.lock();
        state
            .tabs
            .iter()
            .filter_map(|t| state.widget(*t).and_then(|w| w.note.clone()))
            .collect()
    }

    pub fn window_for(&self, note_id: &str) -> Option<WidgetHandle> {
        let state = self.state.lock();
        let id = NoteId::from(note_id);
        state
            .windows
            .iter()
            .copied()
            .find(|w| state.widget(*w).and_then(|w| w.note.as_ref()) == Some(&id))
    }

    pub fn tab_for(&self, note_id: &str) -> Option<WidgetHandle> {
        let state = self.state.lock();
        let id = NoteId::from(note_id);
        state
            .tabs
            .iter()
            .copied()
            .find(|w| state.widget(*w).and_then(|w| w.note.as_ref()) == Some(&id))
    }

    pub fn has_filter(&self, widget: WidgetHandle) -> bool {
        self.state.lock().filters.contains(&widget)
    }

    pub fn filter_count(&self) -> usize {
        self.state.lock().filters.len()
    }

    pub fn was_destroyed(&self, widget: WidgetHandle) -> bool {
        self.state.lock().destroyed.contains(&widget)
    }

    pub fn raised(&self) -> Vec<WidgetHandle> {
        self.state.lock().raised.clone()
    }

    pub fn restored_geometry(&self) -> Vec<(WidgetHandle, GeometryBlob)> {
        self.state.lock().restored_geometry.clone()
    }

    /// Geometry the host reports for `widget` from now on.
    pub fn set_geometry(&self, widget: WidgetHandle, bytes: &[u8]) {
        self.state
            .lock()
            .geometry
            .insert(widget, GeometryBlob::new(bytes.to_vec()));
    }

    /// Destroy a widget without telling the coordinator.
    pub fn kill(&self, widget: WidgetHandle) {
        let mut state = self.state.lock();
        if let Some(w) = state.widget_mut(widget) {
            w.alive = false;
        }
        state.tabs.retain(|t| *t != widget);
        state.windows.retain(|t| *t != widget);
    }

    /// A live widget that is not a note editor.
    pub fn foreign_widget(&self) -> WidgetHandle {
        self.state.lock().new_widget(None, false)
    }
}

impl UiHost for FakeHost {
    fn create_editor(&mut self, note_id: Option<&NoteId>) -> WidgetHandle {
        self.state.lock().new_widget(note_id, true)
    }

    fn bind_editor(&mut self, widget: WidgetHandle, note_id: Option<&NoteId>) {
        if let Some(w) = self.state.lock().widget_mut(widget) {
            w.note = note_id.cloned();
        }
    }

    fn is_alive(&self, widget: WidgetHandle) -> bool {
        self.state.lock().widget(widget).is_some_and(|w| w.alive)
    }

    fn is_editor(&self, widget: WidgetHandle) -> bool {
        self.state.lock().widget(widget).is_some_and(|w| w.editor)
    }

    fn destroy_widget(&mut self, widget: WidgetHandle) {
        let mut state = self.state.lock();
        if let Some(w) = state.widget_mut(widget) {
            w.alive = false;
        }
        state.destroyed.push(widget);
    }

    fn insert_tab(&mut self, widget: WidgetHandle, title: &str) {
        let mut state = self.state.lock();
        state.tabs.push(widget);
        if let Some(w) = state.widget_mut(widget) {
            w.title = title.to_string();
        }
    }

    fn remove_tab(&mut self, widget: WidgetHandle) {
        let mut state = self.state.lock();
        state.tabs.retain(|t| *t != widget);
        if state.current_tab == Some(widget) {
            state.current_tab = None;
        }
    }

    fn set_current_tab(&mut self, widget: WidgetHandle) {
        self.state.lock().current_tab = Some(widget);
    }

    fn show_window(&mut self, widget: WidgetHandle, title: &str) {
        let mut state = self.state.lock();
        state.windows.push(widget);
        if let Some(w) = state.widget_mut(widget) {
            w.title = title.to_string();
        }
    }

    fn detach_window(&mut self, widget: WidgetHandle) {
        self.state.lock().windows.retain(|w| *w != widget);
    }

    fn raise_window(&mut self, widget: WidgetHandle) {
        self.state.lock().raised.push(widget);
    }

    fn set_title(&mut self, widget: WidgetHandle, title: &str) {
        if let Some(w) = self.state.lock().widget_mut(widget) {
            w.title = title.to_string();
        }
    }

    fn install_event_filter(&mut self, widget: WidgetHandle) {
        self.state.lock().filters.insert(widget);
    }

    fn remove_event_filter(&mut self, widget: WidgetHandle) {
        self.state.lock().filters.remove(&widget);
    }

    fn window_geometry(&self, widget: WidgetHandle) -> Option<GeometryBlob> {
        self.state.lock().geometry.get(&widget).cloned()
    }

    fn restore_window_geometry(&mut self, widget: WidgetHandle, blob: &GeometryBlob) -> bool {
        let mut state = self.state.lock();
        state.restored_geometry.push((widget, blob.clone()));
        !blob.is_empty()
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A coordinator wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub coordinator: Coordinator,
    pub host: FakeHost,
    pub store: Arc<FakeNoteStore>,
    pub state: Arc<MemoryStateStore>,
    pub account: Account,
    pub events: mpsc::UnboundedReceiver<CoordinatorEvent>,
}

impl Harness {
    /// A coordinator for a local account with default preferences.
    pub fn new() -> Self {
        Self::build(Account::local("local-user"), Preferences::default(), None)
    }

    pub fn with_prefs(prefs: Preferences) -> Self {
        Self::build(Account::local("local-user"), prefs, None)
    }

    /// A coordinator whose account already has `state` persisted.
    pub fn with_persisted(prefs: Preferences, state: AccountState) -> Self {
        Self::build(Account::local("local-user"), prefs, Some(state))
    }

    fn build(account: Account, prefs: Preferences, state: Option<AccountState>) -> Self {
        let store = FakeNoteStore::new();
        let state_store = Arc::new(MemoryStateStore::new());
        state_store
            .save_preferences(&account, &prefs)
            .expect("seed preferences");
        if let Some(state) = state {
            state_store.save_state(&account, &state).expect("seed state");
        }

        let host = FakeHost::new();
        let mut coordinator = Coordinator::new(
            account.clone(),
            store.clone(),
            state_store.clone(),
            Box::new(host.clone()),
        );
        let events = coordinator.subscribe();

        Self {
            coordinator,
            host,
            store,
            state: state_store,
            account,
            events,
        }
    }

    /// Seed notes `ids` (titled "Note <id>") into the store.
    pub fn seed(&self, ids: &[&str]) {
        for id in ids {
            self.store.seed(id, &format!("Note {id}"));
        }
    }

    /// Open each note in a tab and wait for every load to finish.
    pub async fn open_tabs(&mut self, ids: &[&str]) {
        for id in ids {
            self.coordinator
                .open(NoteId::from(*id), note_session::OpenIn::Tab, false)
                .await
                .expect("open tab");
        }
        self.coordinator.settle().await;
    }

    pub fn persisted(&self) -> AccountState {
        self.state.snapshot(&self.account)
    }

    /// Every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<CoordinatorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn ids(values: &[&str]) -> Vec<NoteId> {
    values.iter().map(|v| NoteId::from(*v)).collect()
}

/// Preferences with a specific tab limit, everything else default.
pub fn prefs_with_max_tabs(max_tabs: usize) -> Preferences {
    Preferences {
        max_tabs,
        ..Preferences::default()
    }
}
