//! Tests for restoring open notes at startup and tracking the focused tab.
//!
//! ## Key behaviors:
//! - Recorded tabs reopen in order, then recorded windows
//! - Replaying opens does not overwrite the last focused tab record
//! - The last focused tab becomes current again if it was reopened
//! - `clear` leaves the persisted lists intact for the next start
//! - State survives a round trip through the YAML state store

mod common;

use common::{FakeHost, FakeNoteStore, Harness, ids, prefs_with_max_tabs};
use note_session::{
    Account, AccountState, Coordinator, CoordinatorEvent, NoteId, Preferences, YamlStateStore,
};
use std::sync::Arc;
use tempfile::TempDir;

fn recorded(tabs: &[&str], windows: &[&str], last_focused: Option<&str>) -> AccountState {
    let mut state = AccountState::default();
    state.tab_note_ids = ids(tabs);
    state.set_window_note_ids(ids(windows));
    state.last_focused_tab = last_focused.map(NoteId::from);
    state
}

fn current_changes(events: &[CoordinatorEvent]) -> Vec<Option<NoteId>> {
    events
        .iter()
        .filter_map(|e| match e {
            CoordinatorEvent::CurrentNoteChanged(id) => Some(id.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_restore_reopens_tabs_then_windows() {
    let mut h = Harness::with_persisted(
        Preferences::default(),
        recorded(&["a", "b", "c"], &["w"], None),
    );
    h.seed(&["a", "b", "c", "w"]);

    h.coordinator.restore().await;
    h.coordinator.settle().await;

    assert_eq!(h.coordinator.tab_note_ids(), ids(&["a", "b", "c"]));
    assert_eq!(h.host.tab_notes(), ids(&["a", "b", "c"]));
    assert_eq!(h.coordinator.window_note_ids(), ids(&["w"]));
    assert!(
        h.coordinator
            .session(&NoteId::from("b"))
            .unwrap()
            .is_resolved()
    );
}

#[tokio::test]
async fn test_restore_reselects_last_focused_tab() {
    let mut h = Harness::with_persisted(
        Preferences::default(),
        recorded(&["a", "b", "c"], &[], Some("b")),
    );
    h.seed(&["a", "b", "c"]);

    h.coordinator.restore().await;

    assert_eq!(h.coordinator.current_note_id(), Some(&NoteId::from("b")));
    assert_eq!(h.host.current_tab(), h.host.tab_for("b"));
    assert_eq!(h.persisted().last_focused_tab, Some(NoteId::from("b")));
    assert_eq!(
        current_changes(&h.drain_events()),
        vec![Some(NoteId::from("b"))],
        "Replayed opens are not announced"
    );
}

#[tokio::test]
async fn test_restore_without_record_adopts_current_tab() {
    let mut h = Harness::with_persisted(
        Preferences::default(),
        recorded(&["a", "b"], &[], None),
    );
    h.seed(&["a", "b"]);

    h.coordinator.restore().await;

    assert_eq!(h.coordinator.current_note_id(), Some(&NoteId::from("b")));
    assert_eq!(h.persisted().last_focused_tab, Some(NoteId::from("b")));
}

#[tokio::test]
async fn test_restore_with_stale_record_adopts_current_tab() {
    let mut h = Harness::with_persisted(
        Preferences::default(),
        recorded(&["a", "b"], &[], Some("gone")),
    );
    h.seed(&["a", "b"]);

    h.coordinator.restore().await;

    assert_eq!(h.persisted().last_focused_tab, Some(NoteId::from("b")));
}

#[tokio::test]
async fn test_restore_respects_tab_limit() {
    let mut h = Harness::with_persisted(
        prefs_with_max_tabs(2),
        recorded(&["a", "b", "c"], &[], None),
    );
    h.seed(&["a", "b", "c"]);

    h.coordinator.restore().await;

    assert_eq!(h.coordinator.tab_note_ids(), ids(&["b", "c"]));
    assert_eq!(h.persisted().tab_note_ids, ids(&["b", "c"]));
}

#[tokio::test]
async fn test_restore_drops_notes_missing_from_store() {
    let mut h = Harness::with_persisted(
        Preferences::default(),
        recorded(&["a", "ghost"], &[], None),
    );
    h.seed(&["a"]);

    h.coordinator.restore().await;
    h.coordinator.settle().await;

    assert_eq!(h.coordinator.tab_note_ids(), ids(&["a"]));
    assert_eq!(h.persisted().tab_note_ids, ids(&["a"]));
    assert!(h.drain_events().contains(&CoordinatorEvent::SessionInvalidated {
        note_id: NoteId::from("ghost"),
    }));
}

#[tokio::test]
async fn test_focus_changes_are_recorded() {
    let mut h = Harness::new();
    h.seed(&["a", "b"]);
    h.open_tabs(&["a", "b"]).await;
    assert_eq!(h.persisted().last_focused_tab, Some(NoteId::from("b")));

    let a = h.host.tab_for("a").unwrap();
    h.coordinator.on_tab_activated(a).unwrap();

    assert_eq!(h.persisted().last_focused_tab, Some(NoteId::from("a")));
}

#[tokio::test]
async fn test_focus_tracking_can_be_disabled() {
    let prefs = Preferences {
        track_last_focused_tab: false,
        ..Preferences::default()
    };
    let mut h = Harness::with_prefs(prefs);
    h.seed(&["a"]);
    h.open_tabs(&["a"]).await;

    assert_eq!(h.persisted().last_focused_tab, None);
    assert!(
        current_changes(&h.drain_events()).contains(&Some(NoteId::from("a"))),
        "Current tab is still announced"
    );
}

#[tokio::test]
async fn test_clear_keeps_lists_for_next_start() {
    let mut h = Harness::new();
    h.seed(&["a", "b"]);
    h.open_tabs(&["a", "b"]).await;

    h.coordinator.clear().await;

    assert!(h.coordinator.has_blank_tab());
    assert_eq!(h.coordinator.session_count(), 0);
    assert_eq!(h.persisted().tab_note_ids, ids(&["a", "b"]));

    let host = FakeHost::new();
    let mut next = Coordinator::new(
        h.account.clone(),
        h.store.clone(),
        h.state.clone(),
        Box::new(host.clone()),
    );
    next.restore().await;
    next.settle().await;
    assert_eq!(next.tab_note_ids(), ids(&["a", "b"]));
}

#[tokio::test]
async fn test_state_round_trips_through_yaml_store() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let account = Account::local("yaml-user");
    let store = FakeNoteStore::new();
    store.seed("a", "Note a");
    store.seed("b", "Note b");
    store.seed("w", "Note w");

    {
        let mut first = Coordinator::new(
            account.clone(),
            store.clone(),
            Arc::new(YamlStateStore::new(dir.path())),
            Box::new(FakeHost::new()),
        );
        for id in ["a", "b"] {
            first
                .open(NoteId::from(id), note_session::OpenIn::Tab, false)
                .await
                .unwrap();
        }
        first
            .open(NoteId::from("w"), note_session::OpenIn::Window, false)
            .await
            .unwrap();
        first.settle().await;
    }

    let host = FakeHost::new();
    let mut second = Coordinator::new(
        account,
        store,
        Arc::new(YamlStateStore::new(dir.path())),
        Box::new(host.clone()),
    );
    second.restore().await;
    second.settle().await;

    assert_eq!(second.tab_note_ids(), ids(&["a", "b"]));
    assert_eq!(second.window_note_ids(), ids(&["w"]));
    assert_eq!(second.current_note_id(), Some(&NoteId::from("b")));
    assert_eq!(host.tab_notes(), ids(&["a", "b"]));
}
