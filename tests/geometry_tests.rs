//! Tests for detached-window geometry persistence.
//!
//! ## Key behaviors:
//! - A burst of resize events results in exactly one write, after the delay
//! - Closing a window cancels its pending write
//! - Only a window the user closes forgets its saved geometry; relocation,
//!   account switch and shutdown keep it
//! - Saved geometry is applied when the note is next opened in a window

mod common;

use common::Harness;
use note_session::{
    Account, AccountKind, AccountState, GeometryBlob, InMemoryNoteStore, NoteId, OpenIn,
    Preferences,
};
use std::sync::Arc;
use std::time::Duration;

async fn open_window(h: &mut Harness, id: &str) -> note_session::WidgetHandle {
    h.coordinator
        .open(NoteId::from(id), OpenIn::Window, false)
        .await
        .unwrap();
    h.coordinator.settle().await;
    h.host.window_for(id).expect("window shown")
}

fn state_with_geometry(id: &str, bytes: &[u8]) -> AccountState {
    let mut state = AccountState::default();
    state.set_geometry(NoteId::from(id), GeometryBlob::new(bytes.to_vec()));
    state
}

#[tokio::test(start_paused = true)]
async fn test_resize_burst_writes_once_after_delay() {
    let mut h = Harness::new();
    h.seed(&["a"]);
    let window = open_window(&mut h, "a").await;
    h.host.set_geometry(window, &[1, 2, 3]);
    let writes_before = h.state.state_writes();

    for _ in 0..10 {
        h.coordinator.on_window_resized(window).unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    assert_eq!(h.coordinator.pending_geometry_writes(), 1);
    assert_eq!(h.coordinator.pump().await, 0, "Nothing written mid-burst");

    let started = tokio::time::Instant::now();
    h.coordinator.process_next().await;

    assert!(started.elapsed() <= Duration::from_millis(3000));
    assert_eq!(h.state.state_writes(), writes_before + 1);
    assert_eq!(
        h.persisted().geometry(&NoteId::from("a")),
        Some(&GeometryBlob::new(vec![1, 2, 3]))
    );
    assert_eq!(h.coordinator.pending_geometry_writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_closing_window_cancels_pending_write() {
    let mut h = Harness::new();
    h.seed(&["a"]);
    let window = open_window(&mut h, "a").await;
    h.host.set_geometry(window, &[9]);

    h.coordinator.on_window_resized(window).unwrap();
    h.coordinator.on_window_close_requested(window).await.unwrap();
    assert_eq!(h.coordinator.pending_geometry_writes(), 0);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.coordinator.pump().await, 0);
    assert_eq!(h.persisted().geometry(&NoteId::from("a")), None);
}

#[tokio::test]
async fn test_saved_geometry_is_restored_on_open() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[4, 2]));
    h.seed(&["a"]);

    let window = open_window(&mut h, "a").await;

    assert_eq!(
        h.host.restored_geometry(),
        vec![(window, GeometryBlob::new(vec![4, 2]))]
    );
}

#[tokio::test]
async fn test_unusable_geometry_still_opens_window() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[]));
    h.seed(&["a"]);

    open_window(&mut h, "a").await;

    assert_eq!(h.coordinator.window_note_ids(), vec![NoteId::from("a")]);
}

#[tokio::test]
async fn test_user_close_forgets_geometry() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[1]));
    h.seed(&["a"]);
    let window = open_window(&mut h, "a").await;

    h.coordinator.on_window_close_requested(window).await.unwrap();

    assert_eq!(h.persisted().geometry(&NoteId::from("a")), None);
}

#[tokio::test]
async fn test_relocation_keeps_geometry() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[1]));
    h.seed(&["a"]);
    open_window(&mut h, "a").await;

    h.coordinator
        .open(NoteId::from("a"), OpenIn::Tab, false)
        .await
        .unwrap();

    assert_eq!(
        h.persisted().geometry(&NoteId::from("a")),
        Some(&GeometryBlob::new(vec![1]))
    );
}

#[tokio::test]
async fn test_account_switch_keeps_geometry() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[7]));
    h.seed(&["a"]);
    open_window(&mut h, "a").await;

    let other = Account::new("bob", "Bob", AccountKind::Synchronized);
    h.coordinator
        .switch_account(other, Arc::new(InMemoryNoteStore::new()))
        .await;

    assert_eq!(
        h.persisted().geometry(&NoteId::from("a")),
        Some(&GeometryBlob::new(vec![7]))
    );
}

#[tokio::test]
async fn test_shutdown_keeps_geometry() {
    let mut h = Harness::with_persisted(Preferences::default(), state_with_geometry("a", &[3]));
    h.seed(&["a"]);
    open_window(&mut h, "a").await;

    h.coordinator.shutdown().await;

    assert!(h.coordinator.window_note_ids().is_empty());
    assert_eq!(
        h.persisted().geometry(&NoteId::from("a")),
        Some(&GeometryBlob::new(vec![3]))
    );
}
