//! Integration tests for the watcher and presenter working together.
//!
//! A shared in-memory clipboard stands in for the system clipboard so the
//! watcher can observe what the presenter writes back.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cliptext::clipboard::{ClipboardError, ClipboardIo};
use cliptext::menu::{LimitChoice, MenuAction};
use cliptext::presenter::{Presenter, Response};
use cliptext::store::Storage;
use cliptext::types::HistoryEvent;
use cliptext::watcher::{ClipboardWatcher, TickOutcome};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Clipboard shared between the watcher and the presenter.
#[derive(Clone, Default)]
struct SharedClipboard {
    text: Arc<Mutex<String>>,
}

impl SharedClipboard {
    fn copy(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }
}

impl ClipboardIo for SharedClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Ok(self.text.lock().unwrap().clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.copy(text);
        Ok(())
    }
}

struct Harness {
    _dir: TempDir,
    storage: Storage,
    clipboard: SharedClipboard,
    watcher: ClipboardWatcher<SharedClipboard>,
    presenter: Presenter<SharedClipboard>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = Storage::open(&dir.path().join("history.redb")).expect("open database");
    let clipboard = SharedClipboard::default();
    let watcher = ClipboardWatcher::new(
        clipboard.clone(),
        storage.history(),
        Duration::from_millis(500),
    );
    let presenter = Presenter::new(storage.history(), storage.preferences(), clipboard.clone());

    Harness {
        _dir: dir,
        storage,
        clipboard,
        watcher,
        presenter,
    }
}

async fn menu_indices(presenter: &Presenter<SharedClipboard>) -> Vec<u64> {
    presenter
        .menu()
        .await
        .expect("menu should load")
        .items
        .iter()
        .map(|item| item.display_index)
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn copies_show_up_in_the_menu_newest_first() {
    let mut h = harness();

    for text in ["alpha", "beta", "gamma"] {
        h.clipboard.copy(text);
        h.watcher.tick().await;
    }

    let menu = h.presenter.menu().await.unwrap();
    let labels: Vec<_> = menu.items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["gamma", "beta", "alpha"]);
    assert_eq!(menu_indices(&h.presenter).await, vec![3, 2, 1]);
}

#[tokio::test]
async fn restoring_an_entry_moves_it_to_the_top_with_the_same_index() {
    let mut h = harness();
    for text in ["alpha", "beta", "gamma"] {
        h.clipboard.copy(text);
        h.watcher.tick().await;
    }

    let response = h.presenter.apply(MenuAction::Restore(1)).await;
    assert!(matches!(response, Response::Restored(ref entry) if entry.text == "alpha"));

    // The write is picked up as an ordinary clipboard change.
    match h.watcher.tick().await {
        TickOutcome::Recorded(outcome) => {
            assert!(!outcome.is_inserted());
            assert_eq!(outcome.entry().sequence_index, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(menu_indices(&h.presenter).await, vec![1, 3, 2]);
    assert_eq!(h.storage.history().len().unwrap(), 3);
}

#[tokio::test]
async fn restore_after_clear_is_ignored() {
    let mut h = harness();
    h.clipboard.copy("soon gone");
    h.watcher.tick().await;

    assert_eq!(h.presenter.apply(MenuAction::Clear).await, Response::Updated);
    assert_eq!(h.presenter.apply(MenuAction::Restore(1)).await, Response::Nothing);

    h.clipboard.copy("after clear");
    h.watcher.tick().await;
    assert_eq!(menu_indices(&h.presenter).await, vec![2]);
}

#[tokio::test]
async fn limit_choice_bounds_the_menu() {
    let mut h = harness();
    for i in 0..35 {
        h.clipboard.copy(&format!("clip {i}"));
        h.watcher.tick().await;
    }

    assert_eq!(menu_indices(&h.presenter).await.len(), 10);

    h.presenter.apply(MenuAction::SetLimit(LimitChoice::Thirty)).await;
    assert_eq!(menu_indices(&h.presenter).await.len(), 30);

    h.presenter.apply(MenuAction::SetLimit(LimitChoice::Unlimited)).await;
    assert_eq!(menu_indices(&h.presenter).await.len(), 35);
}

#[tokio::test]
async fn watcher_changes_reach_subscribers() {
    let mut h = harness();
    let mut rx = h.storage.subscribe();

    h.clipboard.copy("notify me");
    h.watcher.tick().await;

    match rx.recv().await.unwrap() {
        HistoryEvent::Upserted(outcome) => assert_eq!(outcome.entry().text, "notify me"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn empty_clipboard_is_recorded_but_not_listed() {
    let mut h = harness();
    h.clipboard.copy("text");
    h.watcher.tick().await;
    h.clipboard.copy("");
    h.watcher.tick().await;

    assert_eq!(h.storage.history().len().unwrap(), 2);
    assert_eq!(menu_indices(&h.presenter).await, vec![1]);
}
