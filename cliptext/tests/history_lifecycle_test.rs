//! Integration tests for the clipboard history lifecycle.
//!
//! These tests drive the public store API against a real database file:
//! deduplication, index assignment, ordering, clearing and persistence
//! across restarts.
//!
//! # Important Notes
//!
//! Tests that open the database through `Config::from_env` modify environment
//! variables and are marked `#[serial]`.

use std::collections::HashSet;
use std::env;
use std::thread;

use cliptext::config::Config;
use cliptext::store::{Storage, StoreError};
use cliptext::types::{HistoryEvent, UpsertOutcome};
use cliptext::utils::fingerprint;
use serial_test::serial;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// RAII guard that saves and restores an environment variable.
struct EnvGuard {
    name: String,
    original: Option<String>,
}

impl EnvGuard {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            original: env::var(name).ok(),
        }
    }

    fn set(&self, value: &str) {
        env::set_var(&self.name, value);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(val) => env::set_var(&self.name, val),
            None => env::remove_var(&self.name),
        }
    }
}

fn open_store() -> (TempDir, Storage) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = Storage::open(&dir.path().join("history.redb")).expect("open database");
    (dir, storage)
}

fn texts(storage: &Storage, limit: usize) -> Vec<String> {
    storage
        .history()
        .list_recent(limit)
        .expect("list history")
        .into_iter()
        .map(|entry| entry.text)
        .collect()
}

// =============================================================================
// Upsert
// =============================================================================

#[test]
fn repeated_text_keeps_one_entry_and_its_index() {
    let (_dir, storage) = open_store();
    let history = storage.history();

    let first = history.upsert("same").unwrap();
    let second = history.upsert("same").unwrap();
    let third = history.upsert("same").unwrap();

    assert!(first.is_inserted());
    assert!(!second.is_inserted());
    assert!(!third.is_inserted());
    assert_eq!(history.len().unwrap(), 1);
    assert_eq!(third.entry().sequence_index, first.entry().sequence_index);
    assert!(third.entry().last_seen_at > first.entry().last_seen_at);
}

#[test]
fn entry_fingerprint_matches_text() {
    let (_dir, storage) = open_store();

    let outcome = storage.history().upsert("hello").unwrap();

    assert_eq!(outcome.entry().fingerprint, fingerprint("hello"));
    assert_eq!(outcome.entry().fingerprint, "5d41402abc4b2a76b9719d911017c592");
}

#[test]
fn alternating_copies_refresh_instead_of_inserting() {
    let (_dir, storage) = open_store();
    let history = storage.history();

    let indices: Vec<u64> = ["a", "b", "a", "c", "b", "d"]
        .iter()
        .map(|text| history.upsert(text).unwrap().entry().sequence_index)
        .collect();

    assert_eq!(indices, vec![1, 2, 1, 3, 2, 4]);
    assert_eq!(texts(&storage, 10), vec!["d", "b", "c", "a"]);
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn empty_history_lists_nothing() {
    let (_dir, storage) = open_store();
    assert!(texts(&storage, 10).is_empty());
}

#[test]
fn list_recent_truncates_to_limit() {
    let (_dir, storage) = open_store();
    for i in 0..15 {
        storage.history().upsert(&format!("clip {i}")).unwrap();
    }

    let recent = texts(&storage, 10);

    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0], "clip 14");
    assert_eq!(recent[9], "clip 5");
}

#[test]
fn find_by_display_index_returns_entry_or_not_found() {
    let (_dir, storage) = open_store();
    let history = storage.history();
    history.upsert("first").unwrap();
    history.upsert("second").unwrap();

    assert_eq!(history.find_by_display_index(2).unwrap().text, "second");
    assert!(matches!(
        history.find_by_display_index(3),
        Err(StoreError::NotFound { index: 3 })
    ));
}

// =============================================================================
// Clearing and persistence
// =============================================================================

#[test]
fn clear_then_upsert_uses_fresh_index() {
    let (_dir, storage) = open_store();
    let history = storage.history();
    history.upsert("a").unwrap();
    history.upsert("b").unwrap();

    assert_eq!(history.clear_all().unwrap(), 2);
    assert!(texts(&storage, 300).is_empty());

    let outcome = history.upsert("a").unwrap();
    assert!(outcome.is_inserted());
    assert_eq!(outcome.entry().sequence_index, 3);
    assert!(matches!(
        history.find_by_display_index(1),
        Err(StoreError::NotFound { index: 1 })
    ));
}

#[test]
fn history_and_limit_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.redb");

    {
        let storage = Storage::open(&path).unwrap();
        storage.history().upsert("kept").unwrap();
        storage.history().upsert("also kept").unwrap();
        storage.preferences().set_limit(30).unwrap();
    }

    let storage = Storage::open(&path).unwrap();
    assert_eq!(storage.preferences().get_limit().unwrap(), 30);
    assert_eq!(texts(&storage, 30), vec!["also kept", "kept"]);

    let outcome = storage.history().upsert("new").unwrap();
    assert_eq!(outcome.entry().sequence_index, 3);
}

#[test]
#[serial]
fn storage_opens_in_configured_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("cliptext-data");
    let guard = EnvGuard::new("CLIPTEXT_DATA_DIR");
    guard.set(data_dir.to_str().unwrap());

    let config = Config::from_env().expect("config should load");
    let storage = Storage::open(&config.database_path()).expect("open database");
    storage.history().upsert("configured").unwrap();

    assert!(data_dir.join("history.redb").exists());
}

// =============================================================================
// Concurrency and notifications
// =============================================================================

#[test]
fn concurrent_upserts_assign_unique_indices() {
    let (_dir, storage) = open_store();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let history = storage.history();
            thread::spawn(move || {
                (0..5)
                    .map(|i| {
                        history
                            .upsert(&format!("worker {worker} clip {i}"))
                            .unwrap()
                            .entry()
                            .sequence_index
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let indices: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    let unique: HashSet<u64> = indices.iter().copied().collect();

    assert_eq!(indices.len(), 20);
    assert_eq!(unique, (1..=20).collect::<HashSet<u64>>());
}

#[test]
fn every_change_is_notified_in_order() {
    let (_dir, storage) = open_store();
    let mut rx = storage.subscribe();
    let history = storage.history();

    history.upsert("x").unwrap();
    history.upsert("x").unwrap();
    storage.preferences().set_limit(10).unwrap();
    history.clear_all().unwrap();

    assert!(matches!(
        rx.try_recv().unwrap(),
        HistoryEvent::Upserted(UpsertOutcome::Inserted(_))
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        HistoryEvent::Upserted(UpsertOutcome::Refreshed(_))
    ));
    assert_eq!(rx.try_recv().unwrap(), HistoryEvent::LimitChanged(10));
    assert_eq!(rx.try_recv().unwrap(), HistoryEvent::Cleared { removed: 1 });
    assert!(rx.try_recv().is_err());
}
