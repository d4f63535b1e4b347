//! Persistent clipboard history and preferences.
//!
//! Everything lives in a single embedded [`redb`] database owned by this
//! process. A [`Storage`] handle opens the file once at startup and hands out
//! the two stores that operate on it:
//!
//! - [`HistoryStore`]: deduplicated, recency-ordered clipboard entries
//! - [`PreferenceStore`]: the display-limit setting
//!
//! Both stores publish a [`HistoryEvent`](crate::types::HistoryEvent) through
//! the shared [`HistoryNotifier`] after each committed change.
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `entries` | fingerprint | JSON [`Entry`](crate::types::Entry) |
//! | `entries_by_index` | sequence index | fingerprint |
//! | `entries_by_recency` | (last seen µs, sequence index) | fingerprint |
//! | `counters` | counter name | `u64` |
//! | `preferences` | preference kind | JSON [`Preference`](crate::types::Preference) |
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use cliptext::store::Storage;
//!
//! # fn main() -> Result<(), cliptext::store::StoreError> {
//! let storage = Storage::open(Path::new("/tmp/cliptext/history.redb"))?;
//! let history = storage.history();
//!
//! history.upsert("hello")?;
//! let limit = storage.preferences().get_limit()?;
//! for entry in history.list_recent(limit)? {
//!     println!("{} {}", entry.sequence_index, entry.text);
//! }
//! # Ok(())
//! # }
//! ```

mod history;
mod preferences;

use std::path::Path;
use std::sync::Arc;

use redb::{Database, TableDefinition};
use thiserror::Error;
use tokio::sync::broadcast::Receiver;
use tracing::info;

use crate::broadcast::HistoryNotifier;
use crate::types::HistoryEvent;

pub use history::HistoryStore;
pub use preferences::PreferenceStore;

/// Fingerprint to serialized entry.
pub(crate) const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Sequence index to fingerprint. Enforces index uniqueness.
pub(crate) const ENTRIES_BY_INDEX: TableDefinition<u64, &str> =
    TableDefinition::new("entries_by_index");

/// (last seen micros, sequence index) to fingerprint, iterated newest last.
pub(crate) const ENTRIES_BY_RECENCY: TableDefinition<(i64, u64), &str> =
    TableDefinition::new("entries_by_recency");

/// Named monotonic counters.
pub(crate) const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Preference kind to serialized preference.
pub(crate) const PREFERENCES: TableDefinition<&str, &str> = TableDefinition::new("preferences");

/// Errors that can occur in the history and preference stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be read or written.
    ///
    /// The failed operation's transaction is not committed, so stored state
    /// is unchanged.
    #[error("storage I/O error: {0}")]
    StorageIo(String),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An entry with this fingerprint already exists.
    ///
    /// Raised by the insert path and recovered inside
    /// [`HistoryStore::upsert`]; callers never see it.
    #[error("duplicate fingerprint: {fingerprint}")]
    DuplicateKey { fingerprint: String },

    /// No entry carries the requested display index.
    #[error("no history entry with display index {index}")]
    NotFound { index: u64 },

    /// A display limit of zero was requested.
    #[error("display limit must be greater than 0, got {0}")]
    InvalidLimit(usize),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageIo(err.to_string())
    }
}

macro_rules! storage_io_from {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for StoreError {
                fn from(err: $err) -> Self {
                    Self::StorageIo(err.to_string())
                }
            }
        )*
    };
}

storage_io_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Owner of the history database.
///
/// Construct once at process start; the stores it hands out share the same
/// database and notifier. Dropping the last handle closes the database.
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
    notifier: HistoryNotifier,
}

impl Storage {
    /// Opens (or creates) the database at `path` and ensures all tables exist.
    ///
    /// The parent directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageIo`] if the directory or database cannot be
    /// created, or if another process holds the database open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            txn.open_table(ENTRIES)?;
            txn.open_table(ENTRIES_BY_INDEX)?;
            txn.open_table(ENTRIES_BY_RECENCY)?;
            txn.open_table(COUNTERS)?;
            txn.open_table(PREFERENCES)?;
        }
        txn.commit()?;

        info!(path = %path.display(), "Opened history database");

        Ok(Self {
            db: Arc::new(db),
            notifier: HistoryNotifier::new(),
        })
    }

    /// Returns a handle to the clipboard history.
    #[must_use]
    pub fn history(&self) -> HistoryStore {
        HistoryStore::new(Arc::clone(&self.db), self.notifier.clone())
    }

    /// Returns a handle to the preferences.
    #[must_use]
    pub fn preferences(&self) -> PreferenceStore {
        PreferenceStore::new(Arc::clone(&self.db), self.notifier.clone())
    }

    /// Subscribes to change notifications from both stores.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<HistoryEvent> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
impl Storage {
    /// Replaces the stored document for `text` with bytes that are not JSON,
    /// so the next refresh of that entry fails.
    pub(crate) fn corrupt_entry(&self, text: &str) -> Result<(), StoreError> {
        let fingerprint = crate::utils::fingerprint(text);
        let txn = self.db.begin_write()?;
        {
            let mut entries = txn.open_table(ENTRIES)?;
            entries.insert(fingerprint.as_str(), "{not json")?;
        }
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = create_test_dir();
        let path = dir.path().join("nested/deeper/history.redb");

        let storage = Storage::open(&path).expect("should open database");

        assert!(path.exists());
        assert!(storage.history().is_empty().unwrap());
    }

    #[test]
    fn reopening_keeps_entries() {
        let dir = create_test_dir();
        let path = dir.path().join("history.redb");

        {
            let storage = Storage::open(&path).unwrap();
            storage.history().upsert("persisted").unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        let entries = storage.history().list_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "persisted");
    }

    #[test]
    fn second_open_of_same_file_fails_while_first_is_alive() {
        let dir = create_test_dir();
        let path = dir.path().join("history.redb");

        let _first = Storage::open(&path).unwrap();
        let second = Storage::open(&path);

        assert!(matches!(second, Err(StoreError::StorageIo(_))));
    }

    #[test]
    fn stores_share_one_notifier() {
        let dir = create_test_dir();
        let storage = Storage::open(&dir.path().join("history.redb")).unwrap();
        let mut rx = storage.subscribe();

        storage.preferences().set_limit(30).unwrap();
        storage.history().clear_all().unwrap();

        assert_eq!(rx.try_recv().unwrap(), HistoryEvent::LimitChanged(30));
        assert_eq!(rx.try_recv().unwrap(), HistoryEvent::Cleared { removed: 0 });
    }

    #[test]
    fn store_error_display() {
        assert_eq!(
            StoreError::NotFound { index: 4 }.to_string(),
            "no history entry with display index 4"
        );
        assert_eq!(
            StoreError::InvalidLimit(0).to_string(),
            "display limit must be greater than 0, got 0"
        );
        assert_eq!(
            StoreError::DuplicateKey {
                fingerprint: "abc".to_string()
            }
            .to_string(),
            "duplicate fingerprint: abc"
        );
        assert_eq!(
            StoreError::StorageIo("disk full".to_string()).to_string(),
            "storage I/O error: disk full"
        );
    }

    #[test]
    fn io_error_converts_to_storage_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::StorageIo(ref msg) if msg.contains("denied")));
    }
}
