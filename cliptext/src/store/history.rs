//! Deduplicated, recency-ordered clipboard history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, ReadableTableMetadata, Table, WriteTransaction};
use tracing::{debug, info};

use super::{StoreError, COUNTERS, ENTRIES, ENTRIES_BY_INDEX, ENTRIES_BY_RECENCY};
use crate::broadcast::HistoryNotifier;
use crate::types::{Entry, HistoryEvent, UpsertOutcome};
use crate::utils::fingerprint;

/// Counter holding the highest sequence index ever assigned.
const LAST_INDEX_COUNTER: &str = "last_sequence_index";

/// Authoritative store of clipboard entries.
///
/// # Invariants
///
/// - Exactly one entry per fingerprint.
/// - Sequence indices are unique and never reused, including after
///   [`clear_all`](Self::clear_all): the next index is derived from a
///   persisted counter, not from the live row count.
/// - `last_seen_at` values are strictly increasing in observation order.
///
/// # Concurrency
///
/// Every mutation runs inside one redb write transaction. redb admits a
/// single write transaction at a time, so concurrent upserts are serialized
/// and the read-counter-then-insert sequence cannot interleave. Reads use
/// snapshot read transactions and may run concurrently with a writer.
#[derive(Clone)]
pub struct HistoryStore {
    db: Arc<Database>,
    notifier: HistoryNotifier,
}

impl HistoryStore {
    pub(super) fn new(db: Arc<Database>, notifier: HistoryNotifier) -> Self {
        Self { db, notifier }
    }

    /// Records an observation of `text`.
    ///
    /// Unseen text gets a new entry with the next sequence index. Text that is
    /// already stored only has its `last_seen_at` refreshed; its index and
    /// text are left untouched. Either way a
    /// [`HistoryEvent::Upserted`] is published after the commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageIo`] or [`StoreError::Serialization`] if
    /// the transaction fails; nothing is written in that case.
    pub fn upsert(&self, text: &str) -> Result<UpsertOutcome, StoreError> {
        let fingerprint = fingerprint(text);

        let txn = self.db.begin_write()?;
        let outcome = {
            let mut tables = WriteTables::open(&txn)?;
            let stamp = tables.next_stamp()?;

            match tables.insert_new(&fingerprint, text, stamp) {
                Ok(entry) => UpsertOutcome::Inserted(entry),
                Err(StoreError::DuplicateKey { .. }) => {
                    UpsertOutcome::Refreshed(tables.refresh(&fingerprint, stamp)?)
                }
                Err(e) => return Err(e),
            }
        };
        txn.commit()?;

        let entry = outcome.entry();
        debug!(
            fingerprint = %entry.fingerprint,
            sequence_index = entry.sequence_index,
            text_len = entry.text.len(),
            inserted = outcome.is_inserted(),
            "Upserted history entry"
        );

        self.notifier.notify(HistoryEvent::Upserted(outcome.clone()));
        Ok(outcome)
    }

    /// Returns up to `limit` entries, most recently seen first.
    ///
    /// Entries seen at the same instant are ordered by higher sequence index
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Entry>, StoreError> {
        let txn = self.db.begin_read()?;
        let by_recency = txn.open_table(ENTRIES_BY_RECENCY)?;
        let entries = txn.open_table(ENTRIES)?;

        let mut recent = Vec::new();
        for row in by_recency.iter()?.rev().take(limit) {
            let (_, fingerprint) = row?;
            if let Some(json) = entries.get(fingerprint.value())? {
                recent.push(serde_json::from_str(json.value())?);
            }
        }

        Ok(recent)
    }

    /// Looks up the entry with the given display index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no entry has `index`, for example
    /// when a menu refers to an entry removed by [`clear_all`](Self::clear_all).
    pub fn find_by_display_index(&self, index: u64) -> Result<Entry, StoreError> {
        let txn = self.db.begin_read()?;
        let by_index = txn.open_table(ENTRIES_BY_INDEX)?;
        let entries = txn.open_table(ENTRIES)?;

        let fingerprint = by_index
            .get(index)?
            .map(|guard| guard.value().to_string())
            .ok_or(StoreError::NotFound { index })?;

        let json = entries
            .get(fingerprint.as_str())?
            .map(|guard| guard.value().to_string())
            .ok_or(StoreError::NotFound { index })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Removes every entry, returning how many were removed.
    ///
    /// The sequence counter is kept, so indices assigned afterwards never
    /// collide with indices a stale menu may still hold.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; no entry is removed then.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut tables = WriteTables::open(&txn)?;
            tables.remove_all()?
        };
        txn.commit()?;

        info!(removed, "Cleared clipboard history");

        self.notifier.notify(HistoryEvent::Cleared { removed });
        Ok(removed)
    }

    /// Returns the number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn len(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read()?;
        let entries = txn.open_table(ENTRIES)?;
        Ok(entries.len()? as usize)
    }

    /// Returns `true` if the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// The history tables opened inside one write transaction.
struct WriteTables<'txn> {
    entries: Table<'txn, &'static str, &'static str>,
    by_index: Table<'txn, u64, &'static str>,
    by_recency: Table<'txn, (i64, u64), &'static str>,
    counters: Table<'txn, &'static str, u64>,
}

impl<'txn> WriteTables<'txn> {
    fn open(txn: &'txn WriteTransaction) -> Result<Self, StoreError> {
        Ok(Self {
            entries: txn.open_table(ENTRIES)?,
            by_index: txn.open_table(ENTRIES_BY_INDEX)?,
            by_recency: txn.open_table(ENTRIES_BY_RECENCY)?,
            counters: txn.open_table(COUNTERS)?,
        })
    }

    /// Returns the stamp for a new observation: now, or one microsecond after
    /// the newest stored stamp if the clock has not moved past it.
    fn next_stamp(&self) -> Result<DateTime<Utc>, StoreError> {
        let now = Utc::now().timestamp_micros();
        let newest = self.by_recency.last()?.map(|(key, _)| key.value().0);

        let micros = match newest {
            Some(newest) if newest >= now => newest + 1,
            _ => now,
        };

        DateTime::<Utc>::from_timestamp_micros(micros)
            .ok_or_else(|| StoreError::StorageIo(format!("timestamp out of range: {micros}")))
    }

    /// Next sequence index: one past the larger of the persisted counter and
    /// the live row count.
    fn next_sequence_index(&self) -> Result<u64, StoreError> {
        let last_assigned = self
            .counters
            .get(LAST_INDEX_COUNTER)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let count = self.entries.len()?;

        Ok(last_assigned.max(count) + 1)
    }

    /// Inserts a new entry.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the fingerprint is present.
    fn insert_new(
        &mut self,
        fingerprint: &str,
        text: &str,
        stamp: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        if self.entries.get(fingerprint)?.is_some() {
            return Err(StoreError::DuplicateKey {
                fingerprint: fingerprint.to_string(),
            });
        }

        let sequence_index = self.next_sequence_index()?;
        if self.by_index.get(sequence_index)?.is_some() {
            return Err(StoreError::StorageIo(format!(
                "sequence index {sequence_index} already assigned"
            )));
        }

        let entry = Entry {
            fingerprint: fingerprint.to_string(),
            text: text.to_string(),
            sequence_index,
            last_seen_at: stamp,
        };
        let json = serde_json::to_string(&entry)?;

        self.entries.insert(fingerprint, json.as_str())?;
        self.by_index.insert(sequence_index, fingerprint)?;
        self.by_recency
            .insert((stamp.timestamp_micros(), sequence_index), fingerprint)?;
        self.counters.insert(LAST_INDEX_COUNTER, sequence_index)?;

        Ok(entry)
    }

    /// Moves an existing entry's `last_seen_at` to `stamp`.
    fn refresh(&mut self, fingerprint: &str, stamp: DateTime<Utc>) -> Result<Entry, StoreError> {
        let json = self
            .entries
            .get(fingerprint)?
            .map(|guard| guard.value().to_string())
            .ok_or_else(|| {
                StoreError::StorageIo(format!("entry {fingerprint} missing during refresh"))
            })?;
        let mut entry: Entry = serde_json::from_str(&json)?;

        self.by_recency
            .remove((entry.last_seen_at.timestamp_micros(), entry.sequence_index))?;

        entry.last_seen_at = stamp;
        let json = serde_json::to_string(&entry)?;

        self.entries.insert(fingerprint, json.as_str())?;
        self.by_recency
            .insert((stamp.timestamp_micros(), entry.sequence_index), fingerprint)?;

        Ok(entry)
    }

    /// Deletes every row of the entry tables, leaving the counters intact.
    fn remove_all(&mut self) -> Result<usize, StoreError> {
        let mut fingerprints = Vec::new();
        for row in self.entries.iter()? {
            let (key, _) = row?;
            fingerprints.push(key.value().to_string());
        }

        let mut indices = Vec::new();
        for row in self.by_index.iter()? {
            let (key, _) = row?;
            indices.push(key.value());
        }

        let mut recency_keys = Vec::new();
        for row in self.by_recency.iter()? {
            let (key, _) = row?;
            recency_keys.push(key.value());
        }

        for fingerprint in &fingerprints {
            self.entries.remove(fingerprint.as_str())?;
        }
        for index in indices {
            self.by_index.remove(index)?;
        }
        for key in recency_keys {
            self.by_recency.remove(key)?;
        }

        Ok(fingerprints.len())
    }
}
