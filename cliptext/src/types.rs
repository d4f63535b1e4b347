//! Record types for the clipboard history.
//!
//! This module defines the documents persisted by the stores and the
//! notifications broadcast to presenters. Persisted types serialize to
//! camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::fingerprint;

/// Number of entries surfaced when no limit has been configured.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// A single retained clipboard text item.
///
/// The `fingerprint` is derived from `text` and identifies the entry; the
/// `sequence_index` is assigned once at creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// MD5 hex digest of `text`.
    pub fingerprint: String,

    /// The captured clipboard string.
    pub text: String,

    /// Display index, unique across the store and never reused.
    pub sequence_index: u64,

    /// When this content was last observed on the clipboard.
    pub last_seen_at: DateTime<Utc>,
}

impl Entry {
    /// Creates an entry for `text`, computing its fingerprint.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use cliptext::types::Entry;
    ///
    /// let entry = Entry::new("hello".to_string(), 1, Utc::now());
    /// assert_eq!(entry.fingerprint, "5d41402abc4b2a76b9719d911017c592");
    /// assert_eq!(entry.sequence_index, 1);
    /// ```
    #[must_use]
    pub fn new(text: String, sequence_index: u64, last_seen_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint: fingerprint(&text),
            text,
            sequence_index,
            last_seen_at,
        }
    }
}

/// Discriminator for preference documents.
///
/// Only one document of each kind may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    /// The display-limit setting.
    Settings,
}

impl PreferenceKind {
    /// Storage key of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
        }
    }
}

/// The persisted display-limit setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub kind: PreferenceKind,
    pub limit: usize,
}

/// Result of a successful [`upsert`](crate::store::HistoryStore::upsert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The text had not been seen before and a new entry was created.
    Inserted(Entry),
    /// The text already existed; only its recency was refreshed.
    Refreshed(Entry),
}

impl UpsertOutcome {
    /// The entry as stored after the upsert.
    #[must_use]
    pub fn entry(&self) -> &Entry {
        match self {
            Self::Inserted(entry) | Self::Refreshed(entry) => entry,
        }
    }

    /// Returns `true` if a new entry was created.
    #[must_use]
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// "History changed" notifications delivered to presenters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// An entry was inserted or refreshed.
    Upserted(UpsertOutcome),
    /// All entries were removed.
    Cleared {
        /// Number of entries removed.
        removed: usize,
    },
    /// The display limit was changed.
    LimitChanged(usize),
}
