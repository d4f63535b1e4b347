//! The display-limit preference.

use std::sync::Arc;

use redb::Database;
use tracing::info;

use super::{StoreError, PREFERENCES};
use crate::broadcast::HistoryNotifier;
use crate::types::{HistoryEvent, Preference, PreferenceKind, DEFAULT_DISPLAY_LIMIT};

/// Single-document settings store.
///
/// At most one [`Preference`] per [`PreferenceKind`] exists; writes overwrite
/// it in place.
#[derive(Clone)]
pub struct PreferenceStore {
    db: Arc<Database>,
    notifier: HistoryNotifier,
}

impl PreferenceStore {
    pub(super) fn new(db: Arc<Database>, notifier: HistoryNotifier) -> Self {
        Self { db, notifier }
    }

    /// Returns the stored display limit, or [`DEFAULT_DISPLAY_LIMIT`] if none
    /// has been set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or the stored document
    /// is malformed.
    pub fn get_limit(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PREFERENCES)?;

        let stored = match table.get(PreferenceKind::Settings.as_str())? {
            Some(json) => Some(serde_json::from_str::<Preference>(json.value())?),
            None => None,
        };

        Ok(stored.map_or(DEFAULT_DISPLAY_LIMIT, |pref| pref.limit))
    }

    /// Stores `limit` as the display limit, creating the document if absent.
    ///
    /// Returns once the write is committed, then publishes
    /// [`HistoryEvent::LimitChanged`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidLimit`] for 0, or a storage error if the
    /// write fails.
    pub fn set_limit(&self, limit: usize) -> Result<(), StoreError> {
        if limit == 0 {
            return Err(StoreError::InvalidLimit(limit));
        }

        let pref = Preference {
            kind: PreferenceKind::Settings,
            limit,
        };
        let json = serde_json::to_string(&pref)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PREFERENCES)?;
            table.insert(pref.kind.as_str(), json.as_str())?;
        }
        txn.commit()?;

        info!(limit, "Display limit updated");

        self.notifier.notify(HistoryEvent::LimitChanged(limit));
        Ok(())
    }
}
