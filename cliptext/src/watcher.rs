//! Clipboard watcher that records every text change into the history.
//!
//! The watcher polls the clipboard on a fixed interval and compares the text
//! with the last value it saw. Each distinct change is reported to the
//! [`HistoryStore`] exactly once. The value present when the watcher is
//! created is the baseline and is not recorded.
//!
//! # Ticks
//!
//! A tick reads the clipboard, compares, and (on change) awaits the upsert
//! before returning. [`ClipboardWatcher::run`] never starts a tick before the
//! previous one finished, and late ticks are delayed rather than bunched, so
//! at most one upsert from the watcher is ever in flight.
//!
//! # Failures
//!
//! Read failures skip the tick and are logged on the first occurrence and
//! every [`READ_FAILURE_LOG_INTERVAL`]th consecutive one. Store failures are
//! logged. Neither stops the cadence.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use cliptext::clipboard::SystemClipboard;
//! use cliptext::store::Storage;
//! use cliptext::watcher::ClipboardWatcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::open(Path::new("/tmp/cliptext/history.redb"))?;
//!     let watcher = ClipboardWatcher::new(
//!         SystemClipboard::new()?,
//!         storage.history(),
//!         Duration::from_millis(500),
//!     );
//!
//!     watcher.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::clipboard::{ClipboardError, ClipboardIo};
use crate::store::HistoryStore;
use crate::types::UpsertOutcome;

/// Consecutive read failures between repeated warnings.
pub const READ_FAILURE_LOG_INTERVAL: u32 = 10;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clipboard text matched the last observed value.
    Unchanged,
    /// A change was detected and stored.
    Recorded(UpsertOutcome),
    /// A change was detected but the store rejected it.
    StoreFailed,
    /// The clipboard could not be read; the tick was skipped.
    ReadFailed,
}

/// Polls a clipboard and forwards changes to the history.
pub struct ClipboardWatcher<C> {
    clipboard: C,
    history: HistoryStore,
    interval: Duration,
    last_observed: String,
    consecutive_read_failures: u32,
}

impl<C: ClipboardIo> ClipboardWatcher<C> {
    /// Creates a watcher, taking the clipboard's current text as baseline.
    ///
    /// If the baseline read fails the baseline is the empty string.
    pub fn new(mut clipboard: C, history: HistoryStore, interval: Duration) -> Self {
        let last_observed = match clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to read initial clipboard, using empty baseline");
                String::new()
            }
        };

        debug!(
            baseline_len = last_observed.len(),
            interval_ms = interval.as_millis() as u64,
            "Initialized clipboard watcher"
        );

        Self {
            clipboard,
            history,
            interval,
            last_observed,
            consecutive_read_failures: 0,
        }
    }

    /// The most recently observed clipboard text.
    #[must_use]
    pub fn last_observed(&self) -> &str {
        &self.last_observed
    }

    /// The polling interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reads the clipboard and returns the new text if it changed.
    ///
    /// Updates the last observed value on change.
    ///
    /// # Errors
    ///
    /// Returns the clipboard's read error; the last observed value is kept.
    pub fn poll_change(&mut self) -> Result<Option<String>, ClipboardError> {
        let current = self.clipboard.read_text()?;
        if current == self.last_observed {
            return Ok(None);
        }

        self.last_observed.clone_from(&current);
        Ok(Some(current))
    }

    /// Runs one poll-and-record cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        let text = match self.poll_change() {
            Ok(Some(text)) => {
                self.consecutive_read_failures = 0;
                text
            }
            Ok(None) => {
                self.consecutive_read_failures = 0;
                trace!("Clipboard unchanged");
                return TickOutcome::Unchanged;
            }
            Err(e) => {
                self.consecutive_read_failures += 1;
                let failures = self.consecutive_read_failures;
                if failures == 1 || failures % READ_FAILURE_LOG_INTERVAL == 0 {
                    warn!(error = %e, consecutive_failures = failures, "Failed to read clipboard");
                }
                return TickOutcome::ReadFailed;
            }
        };

        debug!(text_len = text.len(), "Clipboard change detected");

        let history = self.history.clone();
        match tokio::task::spawn_blocking(move || history.upsert(&text)).await {
            Ok(Ok(outcome)) => TickOutcome::Recorded(outcome),
            Ok(Err(e)) => {
                error!(error = %e, "Failed to record clipboard change");
                TickOutcome::StoreFailed
            }
            Err(e) => {
                error!(error = %e, "Clipboard upsert task failed");
                TickOutcome::StoreFailed
            }
        }
    }

    /// Polls until `shutdown` completes.
    ///
    /// A tick that has started always runs to completion before shutdown is
    /// observed.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Clipboard watcher started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        info!("Clipboard watcher stopped");
    }
}
