//! "History changed" notifications for presenters.
//!
//! The stores publish a [`HistoryEvent`] after every committed mutation.
//! Presenters subscribe and re-render whenever one arrives; events published
//! while nobody is subscribed are dropped.
//!
//! # Example
//!
//! ```rust
//! use cliptext::broadcast::HistoryNotifier;
//! use cliptext::types::HistoryEvent;
//!
//! let notifier = HistoryNotifier::new();
//! let mut rx = notifier.subscribe();
//!
//! notifier.notify(HistoryEvent::LimitChanged(30));
//! assert_eq!(rx.try_recv().unwrap(), HistoryEvent::LimitChanged(30));
//! ```

use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::{debug, trace};

use crate::types::HistoryEvent;

/// Default channel capacity.
///
/// Subscribers that fall further behind receive `RecvError::Lagged`; a
/// presenter only needs the latest state, so lagging is harmless.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`HistoryEvent`]s to every subscribed presenter.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct HistoryNotifier {
    sender: Sender<HistoryEvent>,
}

impl HistoryNotifier {
    /// Creates a notifier with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a notifier with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<HistoryEvent> {
        let rx = self.sender.subscribe();
        debug!(
            subscriber_count = self.subscriber_count(),
            "History subscriber added"
        );
        rx
    }

    /// Publishes an event, returning how many subscribers received it.
    pub fn notify(&self, event: HistoryEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(receivers, "History event published");
                receivers
            }
            Err(_) => {
                trace!("No subscribers for history event");
                0
            }
        }
    }

    /// Returns the current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for HistoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}
