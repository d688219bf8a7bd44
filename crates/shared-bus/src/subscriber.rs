//! # Event Subscriber
//!
//! Defines the subscription side of the bus.

use crate::events::{EventFilter, EventRecord};
use tokio::sync::broadcast;
use tracing::debug;

/// A subscription handle for receiving live records.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<EventRecord>,

    /// Filter for this subscription.
    filter: EventFilter,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(receiver: broadcast::Receiver<EventRecord>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next record that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(record)` - The next matching record
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<EventRecord> {
        loop {
            let record = match self.receiver.recv().await {
                Ok(r) => r,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, read the journal to catch up");
                    continue;
                }
            };

            if self.filter.matches(&record) {
                return Some(record);
            }
        }
    }

    /// Receive the next already-buffered matching record without waiting.
    pub fn try_recv(&mut self) -> Option<EventRecord> {
        loop {
            match self.receiver.try_recv() {
                Ok(record) if self.filter.matches(&record) => return Some(record),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, read the journal to catch up");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
