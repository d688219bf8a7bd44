//! # Event Publisher
//!
//! Defines the publishing side of the bus and the in-memory journal.

use crate::events::{EventFilter, EventRecord, LedgerEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::{Mutex, RwLock};
use shared_types::Address;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Trait for publishing events to the bus.
///
/// Engines hold an `Arc<dyn EventPublisher>` and call `publish` once per
/// committed transition.
pub trait EventPublisher: Send + Sync {
    /// Append an event to the journal.
    ///
    /// # Returns
    ///
    /// The sequence number assigned to the record.
    fn publish(&self, emitter: Address, event: LedgerEvent) -> u64;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;

    /// Holds back every record published until the matching
    /// [`close_scope`](Self::close_scope). Scopes nest.
    ///
    /// The default implementation publishes immediately.
    fn open_scope(&self) {}

    /// Releases the records of the innermost scope in publish order, into the
    /// enclosing scope if there is one. Records from `discard` are dropped.
    fn close_scope(&self, _discard: Option<Address>) {}
}

/// In-memory journal with live fan-out.
///
/// The journal is the source of truth; the broadcast channel is a best-effort
/// notification path and slow subscribers may lag without affecting it.
pub struct InMemoryEventBus {
    /// Append-only journal.
    journal: RwLock<Vec<EventRecord>>,

    /// Broadcast sender for live subscribers.
    sender: broadcast::Sender<EventRecord>,

    /// Open scopes, innermost last.
    held: Mutex<Vec<Vec<(Address, LedgerEvent)>>>,
}

impl InMemoryEventBus {
    /// Create a new bus with default subscriber capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with the given subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            journal: RwLock::new(Vec::new()),
            sender,
            held: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to records published from now on that match `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Snapshot of the full journal.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.journal.read().clone()
    }

    /// Records with `sequence >= from`.
    #[must_use]
    pub fn records_since(&self, from: u64) -> Vec<EventRecord> {
        let journal = self.journal.read();
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(journal.len());
        journal[start..].to_vec()
    }

    /// Journal records matching `filter`.
    #[must_use]
    pub fn query(&self, filter: &EventFilter) -> Vec<EventRecord> {
        self.journal
            .read()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }

    /// Number of records in the journal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.journal.read().len()
    }

    /// Returns true if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.journal.read().is_empty()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn append(&self, emitter: Address, event: LedgerEvent) -> u64 {
        let record = {
            let mut journal = self.journal.write();
            let record = EventRecord {
                sequence: journal.len() as u64,
                emitter,
                event,
            };
            journal.push(record.clone());
            record
        };

        trace!(
            sequence = record.sequence,
            topic = ?record.event.topic(),
            "Event appended to journal"
        );

        // No receivers is not an error: the journal already holds the record.
        let _ = self.sender.send(record.clone());
        record.sequence
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    /// Inside a scope the returned sequence is provisional: it is the number
    /// the record gets if nothing held before it is discarded.
    fn publish(&self, emitter: Address, event: LedgerEvent) -> u64 {
        {
            let mut held = self.held.lock();
            if !held.is_empty() {
                let pending: usize = held.iter().map(Vec::len).sum();
                let provisional = (self.journal.read().len() + pending) as u64;
                if let Some(scope) = held.last_mut() {
                    scope.push((emitter, event));
                }
                trace!(provisional, depth = held.len(), "Event held in scope");
                return provisional;
            }
        }
        self.append(emitter, event)
    }

    fn events_published(&self) -> u64 {
        self.journal.read().len() as u64
    }

    fn open_scope(&self) {
        self.held.lock().push(Vec::new());
    }

    fn close_scope(&self, discard: Option<Address>) {
        let released: Vec<(Address, LedgerEvent)> = {
            let mut held = self.held.lock();
            let Some(scope) = held.pop() else {
                return;
            };
            let kept: Vec<_> = scope
                .into_iter()
                .filter(|(emitter, _)| Some(*emitter) != discard)
                .collect();
            match held.last_mut() {
                Some(outer) => {
                    outer.extend(kept);
                    return;
                }
                None => kept,
            }
        };
        for (emitter, event) in released {
            self.append(emitter, event);
        }
    }
}
