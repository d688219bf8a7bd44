//! # Shared Bus - Event Journal for Reserve-Chain Subsystems
//!
//! Every committed state transition in every engine is published here as a
//! structured [`LedgerEvent`]. The bus keeps an append-only, sequence-numbered
//! journal (the authoritative history) and fans each record out to live
//! subscribers.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────────┐  subscribe()  ┌────────────┐
//! │ Ledger /     │ ────────────→ │ InMemoryEventBus │ ────────────→ │ Subscriber │
//! │ Queue /      │               │  journal (Vec)   │               │ (filtered) │
//! │ Multisig     │               │  broadcast tx    │               └────────────┘
//! └──────────────┘               └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Records are never mutated or removed once appended.
//! - Engines publish only after a mutation has committed, so the journal never
//!   contains effects of an aborted operation. Compliance violations are the
//!   one deliberate exception: they are audit records of a rejected call.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventRecord, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::Subscription;

/// Current schema version of journal records.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum records buffered per live subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
