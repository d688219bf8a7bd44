//! # Reserve-Chain Test Suite
//!
//! Unified test crate for behaviour that spans more than one subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Deployed runtime with funded holders
//!     ├── ledger_properties.rs # Supply/backing properties through the full stack
//!     ├── governance_flows.rs  # Multisig → queue → ledger
//!     └── event_journal.rs     # Live subscription and journal replay
//!
//! benches/
//! └── ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rc-tests
//! cargo test -p rc-tests integration::governance_flows::
//! cargo bench -p rc-tests
//! ```

pub mod integration;
