//! # Integration Tests
//!
//! Scenarios run against a runtime deployed by the genesis builder, so every
//! privileged change has to travel the real governance path.

pub mod fixtures;

mod event_journal;
mod governance_flows;
mod ledger_properties;
