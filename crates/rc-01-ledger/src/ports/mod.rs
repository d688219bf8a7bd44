//! Ports layer for the Backed Ledger
//!
//! Outbound events go through [`shared_bus::EventPublisher`]; the cross-engine
//! call port is [`shared_types::CallTarget`].

pub mod inbound;

pub use inbound::*;
