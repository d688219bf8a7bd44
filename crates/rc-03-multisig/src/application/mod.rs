//! Application layer for the Multi-Party Executor

pub mod service;

pub use service::MultiPartyExecutor;
