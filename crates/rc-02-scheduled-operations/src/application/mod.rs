//! Application layer for the Scheduled Operation Queue

pub mod service;

pub use service::ScheduledOperationQueue;
