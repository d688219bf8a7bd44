//! Domain layer for the Scheduled Operation Queue

pub mod entities;
pub mod errors;

pub use entities::{hash_operation, OperationCall, OperationState, ScheduledOperation};
pub use errors::ScheduleError;
