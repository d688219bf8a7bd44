//! # RC-02: Scheduled Operation Queue
//!
//! Delay-gated execution of governance calls (a timelock). Every privileged
//! ledger change is expected to pass through here, so the community has at
//! least `min_delay` to react before it takes effect.
//!
//! ## Architecture
//!
//! - **Domain**: `ScheduledOperation`, `OperationState`, deterministic ids
//! - **Application**: `ScheduledOperationQueue`
//! - **Calls**: `TimelockCall`, the payload other engines send to the queue
//!
//! ## State Machine
//!
//! ```text
//! Unset ──schedule──→ Scheduled ──execute (ready, predecessor done)──→ Executed
//!                         │
//!                         └──cancel──→ Cancelled
//! ```

pub mod application;
pub mod calls;
pub mod config;
pub mod domain;

pub use application::ScheduledOperationQueue;
pub use calls::TimelockCall;
pub use config::{TimelockConfig, DEFAULT_MIN_DELAY_SECS};
pub use domain::{hash_operation, OperationCall, OperationState, ScheduleError, ScheduledOperation};
