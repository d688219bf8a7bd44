//! Outbound (Driven) ports shared by the governance engines.
//!
//! These traits define the only ways one engine reaches another engine or the
//! wall clock.

use crate::entities::{Address, Amount, Timestamp};
use crate::errors::CallError;
use std::sync::atomic::{AtomicU64, Ordering};

/// An engine that can execute an encoded operation on behalf of a caller.
///
/// Implementations must be all-or-nothing: when `call` returns `Err`, no state
/// of the target may have changed.
pub trait CallTarget {
    /// Executes `payload` against the engine at `target`.
    ///
    /// # Arguments
    /// - `caller`: identity the target authorizes against
    /// - `target`: address of the engine being called
    /// - `value`: attached value (rejected by non-payable targets)
    /// - `payload`: encoded operation
    ///
    /// # Returns
    /// Encoded return data on success.
    fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: &[u8],
    ) -> Result<Vec<u8>, CallError>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Manually driven time source for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicU64,
}

impl ManualTimeSource {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Sets the clock to `timestamp`.
    pub fn set(&self, timestamp: Timestamp) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
