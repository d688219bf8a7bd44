//! Configuration for the Scheduled Operation Queue

use serde::{Deserialize, Serialize};

/// Default minimum delay: two days.
pub const DEFAULT_MIN_DELAY_SECS: u64 = 2 * 24 * 60 * 60;

/// Queue configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockConfig {
    /// Minimum delay between scheduling and execution (seconds)
    pub min_delay_secs: u64,
}

impl Default for TimelockConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: DEFAULT_MIN_DELAY_SECS,
        }
    }
}
