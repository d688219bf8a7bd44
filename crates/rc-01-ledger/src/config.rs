//! Configuration for the Backed Ledger

use serde::{Deserialize, Serialize};
use shared_types::{Address, DECIMALS};

/// Default cap on whitelist batch updates.
pub const DEFAULT_MAX_WHITELIST_BATCH: usize = 500;

/// Ledger configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Human-readable token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Fixed-point decimals of balances and backing
    pub decimals: u8,
    /// Maximum entries per batch whitelist update
    pub max_whitelist_batch: usize,
    /// When set, the only legal mint destination and burn source
    pub custodial_account: Option<Address>,
    /// Initial value of the transfers-enabled flag
    pub transfers_enabled: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "Reserve Dollar".to_string(),
            symbol: "RSVD".to_string(),
            decimals: DECIMALS,
            max_whitelist_batch: DEFAULT_MAX_WHITELIST_BATCH,
            custodial_account: None,
            transfers_enabled: false,
        }
    }
}
