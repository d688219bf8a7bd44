//! Error types for the Backed Ledger
//!
//! Every variant maps onto one [`ErrorKind`] of the shared taxonomy.

use shared_types::{Address, Amount, ErrorKind, LedgerRole};
use thiserror::Error;

/// All errors that can occur in the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    /// Caller does not hold the role the operation requires.
    #[error("Unauthorized: {caller} lacks role {role}")]
    Unauthorized { caller: Address, role: LedgerRole },

    // =========================================================================
    // COMPLIANCE
    // =========================================================================
    /// An endpoint of the operation is not whitelisted.
    #[error("Compliance: {account} is not whitelisted")]
    NotWhitelisted { account: Address },

    /// Ordinary transfers are globally disabled.
    #[error("Compliance: transfers are disabled")]
    TransfersDisabled,

    /// Mint destination or burn source is not the custodial account.
    #[error("Compliance: {account} is not the custodial account {custodial}")]
    NotCustodialAccount { account: Address, custodial: Address },

    // =========================================================================
    // INVARIANT
    // =========================================================================
    /// Strict 1:1 minting requires amount == backing.
    #[error("Invariant mismatch: amount {amount} != backing {backing}")]
    InvariantMismatch { amount: Amount, backing: Amount },

    /// Aggregate supply and backing diverged.
    #[error("Supply/backing mismatch: supply {total_supply} != backing {total_backing}")]
    SupplyBackingMismatch {
        total_supply: Amount,
        total_backing: Amount,
    },

    /// Source balance is too small.
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: Amount,
        available: Amount,
    },

    /// Spender allowance is too small.
    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: Amount, available: Amount },

    /// A balance or total would overflow.
    #[error("Arithmetic overflow in {context}")]
    Overflow { context: &'static str },

    /// A snapshot failed consistency checks.
    #[error("Inconsistent snapshot: {0}")]
    InconsistentSnapshot(String),

    // =========================================================================
    // STATE
    // =========================================================================
    /// Balance movements are paused.
    #[error("Ledger is paused")]
    Paused,

    /// Unpause called while not paused.
    #[error("Ledger is not paused")]
    NotPaused,

    /// Requested upgrade does not move the version forward.
    #[error("Invalid upgrade: current version {current}, requested {requested}")]
    InvalidUpgrade { current: u32, requested: u32 },

    // =========================================================================
    // INPUT
    // =========================================================================
    /// Backing delta of zero.
    #[error("Invalid backing: backing delta must be non-zero")]
    InvalidBacking,

    /// Amount of zero.
    #[error("Amount must be non-zero")]
    ZeroAmount,

    /// Zero address used as an endpoint or role holder.
    #[error("Zero address is not a valid account")]
    ZeroAddress,

    /// Whitelist batch larger than the configured cap.
    #[error("Batch too large: {size} > {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Whitelist batch with no entries.
    #[error("Empty batch")]
    EmptyBatch,

    /// Snapshot or upgrade names a version this release does not know.
    #[error("Unsupported state version {version} (latest {latest})")]
    UnsupportedVersion { version: u32, latest: u32 },
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::NotWhitelisted { .. }
            | Self::TransfersDisabled
            | Self::NotCustodialAccount { .. } => ErrorKind::Compliance,
            Self::InvariantMismatch { .. }
            | Self::SupplyBackingMismatch { .. }
            | Self::InsufficientBalance { .. }
            | Self::InsufficientAllowance { .. }
            | Self::Overflow { .. }
            | Self::InconsistentSnapshot(_) => ErrorKind::InvariantViolation,
            Self::Paused | Self::NotPaused | Self::InvalidUpgrade { .. } => ErrorKind::State,
            Self::InvalidBacking
            | Self::ZeroAmount
            | Self::ZeroAddress
            | Self::BatchTooLarge { .. }
            | Self::EmptyBatch
            | Self::UnsupportedVersion { .. } => ErrorKind::Input,
        }
    }
}
