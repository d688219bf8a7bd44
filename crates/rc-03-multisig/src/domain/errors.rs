//! Error types for the Multi-Party Executor

use shared_types::{Address, CallError, ErrorKind, Hash};
use thiserror::Error;

/// All errors that can occur in the executor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MultisigError {
    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    /// Caller is not a current owner.
    #[error("Unauthorized: {caller} is not an owner")]
    NotOwner { caller: Address },

    /// Owner management is only reachable through an executed proposal.
    #[error("Unauthorized: {caller} is not the executor itself")]
    NotSelfCall { caller: Address },

    // =========================================================================
    // REPLAY
    // =========================================================================
    /// Submitted nonce differs from the current counter.
    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    /// This exact transaction hash was executed before.
    #[error("Transaction {tx_hash} was already executed")]
    AlreadyExecuted { tx_hash: Hash },

    // =========================================================================
    // STATE
    // =========================================================================
    /// Transaction is terminal.
    #[error("Transaction {id} is already executed")]
    TransactionExecuted { id: u64 },

    #[error("Transaction {id} already confirmed by {owner}")]
    AlreadyConfirmed { id: u64, owner: Address },

    #[error("Transaction {id} not confirmed by {owner}")]
    NotConfirmed { id: u64, owner: Address },

    #[error("Transaction {id} has {confirmations} of {threshold} confirmations")]
    ThresholdNotMet {
        id: u64,
        confirmations: usize,
        threshold: usize,
    },

    #[error("Owner {0} does not exist")]
    OwnerNotFound(Address),

    // =========================================================================
    // INPUT
    // =========================================================================
    #[error("Zero address is not a valid owner or target")]
    ZeroAddress,

    #[error("Owner {0} is listed twice")]
    DuplicateOwner(Address),

    /// Threshold outside `1..=owners`.
    #[error("Invalid threshold {threshold} for {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },

    // =========================================================================
    // NOT FOUND / EXECUTION
    // =========================================================================
    #[error("Unknown transaction {0}")]
    UnknownTransaction(u64),

    /// The target rejected the call; the whole operation was rolled back.
    #[error("Transaction {id} execution failed: {source}")]
    ExecutionFailed {
        id: u64,
        #[source]
        source: CallError,
    },
}

impl MultisigError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } | Self::NotSelfCall { .. } => ErrorKind::Authorization,
            Self::InvalidNonce { .. } | Self::AlreadyExecuted { .. } => ErrorKind::Replay,
            Self::TransactionExecuted { .. }
            | Self::AlreadyConfirmed { .. }
            | Self::NotConfirmed { .. }
            | Self::ThresholdNotMet { .. }
            | Self::OwnerNotFound(_) => ErrorKind::State,
            Self::ZeroAddress | Self::DuplicateOwner(_) | Self::InvalidThreshold { .. } => {
                ErrorKind::Input
            }
            Self::UnknownTransaction(_) => ErrorKind::NotFound,
            Self::ExecutionFailed { source, .. } => source.kind(),
        }
    }
}
