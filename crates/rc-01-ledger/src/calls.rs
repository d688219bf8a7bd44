//! Governance payloads for the ledger.
//!
//! Engines that call into the ledger (the scheduled-operation queue, the
//! multi-party executor) carry a bincode-encoded [`LedgerCall`] as their
//! opaque payload.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, CallError, Hash, LedgerRole};

/// One ledger operation, minus the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCall {
    Mint {
        to: Address,
        amount: Amount,
        backing: Amount,
    },
    Burn {
        from: Address,
        amount: Amount,
    },
    Transfer {
        to: Address,
        amount: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approve {
        spender: Address,
        amount: Amount,
    },
    UpdateWhitelist {
        account: Address,
        whitelisted: bool,
    },
    BatchUpdateWhitelist {
        accounts: Vec<Address>,
        whitelisted: bool,
    },
    SetTransfersEnabled {
        enabled: bool,
    },
    Pause,
    Unpause,
    GrantRole {
        role: LedgerRole,
        account: Address,
    },
    RevokeRole {
        role: LedgerRole,
        account: Address,
    },
    RenounceRole {
        role: LedgerRole,
    },
    AttestReserve {
        amount: Amount,
        reference: Hash,
    },
    AuthorizeUpgrade {
        to_version: u32,
    },
}

impl LedgerCall {
    /// Encodes the call as a payload.
    ///
    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>, CallError> {
        bincode::serialize(self).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }

    /// Decodes a payload produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if the bytes are not a `LedgerCall`
    pub fn decode(payload: &[u8]) -> Result<Self, CallError> {
        bincode::deserialize(payload).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Approve { .. } => "approve",
            Self::UpdateWhitelist { .. } => "update_whitelist",
            Self::BatchUpdateWhitelist { .. } => "batch_update_whitelist",
            Self::SetTransfersEnabled { .. } => "set_transfers_enabled",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::GrantRole { .. } => "grant_role",
            Self::RevokeRole { .. } => "revoke_role",
            Self::RenounceRole { .. } => "renounce_role",
            Self::AttestReserve { .. } => "attest_reserve",
            Self::AuthorizeUpgrade { .. } => "authorize_upgrade",
        }
    }
}
