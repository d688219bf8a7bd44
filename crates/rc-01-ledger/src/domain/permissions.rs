//! Permission table: which role each ledger operation requires.
//!
//! Exhaustive matches make adding an operation without classifying it a
//! compile error.

use shared_types::LedgerRole;
use std::fmt;

/// Every state-changing ledger operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerOperation {
    Mint,
    Burn,
    Transfer,
    TransferFrom,
    Approve,
    UpdateWhitelist,
    SetTransfersEnabled,
    Pause,
    Unpause,
    GrantRole,
    RevokeRole,
    RenounceRole,
    AttestReserve,
    AuthorizeUpgrade,
}

impl LedgerOperation {
    /// Role the caller must hold, or `None` for holder-initiated operations.
    #[must_use]
    pub fn required_role(self) -> Option<LedgerRole> {
        match self {
            Self::Mint => Some(LedgerRole::Minter),
            Self::Burn => Some(LedgerRole::Burner),
            Self::UpdateWhitelist => Some(LedgerRole::WhitelistManager),
            Self::SetTransfersEnabled | Self::AttestReserve => Some(LedgerRole::ComplianceOfficer),
            Self::Pause | Self::Unpause => Some(LedgerRole::Pauser),
            Self::GrantRole | Self::RevokeRole => Some(LedgerRole::Admin),
            Self::AuthorizeUpgrade => Some(LedgerRole::Upgrader),
            Self::Transfer | Self::TransferFrom | Self::Approve | Self::RenounceRole => None,
        }
    }

    /// True if the operation moves balances and is therefore blocked by pause.
    #[must_use]
    pub fn mutates_balances(self) -> bool {
        match self {
            Self::Mint | Self::Burn | Self::Transfer | Self::TransferFrom => true,
            Self::Approve
            | Self::UpdateWhitelist
            | Self::SetTransfersEnabled
            | Self::Pause
            | Self::Unpause
            | Self::GrantRole
            | Self::RevokeRole
            | Self::RenounceRole
            | Self::AttestReserve
            | Self::AuthorizeUpgrade => false,
        }
    }

    /// Name used in logs and compliance-violation records.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Transfer => "transfer",
            Self::TransferFrom => "transfer_from",
            Self::Approve => "approve",
            Self::UpdateWhitelist => "update_whitelist",
            Self::SetTransfersEnabled => "set_transfers_enabled",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::GrantRole => "grant_role",
            Self::RevokeRole => "revoke_role",
            Self::RenounceRole => "renounce_role",
            Self::AttestReserve => "attest_reserve",
            Self::AuthorizeUpgrade => "authorize_upgrade",
        }
    }
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
