//! Core entities for the Backed Ledger

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, Hash};

/// Balance and backing held by one identifier.
///
/// Created implicitly on first credit; never destroyed (may return to zero).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Units held.
    pub balance: Amount,
    /// Declared backing value attributed to those units.
    pub backing: Amount,
}

impl Account {
    /// Creates an account with the given balance and backing.
    pub fn new(balance: Amount, backing: Amount) -> Self {
        Self { balance, backing }
    }

    /// Returns true if the account holds neither units nor backing.
    pub fn is_empty(&self) -> bool {
        self.balance == 0 && self.backing == 0
    }
}

/// Aggregate supply and backing.
///
/// `total_supply == total_backing` after every committed mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyTotals {
    pub total_supply: Amount,
    pub total_backing: Amount,
}

/// Global switches of the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFlags {
    /// Blocks every balance-mutating operation.
    pub paused: bool,
    /// Allows ordinary holder-to-holder transfers.
    pub transfers_enabled: bool,
}

/// Reserve figure attested by an external party.
///
/// Informational only: it never feeds into `total_backing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestedReserve {
    /// Attested reserve amount, in ledger scale.
    pub amount: Amount,
    /// Hash of the attestation document.
    pub reference: Hash,
    /// Who recorded it.
    pub recorded_by: Address,
}

/// Result of a committed mint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    pub to: Address,
    pub amount: Amount,
    pub backing: Amount,
}

/// Result of a committed burn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurnReceipt {
    pub from: Address,
    pub amount: Amount,
    /// Backing removed alongside the burned units.
    pub backing_removed: Amount,
}

/// Result of a committed transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    /// Backing moved alongside the units.
    pub backing_moved: Amount,
}

/// A single allowance, as stored in snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    pub owner: Address,
    pub spender: Address,
    pub amount: Amount,
}
