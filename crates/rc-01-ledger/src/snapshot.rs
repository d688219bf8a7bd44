//! Versioned ledger snapshots and state migrations.
//!
//! ## Versions
//!
//! | Version | Layout change |
//! |---------|---------------|
//! | 1 | accounts, whitelist, roles, flags, allowances |
//! | 2 | adds stored totals and the attested reserve |
//!
//! A snapshot older than [`STATE_VERSION`] is only accepted if its ledger had
//! authorized an upgrade to at least this version before it was exported.

use crate::domain::{
    Account, AccountStore, AllowanceEntry, AttestedReserve, LedgerError, LedgerFlags,
    SupplyTotals,
};
use serde::{Deserialize, Serialize};
use shared_types::{Address, LedgerRole, RoleTable};
use tracing::info;

/// Layout version written by this release.
pub const STATE_VERSION: u32 = 2;

/// Full exported ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Layout version of this snapshot.
    pub version: u32,
    /// Highest layout version the exporting ledger authorized.
    #[serde(default)]
    pub authorized_version: u32,
    pub accounts: Vec<(Address, Account)>,
    /// Absent before version 2.
    #[serde(default)]
    pub totals: Option<SupplyTotals>,
    pub whitelist: Vec<Address>,
    pub roles: RoleTable<LedgerRole>,
    pub flags: LedgerFlags,
    #[serde(default)]
    pub allowances: Vec<AllowanceEntry>,
    /// Absent before version 2.
    #[serde(default)]
    pub attested_reserve: Option<AttestedReserve>,
}

impl LedgerSnapshot {
    /// Parses a JSON snapshot.
    ///
    /// # Errors
    ///
    /// - `InconsistentSnapshot` if the JSON does not describe a snapshot
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| LedgerError::InconsistentSnapshot(e.to_string()))
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// - `InconsistentSnapshot` if serialization fails
    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::InconsistentSnapshot(e.to_string()))
    }

    /// Account store rebuilt from the account list.
    pub fn account_store(&self) -> AccountStore {
        self.accounts.iter().copied().collect()
    }
}

/// Upgrades a snapshot to [`STATE_VERSION`].
///
/// Does not check the ledger invariants; the restoring service does that on
/// the migrated result.
///
/// # Errors
///
/// - `UnsupportedVersion` for version 0 or versions newer than this release
/// - `InvalidUpgrade` if an older snapshot never authorized this version
/// - `InconsistentSnapshot` if a current-version snapshot lacks its totals, or
///   if the account sums overflow
pub fn migrate(mut snapshot: LedgerSnapshot) -> Result<LedgerSnapshot, LedgerError> {
    if snapshot.version == 0 || snapshot.version > STATE_VERSION {
        return Err(LedgerError::UnsupportedVersion {
            version: snapshot.version,
            latest: STATE_VERSION,
        });
    }

    if snapshot.version < STATE_VERSION
        && snapshot.authorized_version.max(snapshot.version) < STATE_VERSION
    {
        return Err(LedgerError::InvalidUpgrade {
            current: snapshot.version,
            requested: STATE_VERSION,
        });
    }

    while snapshot.version < STATE_VERSION {
        snapshot = match snapshot.version {
            1 => migrate_v1_to_v2(snapshot)?,
            version => {
                return Err(LedgerError::UnsupportedVersion {
                    version,
                    latest: STATE_VERSION,
                })
            }
        };
    }

    if snapshot.totals.is_none() {
        return Err(LedgerError::InconsistentSnapshot(
            "version 2 snapshot without totals".to_string(),
        ));
    }
    snapshot.authorized_version = snapshot.authorized_version.max(snapshot.version);
    Ok(snapshot)
}

fn migrate_v1_to_v2(mut snapshot: LedgerSnapshot) -> Result<LedgerSnapshot, LedgerError> {
    let (total_supply, total_backing) = snapshot.account_store().sums().ok_or_else(|| {
        LedgerError::InconsistentSnapshot("account sums overflow".to_string())
    })?;

    snapshot.totals = Some(SupplyTotals {
        total_supply,
        total_backing,
    });
    snapshot.version = 2;

    info!(
        accounts = snapshot.accounts.len(),
        total_supply, "Migrated ledger snapshot v1 -> v2"
    );
    Ok(snapshot)
}
