//! Domain invariants for the Backed Ledger
//!
//! - INVARIANT-1: Aggregate backing equals aggregate supply
//! - INVARIANT-2: Totals equal the sums over all accounts
//! - INVARIANT-3: A full burn leaves no residual backing on the account
//! - INVARIANT-4: Every account is backed exactly 1:1

use super::account_store::AccountStore;
use super::entities::{Account, SupplyTotals};
use super::errors::LedgerError;

/// INVARIANT-1: `total_supply == total_backing`.
pub fn invariant_supply_equals_backing(totals: &SupplyTotals) -> bool {
    totals.total_supply == totals.total_backing
}

/// INVARIANT-2: recorded totals equal the per-account sums.
///
/// O(accounts); used on snapshot restore and in tests, not on every mutation.
pub fn invariant_totals_match_accounts(store: &AccountStore, totals: &SupplyTotals) -> bool {
    store.sums() == Some((totals.total_supply, totals.total_backing))
}

/// INVARIANT-3: an account with zero balance carries zero backing.
pub fn invariant_no_dust(account: &Account) -> bool {
    account.balance != 0 || account.backing == 0
}

/// INVARIANT-4: an account's backing equals its balance.
///
/// Strict 1:1 minting establishes it and the proportional burn and transfer
/// splits preserve it exactly. A skewed account would make a partial burn
/// round more backing away than supply.
pub fn invariant_account_fully_backed(account: &Account) -> bool {
    account.backing == account.balance
}

/// Checks INVARIANT-1, returning the mismatch as an error.
///
/// # Errors
///
/// - `LedgerError::SupplyBackingMismatch` if the totals differ
pub fn ensure_supply_equals_backing(totals: &SupplyTotals) -> Result<(), LedgerError> {
    if invariant_supply_equals_backing(totals) {
        Ok(())
    } else {
        Err(LedgerError::SupplyBackingMismatch {
            total_supply: totals.total_supply,
            total_backing: totals.total_backing,
        })
    }
}

/// Checks all invariants over a full store.
///
/// # Errors
///
/// - `LedgerError::SupplyBackingMismatch` if INVARIANT-1 fails
/// - `LedgerError::InconsistentSnapshot` if INVARIANT-2, 3 or 4 fails
pub fn check_all_invariants(store: &AccountStore, totals: &SupplyTotals) -> Result<(), LedgerError> {
    ensure_supply_equals_backing(totals)?;

    if !invariant_totals_match_accounts(store, totals) {
        return Err(LedgerError::InconsistentSnapshot(format!(
            "totals {}/{} do not match account sums",
            totals.total_supply, totals.total_backing
        )));
    }

    if let Some((address, _)) = store.iter().find(|(_, account)| !invariant_no_dust(account)) {
        return Err(LedgerError::InconsistentSnapshot(format!(
            "account {address} holds backing without balance"
        )));
    }

    if let Some((address, account)) = store
        .iter()
        .find(|(_, account)| !invariant_account_fully_backed(account))
    {
        return Err(LedgerError::InconsistentSnapshot(format!(
            "account {address} holds {} backing for a balance of {}",
            account.backing, account.balance
        )));
    }

    Ok(())
}
