//! Inbound Ports (Driving Ports / API)

use crate::domain::{BurnReceipt, LedgerError, MintReceipt, TransferReceipt};
use shared_types::{Address, Amount, Hash, LedgerRole};

/// Mutating ledger API.
///
/// Every method takes the caller explicitly and is all-or-nothing: an `Err`
/// leaves the ledger unchanged (apart from compliance-violation audit events).
pub trait BackedLedgerApi {
    /// Mints `amount` units backed by `backing` to `to`. Requires MINTER.
    fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        backing: Amount,
    ) -> Result<MintReceipt, LedgerError>;

    /// Burns `amount` units from `from`. Requires BURNER.
    fn burn(&mut self, caller: Address, from: Address, amount: Amount)
        -> Result<BurnReceipt, LedgerError>;

    /// Moves `amount` of the caller's units to `to`.
    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Moves `amount` of `from`'s units to `to` against the caller's allowance.
    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Sets the caller's allowance for `spender`.
    fn approve(&mut self, caller: Address, spender: Address, amount: Amount)
        -> Result<(), LedgerError>;

    /// Adds or removes one whitelist entry. Returns true if it changed.
    fn update_whitelist(
        &mut self,
        caller: Address,
        account: Address,
        whitelisted: bool,
    ) -> Result<bool, LedgerError>;

    /// Sets many whitelist entries at once. Returns how many changed.
    fn batch_update_whitelist(
        &mut self,
        caller: Address,
        accounts: &[Address],
        whitelisted: bool,
    ) -> Result<usize, LedgerError>;

    fn set_transfers_enabled(&mut self, caller: Address, enabled: bool)
        -> Result<(), LedgerError>;

    fn pause(&mut self, caller: Address) -> Result<(), LedgerError>;

    fn unpause(&mut self, caller: Address) -> Result<(), LedgerError>;

    /// Returns false (and emits nothing) if `account` already held `role`.
    fn grant_role(
        &mut self,
        caller: Address,
        role: LedgerRole,
        account: Address,
    ) -> Result<bool, LedgerError>;

    /// Returns false (and emits nothing) if `account` did not hold `role`.
    fn revoke_role(
        &mut self,
        caller: Address,
        role: LedgerRole,
        account: Address,
    ) -> Result<bool, LedgerError>;

    /// Drops one of the caller's own roles.
    fn renounce_role(&mut self, caller: Address, role: LedgerRole) -> Result<bool, LedgerError>;

    /// Records an externally attested reserve figure.
    fn attest_reserve(
        &mut self,
        caller: Address,
        amount: Amount,
        reference: Hash,
    ) -> Result<(), LedgerError>;

    /// Authorizes migration of this ledger's state to `to_version`.
    fn authorize_upgrade(&mut self, caller: Address, to_version: u32) -> Result<(), LedgerError>;
}

/// Read-only ledger queries. Never fail.
pub trait LedgerQueries {
    fn name(&self) -> &str;
    fn symbol(&self) -> &str;
    fn decimals(&self) -> u8;
    fn balance_of(&self, account: &Address) -> Amount;
    fn backing_of(&self, account: &Address) -> Amount;
    fn total_supply(&self) -> Amount;
    fn total_backing(&self) -> Amount;
    /// Backing per whole unit, scaled by [`shared_types::SCALE`].
    fn backing_per_unit(&self) -> Amount;
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;
    fn is_whitelisted(&self, account: &Address) -> bool;
    fn has_role(&self, role: LedgerRole, account: &Address) -> bool;
    fn is_paused(&self) -> bool;
    fn transfers_enabled(&self) -> bool;
}
