//! Backing invariant engine.
//!
//! Mint, burn and transfer with proportional backing bookkeeping. Each
//! operation computes every new value first, checks the invariant on the
//! projected totals, and only then writes; an error therefore leaves the
//! store and totals untouched.
//!
//! ## Rounding policy
//!
//! | Operation | Partial split | Full balance |
//! |-----------|---------------|--------------|
//! | burn      | ceil          | all backing  |
//! | transfer  | floor         | all backing  |
//!
//! Minting is strict 1:1 (`amount == backing`), so every account's backing
//! equals its balance and both splits are exact in practice.

use super::account_store::AccountStore;
use super::entities::{Account, BurnReceipt, MintReceipt, SupplyTotals, TransferReceipt};
use super::errors::LedgerError;
use super::invariants::{check_all_invariants, ensure_supply_equals_backing};
use super::math::{mul_div, proportional_backing, Rounding};
use shared_types::{Address, Amount, SCALE};

/// Owner of the account store and the global totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackingInvariantEngine {
    store: AccountStore,
    totals: SupplyTotals,
}

impl BackingInvariantEngine {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an engine from restored parts, checking every invariant.
    ///
    /// # Errors
    ///
    /// Any invariant failure of [`check_all_invariants`].
    pub fn from_parts(store: AccountStore, totals: SupplyTotals) -> Result<Self, LedgerError> {
        check_all_invariants(&store, &totals)?;
        Ok(Self { store, totals })
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Credits `amount` units and `backing` value to `to`.
    ///
    /// # Errors
    ///
    /// - `InvalidBacking` if `backing == 0`
    /// - `InvariantMismatch` if `amount != backing`
    /// - `Overflow` if a balance or total would overflow
    pub fn mint(
        &mut self,
        to: Address,
        amount: Amount,
        backing: Amount,
    ) -> Result<MintReceipt, LedgerError> {
        if backing == 0 {
            return Err(LedgerError::InvalidBacking);
        }
        if amount != backing {
            return Err(LedgerError::InvariantMismatch { amount, backing });
        }

        let account = self.store.get(&to);
        let credited = Account {
            balance: add(account.balance, amount, "mint balance")?,
            backing: add(account.backing, backing, "mint backing")?,
        };
        let totals = SupplyTotals {
            total_supply: add(self.totals.total_supply, amount, "total supply")?,
            total_backing: add(self.totals.total_backing, backing, "total backing")?,
        };
        ensure_supply_equals_backing(&totals)?;

        self.store.put(to, credited);
        self.totals = totals;

        Ok(MintReceipt {
            to,
            amount,
            backing,
        })
    }

    /// Debits `amount` units from `from` with their proportional backing.
    ///
    /// # Errors
    ///
    /// - `ZeroAmount` if `amount == 0`
    /// - `InsufficientBalance` if `amount > balance`
    /// - `SupplyBackingMismatch` if the removal would break the invariant
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<BurnReceipt, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let account = self.store.get(&from);
        ensure_balance(from, &account, amount)?;

        // Round up: the ledger must never keep more backing than supply.
        let backing_removed =
            proportional_backing(account.backing, amount, account.balance, Rounding::Ceil)?;

        let debited = Account {
            balance: account.balance - amount,
            backing: account.backing - backing_removed,
        };
        let totals = SupplyTotals {
            total_supply: sub(self.totals.total_supply, amount, "total supply")?,
            total_backing: sub(self.totals.total_backing, backing_removed, "total backing")?,
        };
        ensure_supply_equals_backing(&totals)?;

        self.store.put(from, debited);
        self.totals = totals;

        Ok(BurnReceipt {
            from,
            amount,
            backing_removed,
        })
    }

    /// Moves `amount` units and their proportional backing from `from` to `to`.
    ///
    /// A self-transfer validates the balance and changes nothing.
    ///
    /// # Errors
    ///
    /// - `ZeroAmount` if `amount == 0`
    /// - `InsufficientBalance` if `amount > balance`
    /// - `Overflow` if the recipient's balance would overflow
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let sender = self.store.get(&from);
        ensure_balance(from, &sender, amount)?;

        let backing_moved =
            proportional_backing(sender.backing, amount, sender.balance, Rounding::Floor)?;

        if from != to {
            let recipient = self.store.get(&to);
            let debited = Account {
                balance: sender.balance - amount,
                backing: sender.backing - backing_moved,
            };
            let credited = Account {
                balance: add(recipient.balance, amount, "transfer balance")?,
                backing: add(recipient.backing, backing_moved, "transfer backing")?,
            };
            self.store.put(from, debited);
            self.store.put(to, credited);
        }

        // Totals are untouched by a transfer; this is a sanity check.
        ensure_supply_equals_backing(&self.totals)?;

        Ok(TransferReceipt {
            from,
            to,
            amount,
            backing_moved,
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn total_supply(&self) -> Amount {
        self.totals.total_supply
    }

    pub fn total_backing(&self) -> Amount {
        self.totals.total_backing
    }

    pub fn totals(&self) -> SupplyTotals {
        self.totals
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.store.balance_of(address)
    }

    pub fn backing_of(&self, address: &Address) -> Amount {
        self.store.backing_of(address)
    }

    pub fn account(&self, address: &Address) -> Account {
        self.store.get(address)
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Backing value of one whole unit, in fixed-point scale.
    ///
    /// An empty ledger reports exactly one unit of backing per unit.
    pub fn backing_per_unit(&self) -> Amount {
        if self.totals.total_supply == 0 {
            return SCALE;
        }
        mul_div(
            self.totals.total_backing,
            SCALE,
            self.totals.total_supply,
            Rounding::Floor,
        )
        .unwrap_or(Amount::MAX)
    }

    /// Full O(accounts) re-validation of every invariant.
    ///
    /// # Errors
    ///
    /// Any invariant failure of [`check_all_invariants`].
    pub fn validate(&self) -> Result<(), LedgerError> {
        check_all_invariants(&self.store, &self.totals)
    }
}

fn ensure_balance(account: Address, state: &Account, required: Amount) -> Result<(), LedgerError> {
    if required > state.balance {
        return Err(LedgerError::InsufficientBalance {
            account,
            required,
            available: state.balance,
        });
    }
    Ok(())
}

fn add(a: Amount, b: Amount, context: &'static str) -> Result<Amount, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow { context })
}

fn sub(a: Amount, b: Amount, context: &'static str) -> Result<Amount, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Overflow { context })
}
