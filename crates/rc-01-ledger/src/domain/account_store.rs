//! Account store: identifier → (balance, backing).
//!
//! Owned exclusively by the [`BackingInvariantEngine`](super::engine::BackingInvariantEngine);
//! writes are crate-private so no other component can bypass the invariant.

use super::entities::Account;
use shared_types::{Address, Amount};
use std::collections::BTreeMap;

/// Ordered map of accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountStore {
    accounts: BTreeMap<Address, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the account, or an empty one if it was never credited.
    pub fn get(&self, address: &Address) -> Account {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    /// Returns true if the address was ever credited.
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.get(address).balance
    }

    pub fn backing_of(&self, address: &Address) -> Amount {
        self.get(address).backing
    }

    /// Number of accounts ever credited.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.accounts.values().filter(|a| a.balance > 0).count()
    }

    /// Iterates accounts in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }

    /// Sums of balances and backing across all accounts, `None` on overflow.
    pub fn sums(&self) -> Option<(Amount, Amount)> {
        self.accounts
            .values()
            .try_fold((0u128, 0u128), |(supply, backing), account| {
                Some((
                    supply.checked_add(account.balance)?,
                    backing.checked_add(account.backing)?,
                ))
            })
    }

    pub(crate) fn put(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }
}

impl FromIterator<(Address, Account)> for AccountStore {
    fn from_iter<T: IntoIterator<Item = (Address, Account)>>(iter: T) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}
