//! Whitelist registry: identifiers permitted to hold or receive value.

use super::errors::LedgerError;
use shared_types::Address;
use std::collections::BTreeSet;

/// Set of whitelisted identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WhitelistRegistry {
    members: BTreeSet<Address>,
}

impl WhitelistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    /// Sets one entry. Returns true if membership changed.
    ///
    /// # Errors
    ///
    /// - `ZeroAddress` if `account` is the zero address
    pub fn set(&mut self, account: Address, whitelisted: bool) -> Result<bool, LedgerError> {
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(self.apply(account, whitelisted))
    }

    /// Sets every entry of `accounts` to the same status.
    ///
    /// The whole batch is validated before any entry is written. Returns the
    /// accounts whose membership actually changed, in input order.
    ///
    /// # Errors
    ///
    /// - `EmptyBatch` if `accounts` is empty
    /// - `BatchTooLarge` if `accounts.len() > max`
    /// - `ZeroAddress` if any entry is the zero address
    pub fn set_batch(
        &mut self,
        accounts: &[Address],
        whitelisted: bool,
        max: usize,
    ) -> Result<Vec<Address>, LedgerError> {
        if accounts.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        if accounts.len() > max {
            return Err(LedgerError::BatchTooLarge {
                size: accounts.len(),
                max,
            });
        }
        if accounts.iter().any(Address::is_zero) {
            return Err(LedgerError::ZeroAddress);
        }

        Ok(accounts
            .iter()
            .filter(|account| self.apply(**account, whitelisted))
            .copied()
            .collect())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    fn apply(&mut self, account: Address, whitelisted: bool) -> bool {
        if whitelisted {
            self.members.insert(account)
        } else {
            self.members.remove(&account)
        }
    }
}

impl FromIterator<Address> for WhitelistRegistry {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
