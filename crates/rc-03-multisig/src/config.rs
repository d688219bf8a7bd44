//! Configuration for the Multi-Party Executor

use crate::domain::MultisigError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;

/// Default number of confirmations required.
pub const DEFAULT_THRESHOLD: usize = 2;

/// Executor configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigConfig {
    /// Initial owners
    pub owners: Vec<Address>,
    /// Confirmations required to execute
    pub threshold: usize,
}

impl MultisigConfig {
    pub fn new(owners: Vec<Address>, threshold: usize) -> Self {
        Self { owners, threshold }
    }

    /// Checks the owner set and threshold.
    ///
    /// # Errors
    ///
    /// - `ZeroAddress` if an owner is the zero address
    /// - `DuplicateOwner` if an owner is listed twice
    /// - `InvalidThreshold` unless `1 <= threshold <= owners`
    pub fn validate(&self) -> Result<(), MultisigError> {
        let mut seen = BTreeSet::new();
        for owner in &self.owners {
            if owner.is_zero() {
                return Err(MultisigError::ZeroAddress);
            }
            if !seen.insert(*owner) {
                return Err(MultisigError::DuplicateOwner(*owner));
            }
        }
        if self.threshold == 0 || self.threshold > self.owners.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold: self.threshold,
                owners: self.owners.len(),
            });
        }
        Ok(())
    }
}

impl Default for MultisigConfig {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
