//! # Hashing
//!
//! Keccak-256 helpers. Every derived identifier (multisig transaction hash,
//! scheduled operation id) is built with a [`HashBuilder`] seeded with its own
//! domain tag, so identifiers of different kinds can never collide.

use crate::entities::{Address, Amount, Hash};
use sha3::{Digest, Keccak256};

/// Computes Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash(hasher.finalize().into())
}

/// Incremental, domain-separated Keccak-256 builder.
///
/// Fixed-width fields are written as-is; variable-length fields are length
/// prefixed so that adjacent fields cannot be re-split into a different tuple.
pub struct HashBuilder {
    hasher: Keccak256,
}

impl HashBuilder {
    /// Starts a hash in the given domain.
    #[must_use]
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update((domain.len() as u64).to_be_bytes());
        hasher.update(domain);
        Self { hasher }
    }

    /// Appends a 20-byte address.
    #[must_use]
    pub fn address(mut self, address: &Address) -> Self {
        self.hasher.update(address.as_bytes());
        self
    }

    /// Appends an amount as 16 big-endian bytes.
    #[must_use]
    pub fn amount(mut self, amount: Amount) -> Self {
        self.hasher.update(amount.to_be_bytes());
        self
    }

    /// Appends a u64 as 8 big-endian bytes.
    #[must_use]
    pub fn u64(mut self, value: u64) -> Self {
        self.hasher.update(value.to_be_bytes());
        self
    }

    /// Appends a 32-byte hash.
    #[must_use]
    pub fn hash(mut self, hash: &Hash) -> Self {
        self.hasher.update(hash.as_bytes());
        self
    }

    /// Appends a length-prefixed byte string.
    #[must_use]
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.hasher.update((data.len() as u64).to_be_bytes());
        self.hasher.update(data);
        self
    }

    /// Finalizes the digest.
    #[must_use]
    pub fn finish(self) -> Hash {
        Hash(self.hasher.finalize().into())
    }
}
