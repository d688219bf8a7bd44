//! Core entities for the Multi-Party Executor

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, Hash, HashBuilder};
use std::collections::BTreeSet;

/// Domain separator of transaction hashes.
const TRANSACTION_DOMAIN: &[u8] = b"reserve-chain/multisig-transaction/v1";

/// A submitted proposal.
///
/// Lifecycle: Proposed → (partially) Confirmed → Executed (terminal).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigTransaction {
    pub id: u64,
    pub target: Address,
    pub value: Amount,
    pub payload: Vec<u8>,
    /// Engine nonce at submission.
    pub nonce: u64,
    pub tx_hash: Hash,
    /// Every owner that confirmed, including since-removed owners.
    pub confirmations: BTreeSet<Address>,
    pub executed: bool,
    pub submitter: Address,
}

/// Deterministic hash of a proposal, bound to the executing engine.
pub fn transaction_hash(
    engine: &Address,
    target: &Address,
    value: Amount,
    payload: &[u8],
    nonce: u64,
) -> Hash {
    HashBuilder::new(TRANSACTION_DOMAIN)
        .address(engine)
        .address(target)
        .amount(value)
        .bytes(payload)
        .u64(nonce)
        .finish()
}
