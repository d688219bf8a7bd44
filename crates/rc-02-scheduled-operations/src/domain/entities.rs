//! Core entities for the Scheduled Operation Queue

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, Hash, HashBuilder, Timestamp};
use std::fmt;

/// Domain separator of operation ids.
const OPERATION_DOMAIN: &[u8] = b"reserve-chain/scheduled-operation/v1";

/// Lifecycle of a scheduled operation.
///
/// ```text
/// Unset ──schedule──→ Scheduled ──execute──→ Executed
///                         │
///                         └──cancel──→ Cancelled
/// ```
///
/// Executed and Cancelled are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    Unset,
    Scheduled,
    Executed,
    Cancelled,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::Scheduled => "scheduled",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// The call an operation performs when executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCall {
    pub target: Address,
    pub value: Amount,
    pub payload: Vec<u8>,
}

impl OperationCall {
    pub fn new(target: Address, value: Amount, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }
}

/// A stored operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    pub id: Hash,
    pub call: OperationCall,
    /// Operation that must be executed first; `Hash::ZERO` for none.
    pub predecessor: Hash,
    pub salt: Hash,
    pub ready_at: Timestamp,
    pub state: OperationState,
    pub scheduled_by: Address,
}

impl ScheduledOperation {
    /// True if scheduled and `now` has reached the ready timestamp.
    pub fn is_ready_at(&self, now: Timestamp) -> bool {
        self.state == OperationState::Scheduled && now >= self.ready_at
    }

    pub fn has_predecessor(&self) -> bool {
        !self.predecessor.is_zero()
    }
}

/// Deterministic id of an operation.
///
/// Identical (call, predecessor, salt) tuples collide, so a duplicate
/// proposal is rejected instead of creating a parallel entry.
pub fn hash_operation(call: &OperationCall, predecessor: &Hash, salt: &Hash) -> Hash {
    HashBuilder::new(OPERATION_DOMAIN)
        .address(&call.target)
        .amount(call.value)
        .bytes(&call.payload)
        .hash(predecessor)
        .hash(salt)
        .finish()
}
