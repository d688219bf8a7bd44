//! Owner-management payloads.
//!
//! These are only honoured when the executor calls itself, i.e. as the
//! payload of one of its own executed proposals.

use serde::{Deserialize, Serialize};
use shared_types::{Address, CallError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultisigCall {
    AddOwner { owner: Address },
    RemoveOwner { owner: Address },
    ChangeThreshold { threshold: usize },
}

impl MultisigCall {
    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>, CallError> {
        bincode::serialize(self).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }

    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if the bytes are not a `MultisigCall`
    pub fn decode(payload: &[u8]) -> Result<Self, CallError> {
        bincode::deserialize(payload).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }
}
