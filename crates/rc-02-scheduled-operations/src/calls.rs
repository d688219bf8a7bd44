//! Payloads accepted by the queue through [`ScheduledOperationQueue::handle_call`].
//!
//! [`ScheduledOperationQueue::handle_call`]: crate::ScheduledOperationQueue::handle_call

use crate::domain::OperationCall;
use serde::{Deserialize, Serialize};
use shared_types::{Address, CallError, Hash, TimelockRole};

/// One queue operation, minus the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockCall {
    Schedule {
        call: OperationCall,
        predecessor: Hash,
        salt: Hash,
        delay: u64,
    },
    Execute {
        id: Hash,
    },
    Cancel {
        id: Hash,
    },
    /// Only accepted from the queue itself.
    UpdateDelay {
        new_delay: u64,
    },
    GrantRole {
        role: TimelockRole,
        account: Address,
    },
    RevokeRole {
        role: TimelockRole,
        account: Address,
    },
    RenounceRole {
        role: TimelockRole,
    },
}

impl TimelockCall {
    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if serialization fails
    pub fn encode(&self) -> Result<Vec<u8>, CallError> {
        bincode::serialize(self).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }

    /// # Errors
    ///
    /// - `CallError::MalformedPayload` if the bytes are not a `TimelockCall`
    pub fn decode(payload: &[u8]) -> Result<Self, CallError> {
        bincode::deserialize(payload).map_err(|e| CallError::MalformedPayload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_operation_payload() {
        let call = TimelockCall::Schedule {
            call: OperationCall::new(Address::from_low_u64_be(1), 0, vec![1, 2, 3]),
            predecessor: Hash::ZERO,
            salt: Hash::new([9; 32]),
            delay: 172_800,
        };
        assert_eq!(TimelockCall::decode(&call.encode().unwrap()).unwrap(), call);
        assert!(TimelockCall::decode(&[0xff; 3]).is_err());
    }
}
