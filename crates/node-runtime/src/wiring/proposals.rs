//! Payload helpers for timelocked ledger changes.
//!
//! A privileged ledger change travels as three nested payloads: the
//! `LedgerCall` itself, wrapped in a queue `Schedule` call, wrapped in an
//! executor proposal. Execution later needs a matching queue `Execute` call.

use rc_01_ledger::LedgerCall;
use rc_02_scheduled_operations::{hash_operation, OperationCall, TimelockCall};
use shared_types::{Address, CallError, Hash};

/// Everything needed to schedule, execute or cancel one ledger call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelockedLedgerCall {
    /// Operation id inside the queue.
    pub id: Hash,
    pub operation: OperationCall,
    /// Queue payload scheduling the operation.
    pub schedule: Vec<u8>,
    /// Queue payload executing the operation.
    pub execute: Vec<u8>,
    /// Queue payload cancelling the operation.
    pub cancel: Vec<u8>,
}

impl TimelockedLedgerCall {
    /// # Errors
    ///
    /// - `MalformedPayload` if any payload fails to encode
    pub fn new(
        ledger: Address,
        call: &LedgerCall,
        predecessor: Hash,
        salt: Hash,
        delay: u64,
    ) -> Result<Self, CallError> {
        let operation = OperationCall::new(ledger, 0, call.encode()?);
        let id = hash_operation(&operation, &predecessor, &salt);
        Ok(Self {
            id,
            schedule: TimelockCall::Schedule {
                call: operation.clone(),
                predecessor,
                salt,
                delay,
            }
            .encode()?,
            execute: TimelockCall::Execute { id }.encode()?,
            cancel: TimelockCall::Cancel { id }.encode()?,
            operation,
        })
    }
}
