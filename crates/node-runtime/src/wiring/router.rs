//! # Call Router
//!
//! Resolves a target address to the engine living there.
//!
//! ```text
//! Multisig ──call──→ CallRouter ──ledger address──→ ReserveLedgerService
//!                        │
//!                        └──timelock address──→ ScheduledOperationQueue
//!                                                   │ (executes with a
//!                                                   ↓  ledger-only router)
//!                                               ReserveLedgerService
//! ```
//!
//! The router borrows the engines it routes to for the duration of one call,
//! so an engine is never reachable from inside its own call.

use rc_01_ledger::ReserveLedgerService;
use rc_02_scheduled_operations::ScheduledOperationQueue;
use shared_types::{Address, Amount, CallError, CallTarget};
use tracing::debug;

/// Routes calls to the ledger and, optionally, the queue.
pub struct CallRouter<'a> {
    ledger: &'a mut ReserveLedgerService,
    timelock: Option<&'a mut ScheduledOperationQueue>,
}

impl<'a> CallRouter<'a> {
    /// Routes to both the ledger and the queue.
    pub fn new(
        ledger: &'a mut ReserveLedgerService,
        timelock: &'a mut ScheduledOperationQueue,
    ) -> Self {
        Self {
            ledger,
            timelock: Some(timelock),
        }
    }

    /// Routes to the ledger only.
    pub fn ledger_only(ledger: &'a mut ReserveLedgerService) -> Self {
        Self {
            ledger,
            timelock: None,
        }
    }
}

impl CallTarget for CallRouter<'_> {
    fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: &[u8],
    ) -> Result<Vec<u8>, CallError> {
        if target == self.ledger.address() {
            debug!(caller = %caller, target = %target, "Routing call to ledger");
            return self.ledger.call(caller, target, value, payload);
        }

        match self.timelock.as_deref_mut() {
            Some(timelock) if target == timelock.address() => {
                debug!(caller = %caller, target = %target, "Routing call to queue");
                let mut downstream = CallRouter::ledger_only(&mut *self.ledger);
                timelock.handle_call(caller, value, payload, &mut downstream)
            }
            _ => Err(CallError::UnknownTarget(target)),
        }
    }
}
