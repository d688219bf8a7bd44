//! # Governance Runtime
//!
//! Owns the three engines and the shared event bus, and hands the executor a
//! router whenever one of its proposals executes.

use crate::container::{DeploymentAddresses, NodeConfig};
use crate::wiring::CallRouter;
use rc_01_ledger::{LedgerError, LedgerQueries, ReserveLedgerService, STATE_VERSION};
use rc_02_scheduled_operations::{ScheduleError, ScheduledOperationQueue};
use rc_03_multisig::{MultiPartyExecutor, MultisigError};
use serde::Serialize;
use shared_bus::InMemoryEventBus;
use shared_types::{Address, Amount, Hash};
use std::sync::Arc;
use tracing::info;

/// The deployed governance stack.
pub struct GovernanceRuntime {
    config: NodeConfig,
    ledger: ReserveLedgerService,
    timelock: ScheduledOperationQueue,
    multisig: MultiPartyExecutor,
    events: Arc<InMemoryEventBus>,
}

impl GovernanceRuntime {
    pub(crate) fn from_parts(
        config: NodeConfig,
        ledger: ReserveLedgerService,
        timelock: ScheduledOperationQueue,
        multisig: MultiPartyExecutor,
        events: Arc<InMemoryEventBus>,
    ) -> Self {
        Self {
            config,
            ledger,
            timelock,
            multisig,
            events,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn addresses(&self) -> DeploymentAddresses {
        self.config.addresses
    }

    pub fn ledger(&self) -> &ReserveLedgerService {
        &self.ledger
    }

    /// Direct ledger access for operators and account holders.
    pub fn ledger_mut(&mut self) -> &mut ReserveLedgerService {
        &mut self.ledger
    }

    pub fn timelock(&self) -> &ScheduledOperationQueue {
        &self.timelock
    }

    pub fn multisig(&self) -> &MultiPartyExecutor {
        &self.multisig
    }

    pub fn events(&self) -> &Arc<InMemoryEventBus> {
        &self.events
    }

    // =========================================================================
    // EXECUTOR ENTRY POINTS
    // =========================================================================

    /// Submits an executor proposal; see [`MultiPartyExecutor::submit`].
    ///
    /// # Errors
    ///
    /// Any [`MultisigError`] of the underlying submission.
    pub fn submit(
        &mut self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: Vec<u8>,
        nonce: u64,
    ) -> Result<u64, MultisigError> {
        let mut router = CallRouter::new(&mut self.ledger, &mut self.timelock);
        self.multisig
            .submit(caller, target, value, payload, nonce, &mut router)
    }

    /// Submits with the executor's current nonce.
    ///
    /// # Errors
    ///
    /// Any [`MultisigError`] of the underlying submission.
    pub fn propose(
        &mut self,
        caller: Address,
        target: Address,
        payload: Vec<u8>,
    ) -> Result<u64, MultisigError> {
        let nonce = self.multisig.nonce();
        self.submit(caller, target, 0, payload, nonce)
    }

    /// # Errors
    ///
    /// Any [`MultisigError`] of the underlying confirmation.
    pub fn confirm(&mut self, caller: Address, id: u64) -> Result<bool, MultisigError> {
        let mut router = CallRouter::new(&mut self.ledger, &mut self.timelock);
        self.multisig.confirm(caller, id, &mut router)
    }

    /// # Errors
    ///
    /// Any [`MultisigError`] of the underlying revocation.
    pub fn revoke_confirmation(&mut self, caller: Address, id: u64) -> Result<(), MultisigError> {
        self.multisig.revoke_confirmation(caller, id)
    }

    /// # Errors
    ///
    /// Any [`MultisigError`] of the underlying execution.
    pub fn execute_proposal(&mut self, caller: Address, id: u64) -> Result<Vec<u8>, MultisigError> {
        let mut router = CallRouter::new(&mut self.ledger, &mut self.timelock);
        self.multisig.execute(caller, id, &mut router)
    }

    /// Executes a ready queue operation directly, for callers holding
    /// EXECUTOR (or any caller once EXECUTOR is open).
    ///
    /// # Errors
    ///
    /// Any [`ScheduleError`] of the underlying execution.
    pub fn execute_scheduled(&mut self, caller: Address, id: Hash) -> Result<Vec<u8>, ScheduleError> {
        let mut router = CallRouter::ledger_only(&mut self.ledger);
        self.timelock.execute(caller, id, &mut router)
    }

    // =========================================================================
    // HEALTH
    // =========================================================================

    /// Re-checks the ledger invariants.
    ///
    /// # Errors
    ///
    /// - `InvariantMismatch` if supply and backing disagree anywhere
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.ledger.validate()
    }

    pub fn summary(&self) -> RuntimeSummary {
        RuntimeSummary {
            ledger: self.ledger.address(),
            timelock: self.timelock.address(),
            multisig: self.multisig.address(),
            name: self.ledger.name().to_string(),
            symbol: self.ledger.symbol().to_string(),
            state_version: STATE_VERSION,
            total_supply: self.ledger.total_supply(),
            total_backing: self.ledger.total_backing(),
            paused: self.ledger.is_paused(),
            transfers_enabled: self.ledger.transfers_enabled(),
            min_delay_secs: self.timelock.min_delay(),
            pending_operations: self.timelock.pending_operations().len(),
            owners: self.multisig.owners().len(),
            threshold: self.multisig.threshold(),
            nonce: self.multisig.nonce(),
            pending_proposals: self.multisig.pending_transactions().len(),
            journal_records: self.events.len(),
        }
    }

    /// Logs [`Self::summary`].
    pub fn log_summary(&self) {
        let s = self.summary();
        info!(
            ledger = %s.ledger,
            timelock = %s.timelock,
            multisig = %s.multisig,
            symbol = %s.symbol,
            total_supply = s.total_supply,
            total_backing = s.total_backing,
            paused = s.paused,
            min_delay_secs = s.min_delay_secs,
            threshold = s.threshold,
            owners = s.owners,
            journal_records = s.journal_records,
            "Governance runtime ready"
        );
    }
}

impl std::fmt::Debug for GovernanceRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceRuntime")
            .field("addresses", &self.config.addresses)
            .field("multisig", &self.multisig)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeSummary {
    pub ledger: Address,
    pub timelock: Address,
    pub multisig: Address,
    pub name: String,
    pub symbol: String,
    pub state_version: u32,
    pub total_supply: Amount,
    pub total_backing: Amount,
    pub paused: bool,
    pub transfers_enabled: bool,
    pub min_delay_secs: u64,
    pub pending_operations: usize,
    pub owners: usize,
    pub threshold: usize,
    pub nonce: u64,
    pub pending_proposals: usize,
    pub journal_records: usize,
}
