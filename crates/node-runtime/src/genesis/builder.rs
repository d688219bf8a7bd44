//! # Genesis Builder
//!
//! Deploys the three engines and wires their roles.

use crate::container::{ConfigError, GovernanceRuntime, NodeConfig};
use rc_01_ledger::{BackedLedgerApi, LedgerError, ReserveLedgerService};
use rc_02_scheduled_operations::{ScheduleError, ScheduledOperationQueue};
use rc_03_multisig::{MultiPartyExecutor, MultisigError};
use shared_bus::InMemoryEventBus;
use shared_types::{LedgerRole, SystemTimeSource, TimeSource, TimelockRole};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Genesis wiring errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// Configuration failed validation.
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Ledger setup failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Queue setup failed: {0}")]
    Timelock(#[from] ScheduleError),

    #[error("Executor setup failed: {0}")]
    Multisig(#[from] MultisigError),
}

/// Builds a [`GovernanceRuntime`] from a [`NodeConfig`].
///
/// ## Wiring
///
/// 1. Ledger: ADMIN and UPGRADER go to the queue, operational roles to the
///    configured operators, then the deployer renounces ADMIN
/// 2. Queue: PROPOSER, CANCELLER and EXECUTOR go to the executor, then the
///    deployer renounces TIMELOCK_ADMIN
/// 3. Executor: owners and threshold from the configuration
///
/// Afterwards no single account holds any governance role: every privileged
/// ledger change goes executor → queue (delay) → ledger.
pub struct GenesisBuilder {
    config: NodeConfig,
    clock: Arc<dyn TimeSource>,
    events: Arc<InMemoryEventBus>,
}

impl GenesisBuilder {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemTimeSource),
            events: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Replaces the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Publishes into an existing bus instead of a fresh one.
    pub fn with_event_bus(mut self, events: Arc<InMemoryEventBus>) -> Self {
        self.events = events;
        self
    }

    /// Validates the configuration and deploys.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if [`NodeConfig::validate`] fails
    /// - any engine construction or role wiring error
    pub fn build(self) -> Result<GovernanceRuntime, GenesisError> {
        let Self {
            config,
            clock,
            events,
        } = self;
        config.validate()?;

        let addresses = config.addresses;
        let deployer = addresses.deployer;

        let mut ledger = ReserveLedgerService::new(
            addresses.ledger,
            config.ledger.clone(),
            deployer,
            events.clone(),
        )?;
        for role in [LedgerRole::Admin, LedgerRole::Upgrader] {
            ledger.grant_role(deployer, role, addresses.timelock)?;
        }
        for (role, account) in config.operators.assignments() {
            ledger.grant_role(deployer, role, account)?;
        }
        ledger.renounce_role(deployer, LedgerRole::Admin)?;
        info!(ledger = %addresses.ledger, "Ledger deployed");

        let mut timelock = ScheduledOperationQueue::new(
            addresses.timelock,
            config.timelock.clone(),
            deployer,
            clock,
            events.clone(),
        )?;
        for role in [
            TimelockRole::Proposer,
            TimelockRole::Canceller,
            TimelockRole::Executor,
        ] {
            timelock.grant_role(deployer, role, addresses.multisig)?;
        }
        timelock.renounce_role(deployer, TimelockRole::Admin);
        info!(timelock = %addresses.timelock, "Scheduled operation queue deployed");

        let multisig =
            MultiPartyExecutor::new(addresses.multisig, config.multisig.clone(), events.clone())?;
        info!(multisig = %addresses.multisig, "Multi-party executor deployed");

        Ok(GovernanceRuntime::from_parts(
            config, ledger, timelock, multisig, events,
        ))
    }
}
