//! Shared fixtures: a devnet deployment on a manual clock.

use node_runtime::{GenesisBuilder, GenesisError, GovernanceRuntime, NodeConfig, TimelockedLedgerCall};
use rc_01_ledger::{BackedLedgerApi, LedgerCall, LedgerError};
use rc_03_multisig::MultisigError;
use shared_types::{keccak256, Address, Hash, ManualTimeSource};
use std::sync::Arc;

/// Genesis timestamp of every fixture deployment.
pub const GENESIS_TIME: u64 = 1_700_000_000;

pub const MINTER: Address = operator(0xB1);
pub const BURNER: Address = operator(0xB2);
pub const PAUSER: Address = operator(0xB3);
pub const WHITELIST_MANAGER: Address = operator(0xB4);
pub const COMPLIANCE_OFFICER: Address = operator(0xB5);

const fn operator(low: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = low;
    Address::new(bytes)
}

/// Owner `n` (1-based) of the devnet executor.
pub fn owner(n: u64) -> Address {
    Address::from_low_u64_be(0xA0 + n)
}

/// An ordinary account holder.
pub fn holder(n: u64) -> Address {
    Address::from_low_u64_be(0x5000 + n)
}

/// A deployed runtime plus the clock driving its queue.
pub struct Deployment {
    pub runtime: GovernanceRuntime,
    pub clock: Arc<ManualTimeSource>,
    /// The queue's minimum delay.
    pub delay: u64,
}

impl Deployment {
    /// Devnet deployment: 2-of-3 owners, one operator per ledger role.
    ///
    /// # Errors
    ///
    /// Any genesis error.
    pub fn devnet() -> Result<Self, GenesisError> {
        Self::with_config(NodeConfig::devnet())
    }

    /// # Errors
    ///
    /// Any genesis error.
    pub fn with_config(config: NodeConfig) -> Result<Self, GenesisError> {
        let clock = Arc::new(ManualTimeSource::new(GENESIS_TIME));
        let delay = config.timelock.min_delay_secs;
        let runtime = GenesisBuilder::new(config)
            .with_clock(clock.clone())
            .build()?;
        Ok(Self {
            runtime,
            clock,
            delay,
        })
    }

    /// Whitelists `holders` and enables transfers.
    ///
    /// # Errors
    ///
    /// Any ledger error of the operator calls.
    pub fn open_market(&mut self, holders: &[Address]) -> Result<(), LedgerError> {
        let ledger = self.runtime.ledger_mut();
        if !holders.is_empty() {
            ledger.batch_update_whitelist(WHITELIST_MANAGER, holders, true)?;
        }
        ledger.set_transfers_enabled(COMPLIANCE_OFFICER, true)?;
        Ok(())
    }

    /// Runs `call` against the ledger the only way governance can: owners 1
    /// and 2 schedule it through the queue, the delay passes, owners 2 and 3
    /// execute it. Returns the queue operation id.
    ///
    /// # Errors
    ///
    /// The executor error of whichever step failed.
    pub fn governed(&mut self, call: &LedgerCall) -> Result<Hash, MultisigError> {
        let addresses = self.runtime.addresses();
        let salt = keccak256(&self.runtime.multisig().nonce().to_be_bytes());
        let timelocked =
            TimelockedLedgerCall::new(addresses.ledger, call, Hash::ZERO, salt, self.delay)
                .map_err(|source| MultisigError::ExecutionFailed {
                    id: self.runtime.multisig().transaction_count() as u64,
                    source,
                })?;

        let id = self
            .runtime
            .propose(owner(1), addresses.timelock, timelocked.schedule)?;
        self.runtime.confirm(owner(2), id)?;

        self.clock.advance(self.delay);

        let id = self
            .runtime
            .propose(owner(2), addresses.timelock, timelocked.execute)?;
        self.runtime.confirm(owner(3), id)?;
        Ok(timelocked.id)
    }
}
