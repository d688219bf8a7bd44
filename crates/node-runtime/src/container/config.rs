//! # Node Configuration
//!
//! Unified configuration for the three engines and their deployment.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RC_MIN_DELAY_SECS` | `timelock.min_delay_secs` |
//! | `RC_MULTISIG_THRESHOLD` | `multisig.threshold` |
//! | `RC_MULTISIG_OWNERS` | `multisig.owners` (comma-separated hex) |
//! | `RC_WHITELIST_BATCH_CAP` | `ledger.max_whitelist_batch` |
//! | `RC_CUSTODIAL_ACCOUNT` | `ledger.custodial_account` (empty clears it) |
//!
//! An override that does not parse is an error, never silently ignored.

use rc_01_ledger::LedgerConfig;
use rc_02_scheduled_operations::TimelockConfig;
use rc_03_multisig::{MultisigConfig, MultisigError};
use serde::{Deserialize, Serialize};
use shared_types::{Address, LedgerRole};
use std::collections::BTreeSet;
use thiserror::Error;

pub const ENV_MIN_DELAY_SECS: &str = "RC_MIN_DELAY_SECS";
pub const ENV_MULTISIG_THRESHOLD: &str = "RC_MULTISIG_THRESHOLD";
pub const ENV_MULTISIG_OWNERS: &str = "RC_MULTISIG_OWNERS";
pub const ENV_WHITELIST_BATCH_CAP: &str = "RC_WHITELIST_BATCH_CAP";
pub const ENV_CUSTODIAL_ACCOUNT: &str = "RC_CUSTODIAL_ACCOUNT";

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Scheduled operation queue configuration.
    pub timelock: TimelockConfig,
    /// Multi-party executor configuration.
    pub multisig: MultisigConfig,
    /// Engine addresses.
    pub addresses: DeploymentAddresses,
    /// Holders of the operational ledger roles.
    pub operators: OperatorConfig,
}

impl NodeConfig {
    /// A single-machine development deployment: three owners with a 2-of-3
    /// threshold and one operator per ledger role.
    pub fn devnet() -> Self {
        Self {
            multisig: MultisigConfig::new(
                vec![
                    Address::from_low_u64_be(0xA1),
                    Address::from_low_u64_be(0xA2),
                    Address::from_low_u64_be(0xA3),
                ],
                2,
            ),
            operators: OperatorConfig {
                minters: vec![Address::from_low_u64_be(0xB1)],
                burners: vec![Address::from_low_u64_be(0xB2)],
                pausers: vec![Address::from_low_u64_be(0xB3)],
                whitelist_managers: vec![Address::from_low_u64_be(0xB4)],
                compliance_officers: vec![Address::from_low_u64_be(0xB5)],
            },
            ..Self::default()
        }
    }

    /// Applies `RC_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// - `InvalidEnv` if a set variable does not parse
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `RC_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// - `InvalidEnv` if a present value does not parse
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MIN_DELAY_SECS) {
            self.timelock.min_delay_secs = parse_env(ENV_MIN_DELAY_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_MULTISIG_THRESHOLD) {
            self.multisig.threshold = parse_env(ENV_MULTISIG_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_MULTISIG_OWNERS) {
            self.multisig.owners = value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| parse_env(ENV_MULTISIG_OWNERS, part))
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = lookup(ENV_WHITELIST_BATCH_CAP) {
            self.ledger.max_whitelist_batch = parse_env(ENV_WHITELIST_BATCH_CAP, &value)?;
        }
        if let Some(value) = lookup(ENV_CUSTODIAL_ACCOUNT) {
            let value = value.trim();
            self.ledger.custodial_account = if value.is_empty() {
                None
            } else {
                Some(parse_env(ENV_CUSTODIAL_ACCOUNT, value)?)
            };
        }
        Ok(())
    }

    /// Validate the configuration before wiring.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the multisig owner set or threshold is invalid
    /// - the whitelist batch cap is zero
    /// - any engine, deployer, operator or custodial address is zero
    /// - two of the engine and deployer addresses coincide
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.multisig.validate()?;

        if self.ledger.max_whitelist_batch == 0 {
            return Err(ConfigError::ZeroBatchCap);
        }
        if self.ledger.custodial_account.is_some_and(|a| a.is_zero()) {
            return Err(ConfigError::ZeroAddress("custodial account"));
        }

        let mut seen = BTreeSet::new();
        for (name, address) in self.addresses.named() {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress(name));
            }
            if !seen.insert(address) {
                return Err(ConfigError::AddressCollision(address));
            }
        }
        if self
            .operators
            .assignments()
            .iter()
            .any(|(_, account)| account.is_zero())
        {
            return Err(ConfigError::ZeroAddress("operator"));
        }
        Ok(())
    }
}

/// Where each engine lives, plus the one-shot deployer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentAddresses {
    /// Holds bootstrap admin roles during genesis only.
    pub deployer: Address,
    pub ledger: Address,
    pub timelock: Address,
    pub multisig: Address,
}

impl DeploymentAddresses {
    fn named(&self) -> [(&'static str, Address); 4] {
        [
            ("deployer", self.deployer),
            ("ledger", self.ledger),
            ("timelock", self.timelock),
            ("multisig", self.multisig),
        ]
    }
}

impl Default for DeploymentAddresses {
    fn default() -> Self {
        Self {
            deployer: Address::from_low_u64_be(0xD0),
            ledger: Address::from_low_u64_be(0x1001),
            timelock: Address::from_low_u64_be(0x1002),
            multisig: Address::from_low_u64_be(0x1003),
        }
    }
}

/// Operational ledger roles granted at genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub minters: Vec<Address>,
    pub burners: Vec<Address>,
    pub pausers: Vec<Address>,
    pub whitelist_managers: Vec<Address>,
    pub compliance_officers: Vec<Address>,
}

impl OperatorConfig {
    /// Every (role, account) pair to grant.
    pub fn assignments(&self) -> Vec<(LedgerRole, Address)> {
        [
            (LedgerRole::Minter, &self.minters),
            (LedgerRole::Burner, &self.burners),
            (LedgerRole::Pauser, &self.pausers),
            (LedgerRole::WhitelistManager, &self.whitelist_managers),
            (LedgerRole::ComplianceOfficer, &self.compliance_officers),
        ]
        .into_iter()
        .flat_map(|(role, accounts)| accounts.iter().map(move |account| (role, *account)))
        .collect()
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment override did not parse.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Zero address configured for {0}")]
    ZeroAddress(&'static str),

    #[error("Address {0} is assigned to more than one engine")]
    AddressCollision(Address),

    #[error("Whitelist batch cap must be at least 1")]
    ZeroBatchCap,

    #[error("Invalid multisig configuration: {0}")]
    Multisig(#[from] MultisigError),
}

fn parse_env<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
