//! # Container Module
//!
//! Node configuration and the runtime that owns the deployed engines.

pub mod config;
pub mod runtime;

pub use config::{ConfigError, DeploymentAddresses, NodeConfig, OperatorConfig};
pub use runtime::{GovernanceRuntime, RuntimeSummary};
