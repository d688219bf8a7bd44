//! # Reserve-Chain Node Runtime
//!
//! Deploys and wires the governance stack.
//!
//! ## Modular Structure
//!
//! - `container/` - `NodeConfig` and the `GovernanceRuntime` owning the engines
//! - `genesis/` - one-shot deployment and role wiring
//! - `wiring/` - call routing between engines and timelock payload helpers
//!
//! ## Governance Flow
//!
//! ```text
//! Owners ──submit/confirm──→ MultiPartyExecutor(3)
//!                                   │ threshold met
//!                                   ↓
//!                       ScheduledOperationQueue(2) ──schedule──→ waits min_delay
//!                                   │ execute (ready)
//!                                   ↓
//!                         ReserveLedgerService(1)
//! ```

pub mod container;
pub mod genesis;
pub mod wiring;

pub use container::{
    ConfigError, DeploymentAddresses, GovernanceRuntime, NodeConfig, OperatorConfig,
    RuntimeSummary,
};
pub use genesis::{GenesisBuilder, GenesisError};
pub use wiring::{CallRouter, TimelockedLedgerCall};
