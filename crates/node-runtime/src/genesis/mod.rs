//! # Genesis Module
//!
//! One-shot deployment of the governance stack.
//!
//! ## Initialization Sequence
//!
//! 1. Validate the node configuration
//! 2. Deploy the ledger with the deployer as bootstrap admin
//! 3. Hand ledger administration to the queue and operational roles to operators
//! 4. Deploy the queue and hand its proposer/executor/canceller roles to the executor
//! 5. Deploy the executor with the configured owners
//! 6. Drop every deployer role

pub mod builder;

pub use builder::{GenesisBuilder, GenesisError};
