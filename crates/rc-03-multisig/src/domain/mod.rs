//! Domain layer for the Multi-Party Executor

pub mod entities;
pub mod errors;

pub use entities::{transaction_hash, MultisigTransaction};
pub use errors::MultisigError;
