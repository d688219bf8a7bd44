//! Domain layer for the Backed Ledger

pub mod account_store;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod math;
pub mod permissions;
pub mod whitelist;

pub use account_store::AccountStore;
pub use engine::BackingInvariantEngine;
pub use entities::*;
pub use errors::LedgerError;
pub use invariants::*;
pub use math::{mul_div, proportional_backing, Rounding};
pub use permissions::LedgerOperation;
pub use whitelist::WhitelistRegistry;
