//! # RC-01: Backed Ledger Subsystem
//!
//! An account-based unit of value whose outstanding supply always equals its
//! declared backing. Balance movements pass through a composable transfer
//! gate before reaching the backing invariant engine.
//!
//! ## Architecture
//!
//! - **Domain**: `AccountStore`, `BackingInvariantEngine`, `WhitelistRegistry`,
//!   the permission table and invariants
//! - **Gate**: `RoleGuard`, `PauseGuard`, `ComplianceGuard` composed by `TransferGate`
//! - **Ports**: Inbound (`BackedLedgerApi`, `LedgerQueries`)
//! - **Application**: `ReserveLedgerService`, which also serves governance
//!   calls through `CallTarget`
//! - **Snapshot / Replay**: versioned export, migration and journal replay
//!
//! ## Invariant
//!
//! `total_supply == total_backing` after every committed mutation. Minting is
//! strict 1:1, so each account's backing also equals its balance.

pub mod application;
pub mod calls;
pub mod config;
pub mod domain;
pub mod gate;
pub mod ports;
pub mod replay;
pub mod snapshot;

pub use application::ReserveLedgerService;
pub use calls::LedgerCall;
pub use config::LedgerConfig;
pub use domain::entities::*;
pub use domain::errors::LedgerError;
pub use domain::{AccountStore, BackingInvariantEngine, LedgerOperation, WhitelistRegistry};
pub use gate::{ComplianceGuard, GateContext, GateRequest, Guard, PauseGuard, RoleGuard, TransferGate};
pub use ports::inbound::{BackedLedgerApi, LedgerQueries};
pub use snapshot::{migrate, LedgerSnapshot, STATE_VERSION};

/// Everything a caller of the ledger usually needs.
pub mod prelude {
    pub use crate::{
        BackedLedgerApi, LedgerCall, LedgerConfig, LedgerError, LedgerQueries,
        ReserveLedgerService,
    };
}
