//! # Shared Types Crate
//!
//! This crate contains the identifiers, role tags, error taxonomy and ports
//! shared by every Reserve-Chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Closed Role Sets**: Every subsystem declares its roles as a closed enum;
//!   there is no string or byte-constant role dispatch.
//! - **Caller-Explicit Calls**: Engines invoke each other only through
//!   [`CallTarget`], and the caller identity is always an explicit argument.

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod ports;
pub mod roles;

pub use entities::*;
pub use errors::*;
pub use hashing::{keccak256, HashBuilder};
pub use ports::{CallTarget, ManualTimeSource, SystemTimeSource, TimeSource};
pub use roles::{AnyRole, LedgerRole, MultisigRole, RoleTable, RoleTag, TimelockRole};
