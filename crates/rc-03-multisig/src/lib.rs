//! # RC-03: Multi-Party Executor
//!
//! M-of-N threshold execution of arbitrary calls. Proposals carry a strictly
//! sequential nonce, and every executed transaction hash is remembered
//! forever, so no proposal can run twice.
//!
//! ## Architecture
//!
//! - **Domain**: `MultisigTransaction`, `transaction_hash`, `MultisigError`
//! - **Application**: `MultiPartyExecutor`
//! - **Calls**: `MultisigCall`, owner management through the executor's own
//!   proposals
//!
//! ## Security Invariants
//!
//! - INVARIANT-1: a proposal is accepted only with `nonce == current nonce`
//! - INVARIANT-2: a transaction hash executes at most once
//! - INVARIANT-3: only confirmations of current owners count toward the
//!   threshold
//! - INVARIANT-4: `1 <= threshold <= owners` at all times

pub mod application;
pub mod calls;
pub mod config;
pub mod domain;

pub use application::MultiPartyExecutor;
pub use calls::MultisigCall;
pub use config::{MultisigConfig, DEFAULT_THRESHOLD};
pub use domain::{transaction_hash, MultisigError, MultisigTransaction};
