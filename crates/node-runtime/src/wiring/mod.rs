//! # Wiring Module
//!
//! Call routing between the governance engines and the payloads that travel
//! along those routes.

pub mod proposals;
pub mod router;

pub use proposals::TimelockedLedgerCall;
pub use router::CallRouter;
