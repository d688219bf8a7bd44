//! Application layer for the Backed Ledger

pub mod service;

pub use service::ReserveLedgerService;
