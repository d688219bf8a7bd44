//! # Error Types
//!
//! The error taxonomy shared by all subsystems and the error type carried
//! across [`CallTarget`](crate::CallTarget) boundaries.
//!
//! Every subsystem error enum maps onto exactly one [`ErrorKind`], so callers
//! can apply a uniform policy (all kinds are fail-closed) without matching on
//! subsystem-specific variants.

use crate::entities::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level classification of every business error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing role, unrecognized owner, or wrong governance gate.
    Authorization,
    /// Endpoint not whitelisted, or transfers globally disabled.
    Compliance,
    /// Supply/backing mismatch or insufficient balance.
    InvariantViolation,
    /// Nonce mismatch or hash already executed.
    Replay,
    /// Wrong lifecycle state (executed, not ready, not confirmed, paused...).
    State,
    /// Zero address, zero amount, oversized batch, malformed payload.
    Input,
    /// Unknown identifier in a query or lifecycle call.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authorization => "authorization",
            Self::Compliance => "compliance",
            Self::InvariantViolation => "invariant",
            Self::Replay => "replay",
            Self::State => "state",
            Self::Input => "input",
            Self::NotFound => "not-found",
        };
        f.write_str(name)
    }
}

/// Errors returned by a [`CallTarget`](crate::CallTarget).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// No engine is registered at the target address.
    #[error("no call target registered at {0}")]
    UnknownTarget(Address),

    /// The payload could not be decoded for the target.
    #[error("malformed call payload: {0}")]
    MalformedPayload(String),

    /// Value was attached to a call on a non-payable target.
    #[error("target is not payable: value {0}")]
    NotPayable(Amount),

    /// The target rejected the call.
    #[error("call reverted ({kind}): {reason}")]
    Reverted { kind: ErrorKind, reason: String },
}

impl CallError {
    /// Builds a `Reverted` error from any displayable subsystem error.
    pub fn reverted(kind: ErrorKind, reason: impl fmt::Display) -> Self {
        Self::Reverted {
            kind,
            reason: reason.to_string(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTarget(_) => ErrorKind::NotFound,
            Self::MalformedPayload(_) | Self::NotPayable(_) => ErrorKind::Input,
            Self::Reverted { kind, .. } => *kind,
        }
    }
}
