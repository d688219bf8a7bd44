//! Error types for the Scheduled Operation Queue

use super::entities::OperationState;
use shared_types::{Address, CallError, ErrorKind, Hash, Timestamp, TimelockRole};
use thiserror::Error;

/// All errors that can occur in the queue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Caller does not hold the role the operation requires.
    #[error("Unauthorized: {caller} lacks role {role}")]
    Unauthorized { caller: Address, role: TimelockRole },

    /// Operation only callable by the queue itself.
    #[error("Unauthorized: {caller} is not the queue itself")]
    NotSelfCall { caller: Address },

    /// Requested delay below the configured minimum.
    #[error("Delay too short: {delay}s < minimum {min_delay}s")]
    DelayTooShort { delay: u64, min_delay: u64 },

    /// `now + delay` does not fit a timestamp.
    #[error("Delay {delay}s overflows the clock")]
    DelayOverflow { delay: u64 },

    /// Zero address used as target or role holder.
    #[error("Zero address is not a valid target")]
    ZeroAddress,

    /// An operation with this id already exists.
    #[error("Operation {id} already exists ({state})")]
    AlreadyScheduled { id: Hash, state: OperationState },

    /// No operation with this id.
    #[error("Unknown operation {0}")]
    UnknownOperation(Hash),

    /// Operation is not in the Scheduled state.
    #[error("Operation {id} is not pending ({state})")]
    NotPending { id: Hash, state: OperationState },

    /// Ready timestamp not reached yet.
    #[error("Operation {id} not ready: ready at {ready_at}, now {now}")]
    NotReady {
        id: Hash,
        ready_at: Timestamp,
        now: Timestamp,
    },

    /// Declared predecessor has not been executed.
    #[error("Operation {id} waits for predecessor {predecessor}")]
    PredecessorNotDone { id: Hash, predecessor: Hash },

    /// The target rejected the call; nothing changed.
    #[error("Operation {id} call failed: {source}")]
    CallFailed {
        id: Hash,
        #[source]
        source: CallError,
    },
}

impl ScheduleError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } | Self::NotSelfCall { .. } => ErrorKind::Authorization,
            Self::DelayTooShort { .. } | Self::DelayOverflow { .. } | Self::ZeroAddress => {
                ErrorKind::Input
            }
            Self::AlreadyScheduled { .. }
            | Self::NotPending { .. }
            | Self::NotReady { .. }
            | Self::PredecessorNotDone { .. } => ErrorKind::State,
            Self::UnknownOperation(_) => ErrorKind::NotFound,
            Self::CallFailed { source, .. } => source.kind(),
        }
    }
}
