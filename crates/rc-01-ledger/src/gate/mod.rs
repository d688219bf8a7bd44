//! Transfer gate: authorization and compliance pipeline.
//!
//! ```text
//! request ──→ [RoleGuard] ──→ [PauseGuard] ──→ [ComplianceGuard] ──→ engine
//!                 │                │                  │
//!                 ↓                ↓                  ↓
//!           Unauthorized        Paused     NotWhitelisted / TransfersDisabled
//! ```
//!
//! Guards run in order and the first rejection wins. The gate never mutates
//! state; it only reads the role table, whitelist and flags it is handed.

mod guards;

pub use guards::{ComplianceGuard, PauseGuard, RoleGuard};

use crate::domain::{LedgerError, LedgerFlags, LedgerOperation, WhitelistRegistry};
use shared_types::{Address, LedgerRole, RoleTable};
use tracing::debug;

/// Read-only view of the state the guards inspect.
#[derive(Clone, Copy, Debug)]
pub struct GateContext<'a> {
    pub caller: Address,
    pub roles: &'a RoleTable<LedgerRole>,
    pub whitelist: &'a WhitelistRegistry,
    pub flags: LedgerFlags,
    pub custodial_account: Option<Address>,
}

/// The operation being authorized and its endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateRequest {
    pub operation: LedgerOperation,
    /// Account losing balance (burn, transfer).
    pub source: Option<Address>,
    /// Account gaining balance (mint, transfer).
    pub destination: Option<Address>,
}

impl GateRequest {
    pub fn new(operation: LedgerOperation) -> Self {
        Self {
            operation,
            source: None,
            destination: None,
        }
    }

    pub fn mint(to: Address) -> Self {
        Self {
            destination: Some(to),
            ..Self::new(LedgerOperation::Mint)
        }
    }

    pub fn burn(from: Address) -> Self {
        Self {
            source: Some(from),
            ..Self::new(LedgerOperation::Burn)
        }
    }

    pub fn transfer(operation: LedgerOperation, from: Address, to: Address) -> Self {
        Self {
            operation,
            source: Some(from),
            destination: Some(to),
        }
    }
}

/// A single policy check.
pub trait Guard: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Rejects the request, or lets it through to the next guard.
    fn check(&self, ctx: &GateContext<'_>, request: &GateRequest) -> Result<(), LedgerError>;
}

/// Ordered guard pipeline.
pub struct TransferGate {
    guards: Vec<Box<dyn Guard>>,
}

impl TransferGate {
    /// Role, then pause, then compliance.
    pub fn standard() -> Self {
        Self::with_guards(vec![
            Box::new(RoleGuard),
            Box::new(PauseGuard),
            Box::new(ComplianceGuard),
        ])
    }

    pub fn with_guards(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }

    /// Runs every guard in order.
    ///
    /// # Errors
    ///
    /// The first guard rejection.
    pub fn authorize(
        &self,
        ctx: &GateContext<'_>,
        request: &GateRequest,
    ) -> Result<(), LedgerError> {
        for guard in &self.guards {
            if let Err(err) = guard.check(ctx, request) {
                debug!(
                    guard = guard.name(),
                    operation = %request.operation,
                    caller = %ctx.caller,
                    error = %err,
                    "Gate rejected request"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn guard_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }
}

impl Default for TransferGate {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for TransferGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferGate")
            .field("guards", &self.guard_names())
            .finish()
    }
}
