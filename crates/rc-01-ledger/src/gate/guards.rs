//! Policy guards composed by the [`TransferGate`](super::TransferGate).

use super::{GateContext, GateRequest, Guard};
use crate::domain::{LedgerError, LedgerOperation};
use shared_types::Address;

/// Rejects callers that lack the role the permission table requires.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoleGuard;

impl Guard for RoleGuard {
    fn name(&self) -> &'static str {
        "role"
    }

    fn check(&self, ctx: &GateContext<'_>, request: &GateRequest) -> Result<(), LedgerError> {
        match request.operation.required_role() {
            Some(role) if !ctx.roles.has_role(role, &ctx.caller) => Err(LedgerError::Unauthorized {
                caller: ctx.caller,
                role,
            }),
            _ => Ok(()),
        }
    }
}

/// Blocks every balance-mutating operation while the ledger is paused.
#[derive(Clone, Copy, Debug, Default)]
pub struct PauseGuard;

impl Guard for PauseGuard {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn check(&self, ctx: &GateContext<'_>, request: &GateRequest) -> Result<(), LedgerError> {
        if ctx.flags.paused && request.operation.mutates_balances() {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }
}

/// Whitelist, custodial-account and transfers-enabled checks.
///
/// - mint: destination whitelisted (and equal to the custodial account, if one is set)
/// - burn: source whitelisted (and equal to the custodial account, if one is set)
/// - transfer / transfer_from: transfers enabled, both endpoints whitelisted
#[derive(Clone, Copy, Debug, Default)]
pub struct ComplianceGuard;

impl ComplianceGuard {
    fn require_whitelisted(
        ctx: &GateContext<'_>,
        account: Option<Address>,
    ) -> Result<(), LedgerError> {
        match account {
            Some(account) if !ctx.whitelist.is_whitelisted(&account) => {
                Err(LedgerError::NotWhitelisted { account })
            }
            _ => Ok(()),
        }
    }

    fn require_custodial(
        ctx: &GateContext<'_>,
        account: Option<Address>,
    ) -> Result<(), LedgerError> {
        match (ctx.custodial_account, account) {
            (Some(custodial), Some(account)) if account != custodial => {
                Err(LedgerError::NotCustodialAccount { account, custodial })
            }
            _ => Ok(()),
        }
    }
}

impl Guard for ComplianceGuard {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn check(&self, ctx: &GateContext<'_>, request: &GateRequest) -> Result<(), LedgerError> {
        match request.operation {
            LedgerOperation::Mint => {
                Self::require_custodial(ctx, request.destination)?;
                Self::require_whitelisted(ctx, request.destination)
            }
            LedgerOperation::Burn => {
                Self::require_custodial(ctx, request.source)?;
                Self::require_whitelisted(ctx, request.source)
            }
            LedgerOperation::Transfer | LedgerOperation::TransferFrom => {
                if !ctx.flags.transfers_enabled {
                    return Err(LedgerError::TransfersDisabled);
                }
                Self::require_whitelisted(ctx, request.source)?;
                Self::require_whitelisted(ctx, request.destination)
            }
            _ => Ok(()),
        }
    }
}
