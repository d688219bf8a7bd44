//! Event replay: rebuild ledger state from the journal alone.
//!
//! Balance events are re-applied through a fresh [`BackingInvariantEngine`],
//! so a journal whose recorded backing disagrees with what the engine computes
//! is rejected rather than silently accepted.

use crate::domain::{
    AllowanceEntry, AttestedReserve, BackingInvariantEngine, LedgerError, LedgerFlags,
    WhitelistRegistry,
};
use crate::snapshot::{LedgerSnapshot, STATE_VERSION};
use shared_bus::{EventRecord, LedgerEvent};
use shared_types::{Address, AnyRole, LedgerRole, RoleTable};
use std::collections::BTreeMap;
use tracing::debug;

/// Replays every record emitted by `ledger` into a snapshot.
///
/// Records from other emitters are skipped. A `StateMigrated` record means
/// the ledger was restored from a snapshot and its earlier history is not in
/// this journal, so replay refuses it.
///
/// # Errors
///
/// - `InconsistentSnapshot` if a record cannot be applied or disagrees with
///   the recomputed backing
pub fn rebuild(records: &[EventRecord], ledger: Address) -> Result<LedgerSnapshot, LedgerError> {
    let mut engine = BackingInvariantEngine::new();
    let mut whitelist = WhitelistRegistry::new();
    let mut roles = RoleTable::<LedgerRole>::new();
    let mut flags = LedgerFlags::default();
    let mut allowances = BTreeMap::new();
    let mut attested_reserve = None;
    let mut authorized_version = STATE_VERSION;
    let mut applied = 0usize;

    for record in records.iter().filter(|r| r.emitter == ledger) {
        let sequence = record.sequence;
        let fail = |what: &str| {
            LedgerError::InconsistentSnapshot(format!("record {sequence}: {what}"))
        };

        match &record.event {
            LedgerEvent::Minted {
                to,
                amount,
                backing,
            } => {
                engine
                    .mint(*to, *amount, *backing)
                    .map_err(|e| fail(&e.to_string()))?;
            }
            LedgerEvent::Burned {
                from,
                amount,
                backing,
            } => {
                let receipt = engine.burn(*from, *amount).map_err(|e| fail(&e.to_string()))?;
                if receipt.backing_removed != *backing {
                    return Err(fail("burned backing differs"));
                }
            }
            LedgerEvent::Transferred {
                from,
                to,
                amount,
                backing,
            } => {
                let receipt = engine
                    .transfer(*from, *to, *amount)
                    .map_err(|e| fail(&e.to_string()))?;
                if receipt.backing_moved != *backing {
                    return Err(fail("transferred backing differs"));
                }
            }
            LedgerEvent::Approved {
                owner,
                spender,
                amount,
            } => {
                if *amount == 0 {
                    allowances.remove(&(*owner, *spender));
                } else {
                    allowances.insert((*owner, *spender), *amount);
                }
            }
            LedgerEvent::WhitelistUpdated {
                account,
                whitelisted,
            } => {
                whitelist
                    .set(*account, *whitelisted)
                    .map_err(|e| fail(&e.to_string()))?;
            }
            LedgerEvent::TransfersToggled { enabled, .. } => flags.transfers_enabled = *enabled,
            LedgerEvent::Paused { .. } => flags.paused = true,
            LedgerEvent::Unpaused { .. } => flags.paused = false,
            LedgerEvent::RoleGranted {
                role: AnyRole::Ledger(role),
                account,
                ..
            } => {
                roles.grant(*role, *account);
            }
            LedgerEvent::RoleRevoked {
                role: AnyRole::Ledger(role),
                account,
                ..
            } => {
                roles.revoke(*role, account);
            }
            LedgerEvent::BackingUpdated {
                attested_reserve: amount,
                reference,
                by,
                ..
            } => {
                attested_reserve = Some(AttestedReserve {
                    amount: *amount,
                    reference: *reference,
                    recorded_by: *by,
                });
            }
            LedgerEvent::UpgradeAuthorized { to_version, .. } => {
                authorized_version = *to_version;
            }
            LedgerEvent::StateMigrated { .. } => {
                return Err(fail("history before a snapshot restore is not in the journal"));
            }
            _ => continue,
        }
        applied += 1;
    }

    engine.validate()?;
    debug!(applied, ledger = %ledger, "Replayed ledger journal");

    Ok(LedgerSnapshot {
        version: STATE_VERSION,
        authorized_version,
        accounts: engine
            .store()
            .iter()
            .map(|(address, account)| (*address, *account))
            .collect(),
        totals: Some(engine.totals()),
        whitelist: whitelist.iter().copied().collect(),
        roles,
        flags,
        allowances: allowances
            .into_iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner,
                spender,
                amount,
            })
            .collect(),
        attested_reserve,
    })
}
