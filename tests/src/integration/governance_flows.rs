//! # Governance Flows
//!
//! Multi-party executor → scheduled operation queue → ledger, end to end.
//!
//! ## Flows Tested
//!
//! 1. Threshold execution of a direct ledger call, exactly once
//! 2. Nonce and hash replay rejection
//! 3. Role administration only through the delayed path
//! 4. Cancellation and salted retry
//! 5. Queue self-calls (delay change) and upgrade authorization

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{holder, owner, Deployment, MINTER};
    use node_runtime::TimelockedLedgerCall;
    use rc_01_ledger::{BackedLedgerApi, LedgerCall, LedgerQueries};
    use rc_02_scheduled_operations::{hash_operation, OperationCall, OperationState, TimelockCall};
    use rc_03_multisig::MultisigError;
    use shared_types::{keccak256, ErrorKind, Hash, LedgerRole};

    fn deploy() -> Deployment {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Deployment::devnet().unwrap()
    }

    // =========================================================================
    // EXECUTOR
    // =========================================================================

    #[test]
    fn test_two_of_three_executes_exactly_once() {
        let mut d = deploy();
        let addresses = d.runtime.addresses();
        let approve = LedgerCall::Approve {
            spender: holder(1),
            amount: 5,
        }
        .encode()
        .unwrap();

        let id = d
            .runtime
            .submit(owner(1), addresses.ledger, 0, approve, 0)
            .unwrap();
        assert_eq!(d.runtime.multisig().confirmations(id).unwrap().len(), 1);
        assert_eq!(d.runtime.ledger().allowance(&addresses.multisig, &holder(1)), 0);

        assert!(d.runtime.confirm(owner(2), id).unwrap());
        assert_eq!(d.runtime.ledger().allowance(&addresses.multisig, &holder(1)), 5);

        let err = d.runtime.confirm(owner(3), id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        let tx_hash = d.runtime.multisig().transaction(id).unwrap().tx_hash;
        assert!(d.runtime.multisig().is_hash_executed(&tx_hash));
    }

    #[test]
    fn test_resubmitting_same_nonce_is_replay() {
        let mut d = deploy();
        let target = d.runtime.addresses().ledger;
        let payload = LedgerCall::Approve {
            spender: holder(1),
            amount: 1,
        }
        .encode()
        .unwrap();

        d.runtime
            .submit(owner(1), target, 0, payload.clone(), 0)
            .unwrap();
        let err = d
            .runtime
            .submit(owner(1), target, 0, payload, 0)
            .unwrap_err();
        assert!(matches!(err, MultisigError::InvalidNonce { expected: 1, got: 0 }));
        assert_eq!(err.kind(), ErrorKind::Replay);
    }

    #[test]
    fn test_executor_cannot_bypass_queue() {
        let mut d = deploy();
        let addresses = d.runtime.addresses();
        let grant = LedgerCall::GrantRole {
            role: LedgerRole::Minter,
            account: holder(7),
        }
        .encode()
        .unwrap();

        let id = d.runtime.propose(owner(1), addresses.ledger, grant).unwrap();
        let err = d.runtime.confirm(owner(2), id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(!d.runtime.ledger().has_role(LedgerRole::Minter, &holder(7)));
        assert_eq!(d.runtime.multisig().pending_transactions(), vec![id]);
    }

    // =========================================================================
    // QUEUE
    // =========================================================================

    #[test]
    fn test_governed_role_grant() {
        let mut d = deploy();
        let op_id = d
            .governed(&LedgerCall::GrantRole {
                role: LedgerRole::Minter,
                account: holder(7),
            })
            .unwrap();

        assert!(d.runtime.timelock().is_done(&op_id));
        assert!(d.runtime.ledger().has_role(LedgerRole::Minter, &holder(7)));
        assert!(d.runtime.ledger().has_role(LedgerRole::Minter, &MINTER));
        assert!(d.runtime.validate().is_ok());
    }

    #[test]
    fn test_execution_waits_for_delay() {
        let mut d = deploy();
        let addresses = d.runtime.addresses();
        let call = TimelockedLedgerCall::new(
            addresses.ledger,
            &LedgerCall::RevokeRole {
                role: LedgerRole::Minter,
                account: MINTER,
            },
            Hash::ZERO,
            Hash::ZERO,
            d.delay,
        )
        .unwrap();

        let id = d
            .runtime
            .propose(owner(1), addresses.timelock, call.schedule.clone())
            .unwrap();
        d.runtime.confirm(owner(2), id).unwrap();

        d.clock.advance(d.delay - 1);
        let id = d
            .runtime
            .propose(owner(1), addresses.timelock, call.execute.clone())
            .unwrap();
        let err = d.runtime.confirm(owner(2), id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(d.runtime.ledger().has_role(LedgerRole::Minter, &MINTER));

        d.clock.advance(1);
        assert!(d.runtime.confirm(owner(2), id).unwrap());
        assert!(!d.runtime.ledger().has_role(LedgerRole::Minter, &MINTER));
    }

    #[test]
    fn test_cancelled_operation_needs_new_salt() {
        let mut d = deploy();
        let addresses = d.runtime.addresses();
        let first = TimelockedLedgerCall::new(
            addresses.ledger,
            &LedgerCall::AuthorizeUpgrade { to_version: 3 },
            Hash::ZERO,
            Hash::ZERO,
            d.delay,
        )
        .unwrap();

        let id = d
            .runtime
            .propose(owner(1), addresses.timelock, first.schedule.clone())
            .unwrap();
        d.runtime.confirm(owner(2), id).unwrap();
        let id = d
            .runtime
            .propose(owner(2), addresses.timelock, first.cancel.clone())
            .unwrap();
        d.runtime.confirm(owner(3), id).unwrap();
        assert_eq!(
            d.runtime.timelock().state_of(&first.id),
            OperationState::Cancelled
        );

        // The same id can never be scheduled again.
        let id = d
            .runtime
            .propose(owner(1), addresses.timelock, first.schedule)
            .unwrap();
        assert_eq!(
            d.runtime.confirm(owner(2), id).unwrap_err().kind(),
            ErrorKind::State
        );

        let op_id = d
            .governed(&LedgerCall::AuthorizeUpgrade { to_version: 3 })
            .unwrap();
        assert_ne!(op_id, first.id);
        assert_eq!(d.runtime.ledger().authorized_version(), 3);
    }

    #[test]
    fn test_delay_change_is_itself_delayed() {
        let mut d = deploy();
        let addresses = d.runtime.addresses();
        let operation = OperationCall::new(
            addresses.timelock,
            0,
            TimelockCall::UpdateDelay { new_delay: 3_600 }.encode().unwrap(),
        );
        let salt = keccak256(b"delay");
        let op_id = hash_operation(&operation, &Hash::ZERO, &salt);
        let schedule = TimelockCall::Schedule {
            call: operation,
            predecessor: Hash::ZERO,
            salt,
            delay: d.delay,
        }
        .encode()
        .unwrap();

        let id = d.runtime.propose(owner(1), addresses.timelock, schedule).unwrap();
        d.runtime.confirm(owner(3), id).unwrap();
        assert_eq!(d.runtime.timelock().min_delay(), d.delay);

        d.clock.advance(d.delay);
        let execute = TimelockCall::Execute { id: op_id }.encode().unwrap();
        let id = d.runtime.propose(owner(2), addresses.timelock, execute).unwrap();
        d.runtime.confirm(owner(3), id).unwrap();
        assert_eq!(d.runtime.timelock().min_delay(), 3_600);
    }

    #[test]
    fn test_operator_mint_after_governed_whitelisting() {
        let mut d = deploy();
        d.open_market(&[holder(1)]).unwrap();
        d.governed(&LedgerCall::GrantRole {
            role: LedgerRole::Minter,
            account: holder(8),
        })
        .unwrap();

        let ledger = d.runtime.ledger_mut();
        ledger.mint(holder(8), holder(1), 42, 42).unwrap();
        assert_eq!(ledger.total_supply(), 42);
        assert_eq!(ledger.total_backing(), 42);
    }
}
