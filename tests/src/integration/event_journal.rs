//! # Event Journal
//!
//! The shared bus as the system's history: live subscribers see committed
//! transitions in order, and the journal alone reconstructs ledger state.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{holder, owner, Deployment, MINTER};
    use rc_01_ledger::{replay, BackedLedgerApi, LedgerCall};
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscriber_sees_multisig_lifecycle() {
        let mut d = Deployment::devnet().unwrap();
        let addresses = d.runtime.addresses();
        let mut sub = d
            .runtime
            .events()
            .subscribe(EventFilter::topics(vec![EventTopic::Multisig]));

        let payload = LedgerCall::Approve {
            spender: holder(1),
            amount: 9,
        }
        .encode()
        .unwrap();
        let id = d.runtime.propose(owner(1), addresses.ledger, payload).unwrap();
        d.runtime.confirm(owner(2), id).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let record = timeout(Duration::from_millis(100), sub.recv())
                .await
                .expect("timeout waiting for event")
                .expect("bus closed");
            assert_eq!(record.emitter, addresses.multisig);
            seen.push(record.event);
        }

        assert!(matches!(seen[0], LedgerEvent::ProposalSubmitted { nonce: 0, .. }));
        assert!(matches!(
            seen[1],
            LedgerEvent::ProposalConfirmed { confirmations: 1, .. }
        ));
        assert!(matches!(
            seen[2],
            LedgerEvent::ProposalConfirmed { confirmations: 2, .. }
        ));
        assert!(matches!(seen[3], LedgerEvent::ProposalExecuted { id: 0, .. }));
    }

    #[tokio::test]
    async fn test_rejected_calls_leave_no_balance_events() {
        let mut d = Deployment::devnet().unwrap();
        d.open_market(&[holder(1)]).unwrap();
        let mut sub = d
            .runtime
            .events()
            .subscribe(EventFilter::topics(vec![EventTopic::Ledger]));

        let ledger = d.runtime.ledger_mut();
        assert!(ledger.mint(MINTER, holder(2), 10, 10).is_err());
        ledger.mint(MINTER, holder(1), 10, 10).unwrap();

        let record = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout waiting for event")
            .expect("bus closed");
        assert!(matches!(
            record.event,
            LedgerEvent::Minted { amount: 10, .. }
        ));
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_journal_rebuilds_governed_ledger() {
        let mut d = Deployment::devnet().unwrap();
        d.open_market(&[holder(1), holder(2)]).unwrap();
        d.governed(&LedgerCall::GrantRole {
            role: shared_types::LedgerRole::Burner,
            account: holder(9),
        })
        .unwrap();

        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 1_000, 1_000).unwrap();
        ledger.transfer(holder(1), holder(2), 333).unwrap();
        ledger.burn(holder(9), holder(2), 111).unwrap();

        let addresses = d.runtime.addresses();
        let records = d.runtime.events().records();
        let rebuilt = replay::rebuild(&records, addresses.ledger).unwrap();
        assert_eq!(rebuilt, d.runtime.ledger().export_snapshot());
    }
}
