//! # Ledger Properties
//!
//! Supply/backing and compliance properties, exercised through a deployed
//! runtime with the real operator roles.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{
        holder, Deployment, BURNER, COMPLIANCE_OFFICER, MINTER, PAUSER, WHITELIST_MANAGER,
    };
    use proptest::prelude::*;
    use rc_01_ledger::{BackedLedgerApi, LedgerError, LedgerQueries};
    use shared_types::{Address, ErrorKind};

    fn market(holders: &[Address]) -> Deployment {
        let mut deployment = Deployment::devnet().unwrap();
        deployment.open_market(holders).unwrap();
        deployment
    }

    // =========================================================================
    // EXACT SCENARIOS
    // =========================================================================

    #[test]
    fn test_mint_on_empty_ledger() {
        let mut d = market(&[holder(1)]);
        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 1000, 1000).unwrap();

        assert_eq!(ledger.total_supply(), 1000);
        assert_eq!(ledger.total_backing(), 1000);
        assert_eq!(ledger.backing_of(&holder(1)), 1000);
    }

    #[test]
    fn test_full_burn_of_sole_holder() {
        let mut d = market(&[holder(1)]);
        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 1000, 1000).unwrap();
        let receipt = ledger.burn(BURNER, holder(1), 1000).unwrap();

        assert_eq!(receipt.backing_removed, 1000);
        assert_eq!(ledger.total_supply(), 0);
        assert_eq!(ledger.total_backing(), 0);
        assert_eq!(ledger.backing_of(&holder(1)), 0);
    }

    #[test]
    fn test_transfer_splits_exactly() {
        let mut d = market(&[holder(1), holder(2)]);
        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 1000, 1000).unwrap();
        ledger.transfer(holder(1), holder(2), 250).unwrap();

        assert_eq!(ledger.balance_of(&holder(1)), 750);
        assert_eq!(ledger.backing_of(&holder(1)), 750);
        assert_eq!(ledger.balance_of(&holder(2)), 250);
        assert_eq!(ledger.backing_of(&holder(2)), 250);
        assert!(d.runtime.validate().is_ok());
    }

    #[test]
    fn test_mint_requires_strict_backing() {
        let mut d = market(&[holder(1)]);
        let ledger = d.runtime.ledger_mut();
        let err = ledger.mint(MINTER, holder(1), 1000, 999).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(matches!(
            ledger.mint(MINTER, holder(1), 1000, 0),
            Err(LedgerError::InvalidBacking)
        ));
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn test_operators_cannot_exceed_their_role() {
        let mut d = market(&[holder(1)]);
        let ledger = d.runtime.ledger_mut();
        for caller in [BURNER, PAUSER, WHITELIST_MANAGER, COMPLIANCE_OFFICER, holder(1)] {
            let err = ledger.mint(caller, holder(1), 1, 1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Authorization);
        }
        // Nobody outside governance may hand out roles.
        let err = ledger
            .grant_role(MINTER, shared_types::LedgerRole::Minter, holder(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_pause_blocks_balances_but_not_whitelisting() {
        let mut d = market(&[holder(1), holder(2)]);
        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 100, 100).unwrap();
        ledger.pause(PAUSER).unwrap();

        assert!(matches!(
            ledger.transfer(holder(1), holder(2), 1),
            Err(LedgerError::Paused)
        ));
        assert!(ledger.mint(MINTER, holder(1), 1, 1).is_err());
        assert!(ledger
            .update_whitelist(WHITELIST_MANAGER, holder(3), true)
            .unwrap());

        ledger.unpause(PAUSER).unwrap();
        ledger.transfer(holder(1), holder(2), 1).unwrap();
    }

    #[test]
    fn test_transfers_disabled_is_compliance_error() {
        let mut d = market(&[holder(1), holder(2)]);
        let ledger = d.runtime.ledger_mut();
        ledger.mint(MINTER, holder(1), 100, 100).unwrap();
        ledger.set_transfers_enabled(COMPLIANCE_OFFICER, false).unwrap();

        let err = ledger.transfer(holder(1), holder(2), 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compliance);
    }

    #[test]
    fn test_whitelist_batch_cap() {
        let mut d = market(&[]);
        let cap = d.runtime.config().ledger.max_whitelist_batch;
        let accounts: Vec<Address> = (1..=cap as u64 + 1).map(holder).collect();
        let ledger = d.runtime.ledger_mut();

        let err = ledger
            .batch_update_whitelist(WHITELIST_MANAGER, &accounts, true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(!ledger.is_whitelisted(&holder(1)));

        assert_eq!(
            ledger
                .batch_update_whitelist(WHITELIST_MANAGER, &accounts[..cap], true)
                .unwrap(),
            cap
        );
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Mint { to: u64, amount: u128 },
        Burn { from: u64, amount: u128 },
        Transfer { from: u64, to: u64, amount: u128 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..5, 1u128..1_000_000).prop_map(|(to, amount)| Op::Mint { to, amount }),
            (1u64..5, 1u128..1_000_000).prop_map(|(from, amount)| Op::Burn { from, amount }),
            (1u64..5, 1u64..5, 1u128..1_000_000)
                .prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_supply_equals_backing_after_every_operation(
            ops in proptest::collection::vec(op(), 1..60)
        ) {
            let holders: Vec<Address> = (1..5).map(holder).collect();
            let mut d = market(&holders);
            let ledger = d.runtime.ledger_mut();

            for op in ops {
                match op {
                    Op::Mint { to, amount } => {
                        let _ = ledger.mint(MINTER, holder(to), amount, amount);
                    }
                    Op::Burn { from, amount } => {
                        let before = ledger.balance_of(&holder(from));
                        let result = ledger.burn(BURNER, holder(from), amount);
                        if result.is_ok() && amount == before {
                            prop_assert_eq!(ledger.backing_of(&holder(from)), 0);
                        }
                    }
                    Op::Transfer { from, to, amount } => {
                        let (a, b) = (holder(from), holder(to));
                        let before = ledger.backing_of(&a) + ledger.backing_of(&b);
                        let _ = ledger.transfer(a, b, amount);
                        prop_assert_eq!(ledger.backing_of(&a) + ledger.backing_of(&b), before);
                    }
                }
                prop_assert_eq!(ledger.total_supply(), ledger.total_backing());
            }
            prop_assert!(ledger.validate().is_ok());
        }

        #[test]
        fn prop_transfer_to_unlisted_always_fails(amount in 1u128..u128::MAX / 2) {
            let mut d = market(&[holder(1)]);
            let ledger = d.runtime.ledger_mut();
            ledger.mint(MINTER, holder(1), 1_000, 1_000).unwrap();

            let err = ledger.transfer(holder(1), holder(99), amount).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Compliance);
            prop_assert_eq!(ledger.balance_of(&holder(1)), 1_000);
        }
    }
}
