//! Multi-Party Executor
//!
//! Nonce-ordered proposal / confirmation / execution:
//! 1. `submit` requires `nonce == current`, rejects hashes in the replay set,
//!    advances the nonce and records the submitter's confirmation
//! 2. `confirm` adds one confirmation; reaching the threshold executes the
//!    call synchronously inside the same call
//! 3. Execution writes the hash to the replay set before calling the target
//!    and removes it again if the call fails
//!
//! A failing execution inside `submit` or `confirm` aborts the whole call, so
//! nothing (not even the triggering confirmation) is kept.

use crate::calls::MultisigCall;
use crate::config::MultisigConfig;
use crate::domain::{transaction_hash, MultisigError, MultisigTransaction};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{Address, Amount, CallError, CallTarget, Hash, MultisigRole, RoleTable};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The threshold executor.
pub struct MultiPartyExecutor {
    address: Address,
    owners: RoleTable<MultisigRole>,
    threshold: usize,
    nonce: u64,
    /// Indexed by transaction id.
    transactions: Vec<MultisigTransaction>,
    /// Permanent replay set.
    executed_hashes: BTreeSet<Hash>,
    events: Arc<dyn EventPublisher>,
}

impl MultiPartyExecutor {
    /// Creates an executor at `address`.
    ///
    /// # Errors
    ///
    /// - `ZeroAddress` if `address` is the zero address
    /// - any error of [`MultisigConfig::validate`]
    pub fn new(
        address: Address,
        config: MultisigConfig,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self, MultisigError> {
        if address.is_zero() {
            return Err(MultisigError::ZeroAddress);
        }
        config.validate()?;

        let mut owners = RoleTable::new();
        for owner in &config.owners {
            owners.grant(MultisigRole::Owner, *owner);
        }
        let executor = Self {
            address,
            owners,
            threshold: config.threshold,
            nonce: 0,
            transactions: Vec::new(),
            executed_hashes: BTreeSet::new(),
            events,
        };

        for owner in &config.owners {
            executor.emit(LedgerEvent::OwnerAdded { owner: *owner });
        }
        executor.emit(LedgerEvent::ThresholdChanged {
            threshold: executor.threshold,
        });
        info!(
            address = %address,
            owners = config.owners.len(),
            threshold = config.threshold,
            "Multi-party executor initialised"
        );
        Ok(executor)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn owners(&self) -> Vec<Address> {
        self.owners.members(MultisigRole::Owner)
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.owners.has_role(MultisigRole::Owner, account)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// # Errors
    ///
    /// - `UnknownTransaction` if no transaction has this id
    pub fn transaction(&self, id: u64) -> Result<&MultisigTransaction, MultisigError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get(index))
            .ok_or(MultisigError::UnknownTransaction(id))
    }

    /// Confirmations from current owners.
    ///
    /// # Errors
    ///
    /// - `UnknownTransaction` if no transaction has this id
    pub fn confirmations(&self, id: u64) -> Result<Vec<Address>, MultisigError> {
        Ok(self
            .transaction(id)?
            .confirmations
            .iter()
            .filter(|owner| self.is_owner(owner))
            .copied()
            .collect())
    }

    pub fn is_confirmed(&self, id: u64, owner: &Address) -> bool {
        self.transaction(id)
            .is_ok_and(|tx| tx.confirmations.contains(owner))
    }

    pub fn is_hash_executed(&self, tx_hash: &Hash) -> bool {
        self.executed_hashes.contains(tx_hash)
    }

    /// Ids of transactions not yet executed.
    pub fn pending_transactions(&self) -> Vec<u64> {
        self.transactions
            .iter()
            .filter(|tx| !tx.executed)
            .map(|tx| tx.id)
            .collect()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Submits a proposal and confirms it for the submitter.
    ///
    /// With a threshold of one the proposal executes immediately.
    ///
    /// # Errors
    ///
    /// - `NotOwner`, `ZeroAddress`
    /// - `InvalidNonce` unless `nonce` equals the current counter
    /// - `AlreadyExecuted` if the hash is in the replay set
    /// - `ExecutionFailed` if immediate execution failed; nothing was recorded
    pub fn submit(
        &mut self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: Vec<u8>,
        nonce: u64,
        downstream: &mut dyn CallTarget,
    ) -> Result<u64, MultisigError> {
        self.require_owner(caller)?;
        if target.is_zero() {
            return Err(MultisigError::ZeroAddress);
        }
        if nonce != self.nonce {
            return Err(MultisigError::InvalidNonce {
                expected: self.nonce,
                got: nonce,
            });
        }
        let tx_hash = transaction_hash(&self.address, &target, value, &payload, nonce);
        if self.executed_hashes.contains(&tx_hash) {
            return Err(MultisigError::AlreadyExecuted { tx_hash });
        }

        let id = self.transactions.len() as u64;
        self.transactions.push(MultisigTransaction {
            id,
            target,
            value,
            payload,
            nonce,
            tx_hash,
            confirmations: BTreeSet::from([caller]),
            executed: false,
            submitter: caller,
        });
        self.nonce += 1;

        self.events.open_scope();
        self.emit(LedgerEvent::ProposalSubmitted {
            id,
            tx_hash,
            nonce,
            target,
            value,
            submitter: caller,
        });
        self.emit(LedgerEvent::ProposalConfirmed {
            id,
            owner: caller,
            confirmations: 1,
        });
        let executed = match self.execute_if_ready(id, downstream) {
            Ok(executed) => executed,
            Err(err) => {
                self.transactions.pop();
                self.nonce -= 1;
                self.events.close_scope(Some(self.address));
                return Err(err);
            }
        };
        if executed {
            self.emit(LedgerEvent::ProposalExecuted { id, tx_hash });
        }
        self.events.close_scope(None);
        info!(id, nonce, target = %target, submitter = %caller, executed, "Proposal submitted");
        Ok(id)
    }

    /// Confirms a proposal; executes it if this confirmation meets the threshold.
    ///
    /// Returns true if the proposal executed during this call.
    ///
    /// # Errors
    ///
    /// - `NotOwner`, `UnknownTransaction`
    /// - `TransactionExecuted` if the proposal is terminal
    /// - `AlreadyConfirmed` if the caller already confirmed
    /// - `ExecutionFailed` if execution failed; the confirmation is not kept
    pub fn confirm(
        &mut self,
        caller: Address,
        id: u64,
        downstream: &mut dyn CallTarget,
    ) -> Result<bool, MultisigError> {
        self.require_owner(caller)?;
        let index = self.pending_index(id)?;
        if !self.transactions[index].confirmations.insert(caller) {
            return Err(MultisigError::AlreadyConfirmed { id, owner: caller });
        }

        let confirmations = self.confirmation_count(index);
        self.events.open_scope();
        self.emit(LedgerEvent::ProposalConfirmed {
            id,
            owner: caller,
            confirmations,
        });
        let executed = match self.execute_if_ready(id, downstream) {
            Ok(executed) => executed,
            Err(err) => {
                self.transactions[index].confirmations.remove(&caller);
                self.events.close_scope(Some(self.address));
                return Err(err);
            }
        };
        if executed {
            let tx_hash = self.transactions[index].tx_hash;
            self.emit(LedgerEvent::ProposalExecuted { id, tx_hash });
        }
        self.events.close_scope(None);
        debug!(id, owner = %caller, confirmations, executed, "Proposal confirmed");
        Ok(executed)
    }

    /// Withdraws the caller's confirmation.
    ///
    /// # Errors
    ///
    /// - `NotOwner`, `UnknownTransaction`, `TransactionExecuted`
    /// - `NotConfirmed` if the caller had not confirmed
    pub fn revoke_confirmation(&mut self, caller: Address, id: u64) -> Result<(), MultisigError> {
        self.require_owner(caller)?;
        let index = self.pending_index(id)?;
        if !self.transactions[index].confirmations.remove(&caller) {
            return Err(MultisigError::NotConfirmed { id, owner: caller });
        }

        let confirmations = self.confirmation_count(index);
        self.emit(LedgerEvent::ConfirmationRevoked {
            id,
            owner: caller,
            confirmations,
        });
        debug!(id, owner = %caller, confirmations, "Confirmation revoked");
        Ok(())
    }

    /// Executes a proposal whose confirmations already meet the threshold,
    /// e.g. after the threshold was lowered or a failed execution.
    ///
    /// # Errors
    ///
    /// - `NotOwner`, `UnknownTransaction`, `TransactionExecuted`
    /// - `ThresholdNotMet` if there are too few confirmations
    /// - `ExecutionFailed` if the call failed
    pub fn execute(
        &mut self,
        caller: Address,
        id: u64,
        downstream: &mut dyn CallTarget,
    ) -> Result<Vec<u8>, MultisigError> {
        self.require_owner(caller)?;
        let index = self.pending_index(id)?;
        let confirmations = self.confirmation_count(index);
        if confirmations < self.threshold {
            return Err(MultisigError::ThresholdNotMet {
                id,
                confirmations,
                threshold: self.threshold,
            });
        }

        let output = self.run(index, downstream)?;
        let tx_hash = self.transactions[index].tx_hash;
        self.emit(LedgerEvent::ProposalExecuted { id, tx_hash });
        Ok(output)
    }

    /// Adds an owner. Self-call only.
    ///
    /// # Errors
    ///
    /// - `NotSelfCall`, `ZeroAddress`, `DuplicateOwner`
    pub fn add_owner(&mut self, caller: Address, owner: Address) -> Result<(), MultisigError> {
        self.require_self(caller)?;
        if owner.is_zero() {
            return Err(MultisigError::ZeroAddress);
        }
        if !self.owners.grant(MultisigRole::Owner, owner) {
            return Err(MultisigError::DuplicateOwner(owner));
        }
        self.emit(LedgerEvent::OwnerAdded { owner });
        info!(owner = %owner, "Owner added");
        Ok(())
    }

    /// Removes an owner. Self-call only; the threshold must stay reachable.
    ///
    /// # Errors
    ///
    /// - `NotSelfCall`, `OwnerNotFound`
    /// - `InvalidThreshold` if fewer owners than the threshold would remain
    pub fn remove_owner(&mut self, caller: Address, owner: Address) -> Result<(), MultisigError> {
        self.require_self(caller)?;
        if !self.is_owner(&owner) {
            return Err(MultisigError::OwnerNotFound(owner));
        }
        let remaining = self.owners.member_count(MultisigRole::Owner) - 1;
        if remaining < self.threshold {
            return Err(MultisigError::InvalidThreshold {
                threshold: self.threshold,
                owners: remaining,
            });
        }

        self.owners.revoke(MultisigRole::Owner, &owner);
        self.emit(LedgerEvent::OwnerRemoved { owner });
        info!(owner = %owner, "Owner removed");
        Ok(())
    }

    /// Changes the threshold. Self-call only.
    ///
    /// # Errors
    ///
    /// - `NotSelfCall`
    /// - `InvalidThreshold` unless `1 <= threshold <= owners`
    pub fn change_threshold(
        &mut self,
        caller: Address,
        threshold: usize,
    ) -> Result<(), MultisigError> {
        self.require_self(caller)?;
        let owners = self.owners.member_count(MultisigRole::Owner);
        if threshold == 0 || threshold > owners {
            return Err(MultisigError::InvalidThreshold { threshold, owners });
        }

        self.threshold = threshold;
        self.emit(LedgerEvent::ThresholdChanged { threshold });
        info!(threshold, "Threshold changed");
        Ok(())
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    fn execute_if_ready(
        &mut self,
        id: u64,
        downstream: &mut dyn CallTarget,
    ) -> Result<bool, MultisigError> {
        let index = self.pending_index(id)?;
        if self.confirmation_count(index) < self.threshold {
            return Ok(false);
        }
        self.run(index, downstream).map(|_| true)
    }

    /// Performs the call of a pending transaction.
    ///
    /// The hash enters the replay set before the call and leaves it again if
    /// the call fails, so a failed transaction stays retryable.
    fn run(
        &mut self,
        index: usize,
        downstream: &mut dyn CallTarget,
    ) -> Result<Vec<u8>, MultisigError> {
        let tx = &self.transactions[index];
        let (id, tx_hash, target, value) = (tx.id, tx.tx_hash, tx.target, tx.value);
        let payload = tx.payload.clone();

        if !self.executed_hashes.insert(tx_hash) {
            return Err(MultisigError::AlreadyExecuted { tx_hash });
        }

        let result = if target == self.address {
            self.apply_self_call(value, &payload)
        } else {
            downstream.call(self.address, target, value, &payload)
        };

        match result {
            Ok(output) => {
                self.transactions[index].executed = true;
                info!(id, tx_hash = %tx_hash, target = %target, "Proposal executed");
                Ok(output)
            }
            Err(source) => {
                self.executed_hashes.remove(&tx_hash);
                warn!(id, target = %target, error = %source, "Proposal execution failed");
                Err(MultisigError::ExecutionFailed { id, source })
            }
        }
    }

    fn apply_self_call(&mut self, value: Amount, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        if value != 0 {
            return Err(CallError::NotPayable(value));
        }
        let caller = self.address;
        let result = match MultisigCall::decode(payload)? {
            MultisigCall::AddOwner { owner } => self.add_owner(caller, owner),
            MultisigCall::RemoveOwner { owner } => self.remove_owner(caller, owner),
            MultisigCall::ChangeThreshold { threshold } => self.change_threshold(caller, threshold),
        };
        result
            .map(|()| Vec::new())
            .map_err(|err| CallError::reverted(err.kind(), err))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Index of a known, not yet executed transaction.
    fn pending_index(&self, id: u64) -> Result<usize, MultisigError> {
        let tx = self.transaction(id)?;
        if tx.executed {
            return Err(MultisigError::TransactionExecuted { id });
        }
        // `transaction` succeeded, so the id is a valid index.
        usize::try_from(id).map_err(|_| MultisigError::UnknownTransaction(id))
    }

    fn confirmation_count(&self, index: usize) -> usize {
        self.transactions[index]
            .confirmations
            .iter()
            .filter(|owner| self.is_owner(owner))
            .count()
    }

    fn require_owner(&self, caller: Address) -> Result<(), MultisigError> {
        if self.is_owner(&caller) {
            Ok(())
        } else {
            Err(MultisigError::NotOwner { caller })
        }
    }

    fn require_self(&self, caller: Address) -> Result<(), MultisigError> {
        if caller == self.address {
            Ok(())
        } else {
            Err(MultisigError::NotSelfCall { caller })
        }
    }

    fn emit(&self, event: LedgerEvent) {
        self.events.publish(self.address, event);
    }
}

impl std::fmt::Debug for MultiPartyExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPartyExecutor")
            .field("address", &self.address)
            .field("owners", &self.owners())
            .field("threshold", &self.threshold)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::InMemoryEventBus;
    use shared_types::ErrorKind;

    const MULTISIG: u64 = 0x50;
    const TARGET: u64 = 0xC0;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    /// Counts successful calls; fails while `fail` is set.
    #[derive(Default)]
    struct Counter {
        calls: usize,
        fail: bool,
    }

    impl CallTarget for Counter {
        fn call(
            &mut self,
            _caller: Address,
            _target: Address,
            _value: Amount,
            _payload: &[u8],
        ) -> Result<Vec<u8>, CallError> {
            if self.fail {
                return Err(CallError::reverted(ErrorKind::InvariantViolation, "boom"));
            }
            self.calls += 1;
            Ok(Vec::new())
        }
    }

    fn two_of_three() -> (Arc<InMemoryEventBus>, MultiPartyExecutor) {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let bus = Arc::new(InMemoryEventBus::new());
        let executor = MultiPartyExecutor::new(
            addr(MULTISIG),
            MultisigConfig::new(vec![addr(1), addr(2), addr(3)], 2),
            bus.clone(),
        )
        .unwrap();
        (bus, executor)
    }

    #[test]
    fn test_two_of_three_executes_once() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();

        let id = executor
            .submit(addr(1), addr(TARGET), 0, b"op".to_vec(), 0, &mut target)
            .unwrap();
        assert_eq!(executor.confirmations(id).unwrap(), vec![addr(1)]);
        assert_eq!(target.calls, 0);

        assert!(executor.confirm(addr(2), id, &mut target).unwrap());
        assert_eq!(target.calls, 1);
        assert!(executor.transaction(id).unwrap().executed);

        let err = executor.confirm(addr(3), id, &mut target).unwrap_err();
        assert_eq!(err, MultisigError::TransactionExecuted { id });
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(target.calls, 1);
    }

    #[test]
    fn test_nonce_must_match_exactly() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();

        executor
            .submit(addr(1), addr(TARGET), 0, b"op".to_vec(), 0, &mut target)
            .unwrap();
        let err = executor
            .submit(addr(1), addr(TARGET), 0, b"op".to_vec(), 0, &mut target)
            .unwrap_err();
        assert_eq!(
            err,
            MultisigError::InvalidNonce {
                expected: 1,
                got: 0
            }
        );
        assert_eq!(err.kind(), ErrorKind::Replay);
        assert!(executor
            .submit(addr(1), addr(TARGET), 0, b"op".to_vec(), 2, &mut target)
            .is_err());
        assert_eq!(executor.nonce(), 1);
    }

    #[test]
    fn test_double_confirmation_rejected() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();
        let id = executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();
        assert_eq!(
            executor.confirm(addr(1), id, &mut target),
            Err(MultisigError::AlreadyConfirmed { id, owner: addr(1) })
        );
    }

    #[test]
    fn test_revoke_then_reconfirm() {
        let (bus, mut executor) = two_of_three();
        let mut target = Counter::default();
        let id = executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();

        executor.revoke_confirmation(addr(1), id).unwrap();
        assert!(executor.confirmations(id).unwrap().is_empty());
        assert!(matches!(
            bus.records().last().map(|r| &r.event),
            Some(LedgerEvent::ConfirmationRevoked {
                confirmations: 0,
                ..
            })
        ));
        assert_eq!(
            executor.revoke_confirmation(addr(1), id),
            Err(MultisigError::NotConfirmed { id, owner: addr(1) })
        );

        assert!(!executor.confirm(addr(2), id, &mut target).unwrap());
        assert!(executor.confirm(addr(3), id, &mut target).unwrap());
        assert_eq!(target.calls, 1);
    }

    #[test]
    fn test_failed_execution_rolls_back_confirmation() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter {
            fail: true,
            ..Counter::default()
        };
        let id = executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();
        let tx_hash = executor.transaction(id).unwrap().tx_hash;

        let err = executor.confirm(addr(2), id, &mut target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(!executor.is_confirmed(id, &addr(2)));
        assert!(!executor.is_hash_executed(&tx_hash));
        assert!(!executor.transaction(id).unwrap().executed);

        target.fail = false;
        assert!(executor.confirm(addr(2), id, &mut target).unwrap());
        assert!(executor.is_hash_executed(&tx_hash));
    }

    #[test]
    fn test_non_owner_rejected() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();
        let err = executor
            .submit(addr(9), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_owner_management_only_by_self_call() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();
        assert_eq!(
            executor.add_owner(addr(1), addr(4)),
            Err(MultisigError::NotSelfCall { caller: addr(1) })
        );

        let payload = MultisigCall::AddOwner { owner: addr(4) }.encode().unwrap();
        let id = executor
            .submit(addr(1), addr(MULTISIG), 0, payload, 0, &mut target)
            .unwrap();
        executor.confirm(addr(2), id, &mut target).unwrap();
        assert!(executor.is_owner(&addr(4)));
        assert_eq!(target.calls, 0);

        let payload = MultisigCall::ChangeThreshold { threshold: 5 }
            .encode()
            .unwrap();
        let id = executor
            .submit(addr(4), addr(MULTISIG), 0, payload, 1, &mut target)
            .unwrap();
        let err = executor.confirm(addr(1), id, &mut target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(executor.threshold(), 2);
    }

    #[test]
    fn test_removed_owner_confirmation_not_counted() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();

        let pending = executor
            .submit(addr(3), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();

        let payload = MultisigCall::RemoveOwner { owner: addr(3) }
            .encode()
            .unwrap();
        let id = executor
            .submit(addr(1), addr(MULTISIG), 0, payload, 1, &mut target)
            .unwrap();
        executor.confirm(addr(2), id, &mut target).unwrap();
        assert!(!executor.is_owner(&addr(3)));

        assert!(executor.confirmations(pending).unwrap().is_empty());
        assert!(!executor.confirm(addr(1), pending, &mut target).unwrap());
        assert!(executor.confirm(addr(2), pending, &mut target).unwrap());
    }

    #[test]
    fn test_explicit_execute_after_threshold_drop() {
        let (_, mut executor) = two_of_three();
        let mut target = Counter::default();

        let pending = executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();
        assert!(matches!(
            executor.execute(addr(1), pending, &mut target),
            Err(MultisigError::ThresholdNotMet { .. })
        ));

        let payload = MultisigCall::ChangeThreshold { threshold: 1 }
            .encode()
            .unwrap();
        let id = executor
            .submit(addr(2), addr(MULTISIG), 0, payload, 1, &mut target)
            .unwrap();
        executor.confirm(addr(3), id, &mut target).unwrap();
        assert_eq!(executor.threshold(), 1);

        executor.execute(addr(1), pending, &mut target).unwrap();
        assert_eq!(target.calls, 1);
        assert!(executor.pending_transactions().is_empty());
    }

    #[test]
    fn test_threshold_one_executes_on_submit() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut executor =
            MultiPartyExecutor::new(addr(MULTISIG), MultisigConfig::new(vec![addr(1)], 1), bus)
                .unwrap();
        let mut target = Counter::default();

        let id = executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();
        assert!(executor.transaction(id).unwrap().executed);
        assert_eq!(target.calls, 1);

        target.fail = true;
        assert!(executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 1, &mut target)
            .is_err());
        assert_eq!(executor.nonce(), 1);
        assert_eq!(executor.transaction_count(), 1);
    }

    /// Publishes one record per call on the executor's bus, then fails
    /// while `fail` is set.
    struct Journaling {
        bus: Arc<InMemoryEventBus>,
        fail: bool,
    }

    impl CallTarget for Journaling {
        fn call(
            &mut self,
            caller: Address,
            target: Address,
            _value: Amount,
            _payload: &[u8],
        ) -> Result<Vec<u8>, CallError> {
            self.bus.publish(target, LedgerEvent::Paused { by: caller });
            if self.fail {
                return Err(CallError::reverted(ErrorKind::Compliance, "blocked"));
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_journal_lists_proposal_before_its_effects() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut executor = MultiPartyExecutor::new(
            addr(MULTISIG),
            MultisigConfig::new(vec![addr(1)], 1),
            bus.clone(),
        )
        .unwrap();
        let mut target = Journaling {
            bus: bus.clone(),
            fail: false,
        };
        let start = bus.len() as u64;

        executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 0, &mut target)
            .unwrap();
        let events: Vec<_> = bus.records_since(start).into_iter().map(|r| r.event).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], LedgerEvent::ProposalSubmitted { id: 0, .. }));
        assert!(matches!(
            events[1],
            LedgerEvent::ProposalConfirmed { confirmations: 1, .. }
        ));
        assert_eq!(events[2], LedgerEvent::Paused { by: addr(MULTISIG) });
        assert!(matches!(events[3], LedgerEvent::ProposalExecuted { id: 0, .. }));

        // A failed run keeps the target's record but none of the executor's.
        target.fail = true;
        let start = bus.len() as u64;
        assert!(executor
            .submit(addr(1), addr(TARGET), 0, Vec::new(), 1, &mut target)
            .is_err());
        let records = bus.records_since(start);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].emitter, addr(TARGET));
        assert_eq!(records[0].sequence, start);
    }

    proptest::proptest! {
        #[test]
        fn prop_accepted_nonces_are_sequential(
            attempts in proptest::collection::vec((0u64..4, 1u64..4, 0usize..3), 1..40)
        ) {
            let (_, mut executor) = two_of_three();
            let mut target = Counter::default();
            let mut accepted = Vec::new();

            for (skew, submitter, confirmer) in attempts {
                let nonce = executor.nonce().saturating_sub(1) + skew;
                let expected = executor.nonce();
                let result = executor.submit(
                    addr(submitter),
                    addr(TARGET),
                    0,
                    Vec::new(),
                    nonce,
                    &mut target,
                );
                match result {
                    Ok(id) => {
                        proptest::prop_assert_eq!(nonce, expected);
                        accepted.push(executor.transaction(id).unwrap().tx_hash);
                        let _ = executor.confirm(addr(confirmer as u64 + 1), id, &mut target);
                    }
                    Err(err) => proptest::prop_assert_eq!(err.kind(), ErrorKind::Replay),
                }
            }

            proptest::prop_assert_eq!(executor.nonce() as usize, accepted.len());
            let distinct: BTreeSet<_> = accepted.iter().collect();
            proptest::prop_assert_eq!(distinct.len(), accepted.len());
            let executed = accepted.iter().filter(|h| executor.is_hash_executed(h)).count();
            proptest::prop_assert_eq!(executed, target.calls);
        }
    }
}
