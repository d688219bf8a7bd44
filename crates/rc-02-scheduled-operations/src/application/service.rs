//! Scheduled Operation Queue
//!
//! Delay-gated execution of arbitrary calls:
//! 1. A PROPOSER schedules `(call, predecessor, salt)` with `delay >= min_delay`
//! 2. Once `now >= ready_at` and the predecessor is executed, an EXECUTOR
//!    runs the stored call
//! 3. A CANCELLER may cancel while the operation is still scheduled
//!
//! Execution validates first, performs the call, and only marks the operation
//! executed when the call succeeded; a failed call leaves it scheduled and
//! retryable.

use crate::calls::TimelockCall;
use crate::config::TimelockConfig;
use crate::domain::{
    hash_operation, OperationCall, OperationState, ScheduleError, ScheduledOperation,
};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{Address, Amount, CallError, CallTarget, Hash, RoleTable, TimeSource, TimelockRole};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The delay-gated queue.
pub struct ScheduledOperationQueue {
    address: Address,
    min_delay: u64,
    roles: RoleTable<TimelockRole>,
    operations: BTreeMap<Hash, ScheduledOperation>,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventPublisher>,
}

impl ScheduledOperationQueue {
    /// Creates a queue at `address`.
    ///
    /// Both the queue itself and `admin` hold TIMELOCK_ADMIN; the admin is
    /// expected to hand out the other roles and renounce.
    ///
    /// # Errors
    ///
    /// - `ZeroAddress` if `address` or `admin` is the zero address
    pub fn new(
        address: Address,
        config: TimelockConfig,
        admin: Address,
        clock: Arc<dyn TimeSource>,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self, ScheduleError> {
        if address.is_zero() || admin.is_zero() {
            return Err(ScheduleError::ZeroAddress);
        }

        let mut queue = Self {
            address,
            min_delay: config.min_delay_secs,
            roles: RoleTable::new(),
            operations: BTreeMap::new(),
            clock,
            events,
        };
        queue.record_grant(TimelockRole::Admin, address, address);
        queue.record_grant(TimelockRole::Admin, admin, address);

        info!(
            address = %address,
            min_delay = queue.min_delay,
            "Scheduled operation queue initialised"
        );
        Ok(queue)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    pub fn has_role(&self, role: TimelockRole, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    /// # Errors
    ///
    /// - `UnknownOperation` if no operation has this id
    pub fn operation(&self, id: &Hash) -> Result<&ScheduledOperation, ScheduleError> {
        self.operations
            .get(id)
            .ok_or(ScheduleError::UnknownOperation(*id))
    }

    /// State of `id`; `Unset` if it was never scheduled.
    pub fn state_of(&self, id: &Hash) -> OperationState {
        self.operations
            .get(id)
            .map_or(OperationState::Unset, |op| op.state)
    }

    /// True while scheduled, ready or not.
    pub fn is_pending(&self, id: &Hash) -> bool {
        self.state_of(id) == OperationState::Scheduled
    }

    /// True if scheduled and the ready timestamp has passed.
    pub fn is_ready(&self, id: &Hash) -> bool {
        self.operations
            .get(id)
            .is_some_and(|op| op.is_ready_at(self.clock.now()))
    }

    pub fn is_done(&self, id: &Hash) -> bool {
        self.state_of(id) == OperationState::Executed
    }

    /// Ready timestamp of `id`, if it was ever scheduled.
    pub fn timestamp_of(&self, id: &Hash) -> Option<u64> {
        self.operations.get(id).map(|op| op.ready_at)
    }

    /// Operations still scheduled, in id order.
    pub fn pending_operations(&self) -> Vec<&ScheduledOperation> {
        self.operations
            .values()
            .filter(|op| op.state == OperationState::Scheduled)
            .collect()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Schedules `call` to become executable after `delay` seconds.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is a PROPOSER
    /// - `ZeroAddress` if the call targets the zero address
    /// - `DelayTooShort` if `delay < min_delay`
    /// - `AlreadyScheduled` if the id exists in any state
    pub fn schedule(
        &mut self,
        caller: Address,
        call: OperationCall,
        predecessor: Hash,
        salt: Hash,
        delay: u64,
    ) -> Result<Hash, ScheduleError> {
        self.require_role(TimelockRole::Proposer, caller)?;
        if call.target.is_zero() {
            return Err(ScheduleError::ZeroAddress);
        }
        if delay < self.min_delay {
            return Err(ScheduleError::DelayTooShort {
                delay,
                min_delay: self.min_delay,
            });
        }

        let id = hash_operation(&call, &predecessor, &salt);
        if let Some(existing) = self.operations.get(&id) {
            return Err(ScheduleError::AlreadyScheduled {
                id,
                state: existing.state,
            });
        }
        let ready_at = self
            .clock
            .now()
            .checked_add(delay)
            .ok_or(ScheduleError::DelayOverflow { delay })?;

        self.emit(LedgerEvent::OperationScheduled {
            id,
            target: call.target,
            value: call.value,
            predecessor,
            ready_at,
        });
        info!(
            id = %id,
            target = %call.target,
            ready_at,
            proposer = %caller,
            "Operation scheduled"
        );

        self.operations.insert(
            id,
            ScheduledOperation {
                id,
                call,
                predecessor,
                salt,
                ready_at,
                state: OperationState::Scheduled,
                scheduled_by: caller,
            },
        );
        Ok(id)
    }

    /// Executes a ready operation through `downstream`.
    ///
    /// Calls targeting the queue itself are applied internally with the queue
    /// as caller; everything else goes to `downstream`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller (or the zero address) is an EXECUTOR
    /// - `UnknownOperation`, `NotPending`, `NotReady`, `PredecessorNotDone`
    /// - `CallFailed` if the target rejected the call; the operation stays scheduled
    pub fn execute(
        &mut self,
        caller: Address,
        id: Hash,
        downstream: &mut dyn CallTarget,
    ) -> Result<Vec<u8>, ScheduleError> {
        if !self.roles.has_role(TimelockRole::Executor, &Address::ZERO) {
            self.require_role(TimelockRole::Executor, caller)?;
        }
        let op = self.operation(&id)?;
        if op.state != OperationState::Scheduled {
            return Err(ScheduleError::NotPending {
                id,
                state: op.state,
            });
        }
        let now = self.clock.now();
        if now < op.ready_at {
            return Err(ScheduleError::NotReady {
                id,
                ready_at: op.ready_at,
                now,
            });
        }
        if op.has_predecessor() && !self.is_done(&op.predecessor) {
            return Err(ScheduleError::PredecessorNotDone {
                id,
                predecessor: op.predecessor,
            });
        }
        let call = op.call.clone();

        let result = if call.target == self.address {
            self.handle_call(self.address, call.value, &call.payload, downstream)
        } else {
            downstream.call(self.address, call.target, call.value, &call.payload)
        };

        match result {
            Ok(output) => {
                if let Some(op) = self.operations.get_mut(&id) {
                    op.state = OperationState::Executed;
                }
                self.emit(LedgerEvent::OperationExecuted {
                    id,
                    target: call.target,
                });
                info!(id = %id, target = %call.target, executor = %caller, "Operation executed");
                Ok(output)
            }
            Err(source) => {
                warn!(id = %id, target = %call.target, error = %source, "Operation call failed");
                Err(ScheduleError::CallFailed { id, source })
            }
        }
    }

    /// Cancels a scheduled operation. Cancelled ids can never be rescheduled.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is a CANCELLER
    /// - `UnknownOperation`, `NotPending`
    pub fn cancel(&mut self, caller: Address, id: Hash) -> Result<(), ScheduleError> {
        self.require_role(TimelockRole::Canceller, caller)?;

        let op = self
            .operations
            .get_mut(&id)
            .ok_or(ScheduleError::UnknownOperation(id))?;
        if op.state != OperationState::Scheduled {
            return Err(ScheduleError::NotPending {
                id,
                state: op.state,
            });
        }
        op.state = OperationState::Cancelled;

        self.emit(LedgerEvent::OperationCancelled { id });
        info!(id = %id, canceller = %caller, "Operation cancelled");
        Ok(())
    }

    /// Changes the minimum delay. Only the queue itself may call this, so a
    /// change is always subject to the current delay.
    ///
    /// # Errors
    ///
    /// - `NotSelfCall` unless `caller` is the queue's own address
    pub fn update_delay(&mut self, caller: Address, new_delay: u64) -> Result<(), ScheduleError> {
        if caller != self.address {
            return Err(ScheduleError::NotSelfCall { caller });
        }

        let old = self.min_delay;
        self.min_delay = new_delay;
        self.emit(LedgerEvent::MinDelayChanged {
            old,
            new: new_delay,
        });
        info!(old, new = new_delay, "Minimum delay changed");
        Ok(())
    }

    /// Grants `role`. Returns false if `account` already held it.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is TIMELOCK_ADMIN
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: TimelockRole,
        account: Address,
    ) -> Result<bool, ScheduleError> {
        self.require_role(TimelockRole::Admin, caller)?;
        if account.is_zero() && role != TimelockRole::Executor {
            return Err(ScheduleError::ZeroAddress);
        }
        Ok(self.record_grant(role, account, caller))
    }

    /// Revokes `role`. Returns false if `account` did not hold it.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the caller is TIMELOCK_ADMIN
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: TimelockRole,
        account: Address,
    ) -> Result<bool, ScheduleError> {
        self.require_role(TimelockRole::Admin, caller)?;
        Ok(self.record_revoke(role, account, caller))
    }

    /// Drops one of the caller's own roles.
    pub fn renounce_role(&mut self, caller: Address, role: TimelockRole) -> bool {
        self.record_revoke(role, caller, caller)
    }

    /// Decodes and applies a [`TimelockCall`] on behalf of `caller`.
    ///
    /// `downstream` receives the calls of operations executed by this one.
    ///
    /// # Errors
    ///
    /// - `NotPayable` if `value != 0`
    /// - `MalformedPayload` if the payload is not a `TimelockCall`
    /// - `Reverted` with the queue error's kind otherwise
    pub fn handle_call(
        &mut self,
        caller: Address,
        value: Amount,
        payload: &[u8],
        downstream: &mut dyn CallTarget,
    ) -> Result<Vec<u8>, CallError> {
        if value != 0 {
            return Err(CallError::NotPayable(value));
        }
        let call = TimelockCall::decode(payload)?;
        debug!(caller = %caller, call = ?call, "Queue call");

        let result = match call {
            TimelockCall::Schedule {
                call,
                predecessor,
                salt,
                delay,
            } => self
                .schedule(caller, call, predecessor, salt, delay)
                .map(|id| id.as_bytes().to_vec()),
            TimelockCall::Execute { id } => self.execute(caller, id, downstream),
            TimelockCall::Cancel { id } => self.cancel(caller, id).map(|()| Vec::new()),
            TimelockCall::UpdateDelay { new_delay } => {
                self.update_delay(caller, new_delay).map(|()| Vec::new())
            }
            TimelockCall::GrantRole { role, account } => self
                .grant_role(caller, role, account)
                .map(|changed| vec![u8::from(changed)]),
            TimelockCall::RevokeRole { role, account } => self
                .revoke_role(caller, role, account)
                .map(|changed| vec![u8::from(changed)]),
            TimelockCall::RenounceRole { role } => {
                Ok(vec![u8::from(self.renounce_role(caller, role))])
            }
        };
        result.map_err(|err| CallError::reverted(err.kind(), err))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn require_role(&self, role: TimelockRole, caller: Address) -> Result<(), ScheduleError> {
        if self.roles.has_role(role, &caller) {
            Ok(())
        } else {
            Err(ScheduleError::Unauthorized { caller, role })
        }
    }

    fn record_grant(&mut self, role: TimelockRole, account: Address, sender: Address) -> bool {
        let granted = self.roles.grant(role, account);
        if granted {
            self.emit(LedgerEvent::RoleGranted {
                role: role.into(),
                account,
                sender,
            });
            debug!(role = %role, account = %account, "Queue role granted");
        }
        granted
    }

    fn record_revoke(&mut self, role: TimelockRole, account: Address, sender: Address) -> bool {
        let revoked = self.roles.revoke(role, &account);
        if revoked {
            self.emit(LedgerEvent::RoleRevoked {
                role: role.into(),
                account,
                sender,
            });
            debug!(role = %role, account = %account, "Queue role revoked");
        }
        revoked
    }

    fn emit(&self, event: LedgerEvent) {
        self.events.publish(self.address, event);
    }
}

impl std::fmt::Debug for ScheduledOperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledOperationQueue")
            .field("address", &self.address)
            .field("min_delay", &self.min_delay)
            .field("operations", &self.operations.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::InMemoryEventBus;
    use shared_types::{ErrorKind, ManualTimeSource};

    const QUEUE: u64 = 0x71;
    const ADMIN: u64 = 0xA0;
    const PROPOSER: u64 = 0xB0;
    const TARGET: u64 = 0xC0;
    const DELAY: u64 = 172_800;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    /// Call target that records calls and fails on demand.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Address, Address, Vec<u8>)>,
        fail: bool,
    }

    impl CallTarget for Recorder {
        fn call(
            &mut self,
            caller: Address,
            target: Address,
            _value: Amount,
            payload: &[u8],
        ) -> Result<Vec<u8>, CallError> {
            if self.fail {
                return Err(CallError::reverted(ErrorKind::Compliance, "rejected"));
            }
            self.calls.push((caller, target, payload.to_vec()));
            Ok(b"ok".to_vec())
        }
    }

    struct Fixture {
        clock: Arc<ManualTimeSource>,
        bus: Arc<InMemoryEventBus>,
        queue: ScheduledOperationQueue,
    }

    fn setup() -> Fixture {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let clock = Arc::new(ManualTimeSource::new(1_000));
        let bus = Arc::new(InMemoryEventBus::new());
        let mut queue = ScheduledOperationQueue::new(
            addr(QUEUE),
            TimelockConfig::default(),
            addr(ADMIN),
            clock.clone(),
            bus.clone(),
        )
        .unwrap();
        for role in [
            TimelockRole::Proposer,
            TimelockRole::Executor,
            TimelockRole::Canceller,
        ] {
            queue.grant_role(addr(ADMIN), role, addr(PROPOSER)).unwrap();
        }
        Fixture { clock, bus, queue }
    }

    fn target_call(payload: &[u8]) -> OperationCall {
        OperationCall::new(addr(TARGET), 0, payload.to_vec())
    }

    #[test]
    fn test_schedule_wait_execute() {
        let Fixture {
            clock, mut queue, ..
        } = setup();
        let mut target = Recorder::default();

        let id = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        assert!(queue.is_pending(&id));
        assert!(!queue.is_ready(&id));
        assert_eq!(queue.timestamp_of(&id), Some(1_000 + DELAY));

        let err = queue.execute(addr(PROPOSER), id, &mut target).unwrap_err();
        assert!(matches!(err, ScheduleError::NotReady { .. }));

        clock.advance(DELAY);
        assert!(queue.is_ready(&id));
        let output = queue.execute(addr(PROPOSER), id, &mut target).unwrap();
        assert_eq!(output, b"ok");
        assert!(queue.is_done(&id));
        assert_eq!(target.calls, vec![(addr(QUEUE), addr(TARGET), b"x".to_vec())]);

        assert!(matches!(
            queue.execute(addr(PROPOSER), id, &mut target),
            Err(ScheduleError::NotPending {
                state: OperationState::Executed,
                ..
            })
        ));
    }

    #[test]
    fn test_delay_below_minimum_rejected() {
        let Fixture { mut queue, .. } = setup();
        let err = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY - 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_duplicate_proposal_collides() {
        let Fixture { mut queue, .. } = setup();
        queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        assert!(matches!(
            queue.schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY),
            Err(ScheduleError::AlreadyScheduled { .. })
        ));
        assert!(queue
            .schedule(
                addr(PROPOSER),
                target_call(b"x"),
                Hash::ZERO,
                Hash::new([1; 32]),
                DELAY
            )
            .is_ok());
    }

    #[test]
    fn test_roles_enforced() {
        let Fixture {
            clock, mut queue, ..
        } = setup();
        let mut target = Recorder::default();
        assert!(matches!(
            queue.schedule(addr(9), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY),
            Err(ScheduleError::Unauthorized {
                role: TimelockRole::Proposer,
                ..
            })
        ));

        let id = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        clock.advance(DELAY);
        assert!(matches!(
            queue.execute(addr(9), id, &mut target),
            Err(ScheduleError::Unauthorized {
                role: TimelockRole::Executor,
                ..
            })
        ));
        assert!(queue.cancel(addr(9), id).is_err());

        queue
            .grant_role(addr(ADMIN), TimelockRole::Executor, Address::ZERO)
            .unwrap();
        assert!(queue.execute(addr(9), id, &mut target).is_ok());
    }

    #[test]
    fn test_predecessor_must_execute_first() {
        let Fixture {
            clock, mut queue, ..
        } = setup();
        let mut target = Recorder::default();
        let first = queue
            .schedule(addr(PROPOSER), target_call(b"1"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        let second = queue
            .schedule(addr(PROPOSER), target_call(b"2"), first, Hash::ZERO, DELAY)
            .unwrap();
        clock.advance(DELAY);

        assert_eq!(
            queue.execute(addr(PROPOSER), second, &mut target),
            Err(ScheduleError::PredecessorNotDone {
                id: second,
                predecessor: first
            })
        );
        queue.execute(addr(PROPOSER), first, &mut target).unwrap();
        queue.execute(addr(PROPOSER), second, &mut target).unwrap();
        assert_eq!(target.calls.len(), 2);
    }

    #[test]
    fn test_failed_call_stays_retryable() {
        let Fixture {
            clock,
            bus,
            mut queue,
        } = setup();
        let mut target = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let id = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        clock.advance(DELAY);
        let events_before = bus.len();

        let err = queue.execute(addr(PROPOSER), id, &mut target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compliance);
        assert!(queue.is_pending(&id));
        assert_eq!(bus.len(), events_before);

        target.fail = false;
        queue.execute(addr(PROPOSER), id, &mut target).unwrap();
        assert!(queue.is_done(&id));
    }

    #[test]
    fn test_cancel_is_terminal() {
        let Fixture { mut queue, .. } = setup();
        let id = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        queue.cancel(addr(PROPOSER), id).unwrap();
        assert_eq!(queue.state_of(&id), OperationState::Cancelled);
        assert!(queue.cancel(addr(PROPOSER), id).is_err());
        assert!(matches!(
            queue.schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY),
            Err(ScheduleError::AlreadyScheduled {
                state: OperationState::Cancelled,
                ..
            })
        ));
    }

    #[test]
    fn test_update_delay_only_through_queue() {
        let Fixture {
            clock, mut queue, ..
        } = setup();
        let mut target = Recorder::default();
        assert_eq!(
            queue.update_delay(addr(ADMIN), 10),
            Err(ScheduleError::NotSelfCall {
                caller: addr(ADMIN)
            })
        );

        let payload = TimelockCall::UpdateDelay { new_delay: 3_600 }
            .encode()
            .unwrap();
        let id = queue
            .schedule(
                addr(PROPOSER),
                OperationCall::new(addr(QUEUE), 0, payload),
                Hash::ZERO,
                Hash::ZERO,
                DELAY,
            )
            .unwrap();
        clock.advance(DELAY);
        queue.execute(addr(PROPOSER), id, &mut target).unwrap();

        assert_eq!(queue.min_delay(), 3_600);
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_operation_executes_another() {
        let Fixture {
            clock, mut queue, ..
        } = setup();
        let mut target = Recorder::default();
        // The queue may execute operations, so it needs the role itself.
        queue
            .grant_role(addr(ADMIN), TimelockRole::Executor, addr(QUEUE))
            .unwrap();

        let inner = queue
            .schedule(addr(PROPOSER), target_call(b"x"), Hash::ZERO, Hash::ZERO, DELAY)
            .unwrap();
        let payload = TimelockCall::Execute { id: inner }.encode().unwrap();
        let outer = queue
            .schedule(
                addr(PROPOSER),
                OperationCall::new(addr(QUEUE), 0, payload),
                Hash::ZERO,
                Hash::ZERO,
                DELAY,
            )
            .unwrap();
        clock.advance(DELAY);

        queue.execute(addr(PROPOSER), outer, &mut target).unwrap();
        assert!(queue.is_done(&inner));
        assert!(queue.is_done(&outer));
        assert_eq!(target.calls.len(), 1);
    }

    #[test]
    fn test_handle_call_schedules_for_caller() {
        let Fixture { mut queue, .. } = setup();
        let mut target = Recorder::default();
        let payload = TimelockCall::Schedule {
            call: target_call(b"x"),
            predecessor: Hash::ZERO,
            salt: Hash::ZERO,
            delay: DELAY,
        }
        .encode()
        .unwrap();

        let output = queue
            .handle_call(addr(PROPOSER), 0, &payload, &mut target)
            .unwrap();
        let id = hash_operation(&target_call(b"x"), &Hash::ZERO, &Hash::ZERO);
        assert_eq!(output, id.as_bytes().to_vec());
        assert!(queue.is_pending(&id));

        let err = queue
            .handle_call(addr(9), 0, &payload, &mut target)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(
            queue.handle_call(addr(PROPOSER), 5, &payload, &mut target),
            Err(CallError::NotPayable(5))
        );
    }
}
