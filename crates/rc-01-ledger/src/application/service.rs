//! Reserve Ledger Service
//!
//! Owns every piece of ledger state and routes each call through the
//! pipeline:
//! 1. Input validation (zero address, zero amount)
//! 2. Transfer gate (role, pause, compliance)
//! 3. Backing invariant engine (compute, check, commit)
//! 4. Event publication
//!
//! Nothing is published for a rejected call except compliance violations,
//! which are audit records.

use crate::calls::LedgerCall;
use crate::config::LedgerConfig;
use crate::domain::{
    mul_div, AllowanceEntry, AttestedReserve, BackingInvariantEngine, BurnReceipt, LedgerError,
    LedgerFlags, LedgerOperation, MintReceipt, Rounding, TransferReceipt, WhitelistRegistry,
};
use crate::gate::{GateContext, GateRequest, TransferGate};
use crate::ports::inbound::{BackedLedgerApi, LedgerQueries};
use crate::snapshot::{migrate, LedgerSnapshot, STATE_VERSION};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    Address, Amount, CallError, CallTarget, Hash, LedgerRole, RoleTable, SCALE,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The backed ledger.
pub struct ReserveLedgerService {
    address: Address,
    config: LedgerConfig,
    engine: BackingInvariantEngine,
    whitelist: WhitelistRegistry,
    roles: RoleTable<LedgerRole>,
    flags: LedgerFlags,
    allowances: BTreeMap<(Address, Address), Amount>,
    attested_reserve: Option<AttestedReserve>,
    authorized_version: u32,
    gate: TransferGate,
    events: Arc<dyn EventPublisher>,
}

impl ReserveLedgerService {
    /// Creates an empty ledger at `address` with `admin` holding ADMIN.
    ///
    /// # Errors
    ///
    /// - `ZeroAddress` if `address` or `admin` is the zero address
    pub fn new(
        address: Address,
        config: LedgerConfig,
        admin: Address,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self, LedgerError> {
        if address.is_zero() || admin.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let mut roles = RoleTable::new();
        roles.grant(LedgerRole::Admin, admin);

        let service = Self {
            address,
            flags: LedgerFlags {
                paused: false,
                transfers_enabled: config.transfers_enabled,
            },
            config,
            engine: BackingInvariantEngine::new(),
            whitelist: WhitelistRegistry::new(),
            roles,
            allowances: BTreeMap::new(),
            attested_reserve: None,
            authorized_version: STATE_VERSION,
            gate: TransferGate::standard(),
            events,
        };

        service.emit(LedgerEvent::RoleGranted {
            role: LedgerRole::Admin.into(),
            account: admin,
            sender: admin,
        });
        if service.flags.transfers_enabled {
            service.emit(LedgerEvent::TransfersToggled {
                enabled: true,
                by: admin,
            });
        }

        info!(
            address = %service.address,
            symbol = %service.config.symbol,
            admin = %admin,
            "Reserve ledger initialised"
        );
        Ok(service)
    }

    /// Rebuilds a ledger from a snapshot, migrating it to the current layout.
    ///
    /// The migrated state must pass every invariant, including per-account
    /// sums, before it is accepted.
    ///
    /// # Errors
    ///
    /// - any error of [`migrate`]
    /// - `SupplyBackingMismatch` / `InconsistentSnapshot` if the state is invalid
    /// - `ZeroAddress` if `address` is the zero address
    pub fn restore(
        address: Address,
        config: LedgerConfig,
        snapshot: LedgerSnapshot,
        events: Arc<dyn EventPublisher>,
    ) -> Result<Self, LedgerError> {
        if address.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let from_version = snapshot.version;
        let snapshot = migrate(snapshot)?;

        let totals = snapshot.totals.ok_or_else(|| {
            LedgerError::InconsistentSnapshot("migrated snapshot without totals".to_string())
        })?;
        let engine = BackingInvariantEngine::from_parts(snapshot.account_store(), totals)?;

        let mut allowances = BTreeMap::new();
        for entry in &snapshot.allowances {
            if entry.owner.is_zero() || entry.spender.is_zero() {
                return Err(LedgerError::InconsistentSnapshot(
                    "allowance with zero address".to_string(),
                ));
            }
            allowances.insert((entry.owner, entry.spender), entry.amount);
        }

        let service = Self {
            address,
            config,
            engine,
            whitelist: snapshot.whitelist.iter().copied().collect(),
            roles: snapshot.roles,
            flags: snapshot.flags,
            allowances,
            attested_reserve: snapshot.attested_reserve,
            authorized_version: snapshot.authorized_version,
            gate: TransferGate::standard(),
            events,
        };

        if from_version != STATE_VERSION {
            service.emit(LedgerEvent::StateMigrated {
                from_version,
                to_version: STATE_VERSION,
            });
        }
        info!(
            address = %address,
            from_version,
            accounts = service.engine.store().len(),
            total_supply = service.engine.total_supply(),
            "Reserve ledger restored from snapshot"
        );
        Ok(service)
    }

    /// Exports the full state in the current layout.
    pub fn export_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: STATE_VERSION,
            authorized_version: self.authorized_version,
            accounts: self
                .engine
                .store()
                .iter()
                .map(|(address, account)| (*address, *account))
                .collect(),
            totals: Some(self.engine.totals()),
            whitelist: self.whitelist.iter().copied().collect(),
            roles: self.roles.clone(),
            flags: self.flags,
            allowances: self
                .allowances
                .iter()
                .map(|((owner, spender), amount)| AllowanceEntry {
                    owner: *owner,
                    spender: *spender,
                    amount: *amount,
                })
                .collect(),
            attested_reserve: self.attested_reserve,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn engine(&self) -> &BackingInvariantEngine {
        &self.engine
    }

    pub fn roles(&self) -> &RoleTable<LedgerRole> {
        &self.roles
    }

    pub fn state_version(&self) -> u32 {
        STATE_VERSION
    }

    pub fn authorized_version(&self) -> u32 {
        self.authorized_version
    }

    pub fn attested_reserve(&self) -> Option<AttestedReserve> {
        self.attested_reserve
    }

    /// Attested reserve over total backing, scaled by [`SCALE`].
    ///
    /// `None` without an attestation or while nothing is backed.
    pub fn reserve_coverage(&self) -> Option<Amount> {
        let reserve = self.attested_reserve?;
        let total_backing = self.engine.total_backing();
        if total_backing == 0 {
            return None;
        }
        mul_div(reserve.amount, SCALE, total_backing, Rounding::Floor).ok()
    }

    /// Full O(accounts) invariant check.
    ///
    /// # Errors
    ///
    /// Any invariant failure.
    pub fn validate(&self) -> Result<(), LedgerError> {
        self.engine.validate()
    }

    // =========================================================================
    // PIPELINE HELPERS
    // =========================================================================

    fn emit(&self, event: LedgerEvent) {
        self.events.publish(self.address, event);
    }

    fn authorize(&self, caller: Address, request: GateRequest) -> Result<(), LedgerError> {
        let ctx = GateContext {
            caller,
            roles: &self.roles,
            whitelist: &self.whitelist,
            flags: self.flags,
            custodial_account: self.config.custodial_account,
        };
        self.gate.authorize(&ctx, &request).inspect_err(|err| {
            if err.kind() == shared_types::ErrorKind::Compliance {
                self.record_violation(caller, &request, err);
            }
        })
    }

    fn record_violation(&self, caller: Address, request: &GateRequest, err: &LedgerError) {
        let account = match err {
            LedgerError::NotWhitelisted { account }
            | LedgerError::NotCustodialAccount { account, .. } => *account,
            _ => request.source.unwrap_or(caller),
        };
        warn!(
            operation = %request.operation,
            caller = %caller,
            account = %account,
            reason = %err,
            "Compliance violation"
        );
        self.emit(LedgerEvent::ComplianceViolation {
            operation: request.operation.name().to_string(),
            account,
            reason: err.to_string(),
        });
    }

    fn require_role(
        &self,
        caller: Address,
        operation: LedgerOperation,
    ) -> Result<(), LedgerError> {
        self.authorize(caller, GateRequest::new(operation))
    }

    fn move_units(
        &mut self,
        caller: Address,
        operation: LedgerOperation,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        if from.is_zero() || to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        self.authorize(caller, GateRequest::transfer(operation, from, to))?;

        if operation == LedgerOperation::TransferFrom {
            let available = self.allowance(&from, &caller);
            if available < amount {
                return Err(LedgerError::InsufficientAllowance {
                    required: amount,
                    available,
                });
            }
        }

        let receipt = self.engine.transfer(from, to, amount)?;

        if operation == LedgerOperation::TransferFrom {
            let available = self.allowance(&from, &caller);
            if available != Amount::MAX {
                let remaining = available - amount;
                self.allowances.insert((from, caller), remaining);
                self.emit(LedgerEvent::Approved {
                    owner: from,
                    spender: caller,
                    amount: remaining,
                });
            }
        }

        self.emit(LedgerEvent::Transferred {
            from,
            to,
            amount,
            backing: receipt.backing_moved,
        });
        debug!(
            from = %from,
            to = %to,
            amount,
            backing = receipt.backing_moved,
            "Transferred"
        );
        Ok(receipt)
    }

    fn dispatch(&mut self, caller: Address, call: LedgerCall) -> Result<(), LedgerError> {
        match call {
            LedgerCall::Mint {
                to,
                amount,
                backing,
            } => self.mint(caller, to, amount, backing).map(drop),
            LedgerCall::Burn { from, amount } => self.burn(caller, from, amount).map(drop),
            LedgerCall::Transfer { to, amount } => self.transfer(caller, to, amount).map(drop),
            LedgerCall::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, amount).map(drop)
            }
            LedgerCall::Approve { spender, amount } => self.approve(caller, spender, amount),
            LedgerCall::UpdateWhitelist {
                account,
                whitelisted,
            } => self.update_whitelist(caller, account, whitelisted).map(drop),
            LedgerCall::BatchUpdateWhitelist {
                accounts,
                whitelisted,
            } => self
                .batch_update_whitelist(caller, &accounts, whitelisted)
                .map(drop),
            LedgerCall::SetTransfersEnabled { enabled } => {
                self.set_transfers_enabled(caller, enabled)
            }
            LedgerCall::Pause => self.pause(caller),
            LedgerCall::Unpause => self.unpause(caller),
            LedgerCall::GrantRole { role, account } => {
                self.grant_role(caller, role, account).map(drop)
            }
            LedgerCall::RevokeRole { role, account } => {
                self.revoke_role(caller, role, account).map(drop)
            }
            LedgerCall::RenounceRole { role } => self.renounce_role(caller, role).map(drop),
            LedgerCall::AttestReserve { amount, reference } => {
                self.attest_reserve(caller, amount, reference)
            }
            LedgerCall::AuthorizeUpgrade { to_version } => {
                self.authorize_upgrade(caller, to_version)
            }
        }
    }
}

impl BackedLedgerApi for ReserveLedgerService {
    fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
        backing: Amount,
    ) -> Result<MintReceipt, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.authorize(caller, GateRequest::mint(to))?;

        let receipt = self.engine.mint(to, amount, backing)?;
        self.emit(LedgerEvent::Minted {
            to,
            amount,
            backing,
        });
        info!(
            to = %to,
            amount,
            backing,
            total_supply = self.engine.total_supply(),
            "Minted"
        );
        Ok(receipt)
    }

    fn burn(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
    ) -> Result<BurnReceipt, LedgerError> {
        if from.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.authorize(caller, GateRequest::burn(from))?;

        let receipt = self.engine.burn(from, amount)?;
        self.emit(LedgerEvent::Burned {
            from,
            amount,
            backing: receipt.backing_removed,
        });
        info!(
            from = %from,
            amount,
            backing = receipt.backing_removed,
            total_supply = self.engine.total_supply(),
            "Burned"
        );
        Ok(receipt)
    }

    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        self.move_units(caller, LedgerOperation::Transfer, caller, to, amount)
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferReceipt, LedgerError> {
        self.move_units(caller, LedgerOperation::TransferFrom, from, to, amount)
    }

    fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if caller.is_zero() || spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.require_role(caller, LedgerOperation::Approve)?;

        if amount == 0 {
            self.allowances.remove(&(caller, spender));
        } else {
            self.allowances.insert((caller, spender), amount);
        }
        self.emit(LedgerEvent::Approved {
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    fn update_whitelist(
        &mut self,
        caller: Address,
        account: Address,
        whitelisted: bool,
    ) -> Result<bool, LedgerError> {
        self.require_role(caller, LedgerOperation::UpdateWhitelist)?;

        let changed = self.whitelist.set(account, whitelisted)?;
        if changed {
            self.emit(LedgerEvent::WhitelistUpdated {
                account,
                whitelisted,
            });
            info!(account = %account, whitelisted, by = %caller, "Whitelist updated");
        }
        Ok(changed)
    }

    fn batch_update_whitelist(
        &mut self,
        caller: Address,
        accounts: &[Address],
        whitelisted: bool,
    ) -> Result<usize, LedgerError> {
        self.require_role(caller, LedgerOperation::UpdateWhitelist)?;

        let changed =
            self.whitelist
                .set_batch(accounts, whitelisted, self.config.max_whitelist_batch)?;
        for account in &changed {
            self.emit(LedgerEvent::WhitelistUpdated {
                account: *account,
                whitelisted,
            });
        }
        info!(
            requested = accounts.len(),
            changed = changed.len(),
            whitelisted,
            by = %caller,
            "Batch whitelist update"
        );
        Ok(changed.len())
    }

    fn set_transfers_enabled(&mut self, caller: Address, enabled: bool) -> Result<(), LedgerError> {
        self.require_role(caller, LedgerOperation::SetTransfersEnabled)?;

        self.flags.transfers_enabled = enabled;
        self.emit(LedgerEvent::TransfersToggled {
            enabled,
            by: caller,
        });
        info!(enabled, by = %caller, "Transfers toggled");
        Ok(())
    }

    fn pause(&mut self, caller: Address) -> Result<(), LedgerError> {
        self.require_role(caller, LedgerOperation::Pause)?;
        if self.flags.paused {
            return Err(LedgerError::Paused);
        }

        self.flags.paused = true;
        self.emit(LedgerEvent::Paused { by: caller });
        warn!(by = %caller, "Ledger paused");
        Ok(())
    }

    fn unpause(&mut self, caller: Address) -> Result<(), LedgerError> {
        self.require_role(caller, LedgerOperation::Unpause)?;
        if !self.flags.paused {
            return Err(LedgerError::NotPaused);
        }

        self.flags.paused = false;
        self.emit(LedgerEvent::Unpaused { by: caller });
        info!(by = %caller, "Ledger unpaused");
        Ok(())
    }

    fn grant_role(
        &mut self,
        caller: Address,
        role: LedgerRole,
        account: Address,
    ) -> Result<bool, LedgerError> {
        self.require_role(caller, LedgerOperation::GrantRole)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }

        let granted = self.roles.grant(role, account);
        if granted {
            self.emit(LedgerEvent::RoleGranted {
                role: role.into(),
                account,
                sender: caller,
            });
            info!(role = %role, account = %account, by = %caller, "Role granted");
        }
        Ok(granted)
    }

    fn revoke_role(
        &mut self,
        caller: Address,
        role: LedgerRole,
        account: Address,
    ) -> Result<bool, LedgerError> {
        self.require_role(caller, LedgerOperation::RevokeRole)?;

        let revoked = self.roles.revoke(role, &account);
        if revoked {
            self.emit(LedgerEvent::RoleRevoked {
                role: role.into(),
                account,
                sender: caller,
            });
            info!(role = %role, account = %account, by = %caller, "Role revoked");
        }
        Ok(revoked)
    }

    fn renounce_role(&mut self, caller: Address, role: LedgerRole) -> Result<bool, LedgerError> {
        self.require_role(caller, LedgerOperation::RenounceRole)?;

        let revoked = self.roles.revoke(role, &caller);
        if revoked {
            self.emit(LedgerEvent::RoleRevoked {
                role: role.into(),
                account: caller,
                sender: caller,
            });
            info!(role = %role, account = %caller, "Role renounced");
        }
        Ok(revoked)
    }

    fn attest_reserve(
        &mut self,
        caller: Address,
        amount: Amount,
        reference: Hash,
    ) -> Result<(), LedgerError> {
        self.require_role(caller, LedgerOperation::AttestReserve)?;

        self.attested_reserve = Some(AttestedReserve {
            amount,
            reference,
            recorded_by: caller,
        });
        self.emit(LedgerEvent::BackingUpdated {
            attested_reserve: amount,
            total_backing: self.engine.total_backing(),
            reference,
            by: caller,
        });

        let total_backing = self.engine.total_backing();
        if amount < total_backing {
            warn!(
                attested = amount,
                total_backing, "Attested reserve below total backing"
            );
        } else {
            info!(attested = amount, total_backing, "Reserve attested");
        }
        Ok(())
    }

    fn authorize_upgrade(&mut self, caller: Address, to_version: u32) -> Result<(), LedgerError> {
        self.require_role(caller, LedgerOperation::AuthorizeUpgrade)?;
        if to_version <= self.authorized_version {
            return Err(LedgerError::InvalidUpgrade {
                current: self.authorized_version,
                requested: to_version,
            });
        }

        let from_version = self.authorized_version;
        self.authorized_version = to_version;
        self.emit(LedgerEvent::UpgradeAuthorized {
            from_version,
            to_version,
            by: caller,
        });
        warn!(from_version, to_version, by = %caller, "Upgrade authorized");
        Ok(())
    }
}

impl LedgerQueries for ReserveLedgerService {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn symbol(&self) -> &str {
        &self.config.symbol
    }

    fn decimals(&self) -> u8 {
        self.config.decimals
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.engine.balance_of(account)
    }

    fn backing_of(&self, account: &Address) -> Amount {
        self.engine.backing_of(account)
    }

    fn total_supply(&self) -> Amount {
        self.engine.total_supply()
    }

    fn total_backing(&self) -> Amount {
        self.engine.total_backing()
    }

    fn backing_per_unit(&self) -> Amount {
        self.engine.backing_per_unit()
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.is_whitelisted(account)
    }

    fn has_role(&self, role: LedgerRole, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    fn is_paused(&self) -> bool {
        self.flags.paused
    }

    fn transfers_enabled(&self) -> bool {
        self.flags.transfers_enabled
    }
}

impl CallTarget for ReserveLedgerService {
    fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: Amount,
        payload: &[u8],
    ) -> Result<Vec<u8>, CallError> {
        if target != self.address {
            return Err(CallError::UnknownTarget(target));
        }
        if value != 0 {
            return Err(CallError::NotPayable(value));
        }

        let call = LedgerCall::decode(payload)?;
        let name = call.name();
        debug!(caller = %caller, call = name, "Ledger call");

        self.dispatch(caller, call)
            .map(|()| Vec::new())
            .map_err(|err| CallError::reverted(err.kind(), err))
    }
}

impl std::fmt::Debug for ReserveLedgerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReserveLedgerService")
            .field("address", &self.address)
            .field("symbol", &self.config.symbol)
            .field("total_supply", &self.engine.total_supply())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
