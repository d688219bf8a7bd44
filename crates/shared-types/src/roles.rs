//! # Roles
//!
//! Closed role enums for every subsystem and the generic [`RoleTable`] that
//! maps a role to the set of identities holding it.
//!
//! Roles are plain tagged enums: authorization is a table lookup keyed by the
//! enum, never a comparison against string or byte constants.

use crate::entities::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Marker for a closed set of roles.
pub trait RoleTag:
    Copy + Ord + fmt::Debug + fmt::Display + Into<AnyRole> + Send + Sync + 'static
{
    /// Every role in the set, in declaration order.
    const ALL: &'static [Self];
}

/// Roles of the backed ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerRole {
    /// Grants and revokes every ledger role.
    Admin,
    /// May mint against deposited backing.
    Minter,
    /// May burn and release backing.
    Burner,
    /// May pause and unpause balance movements.
    Pauser,
    /// May authorize a state-version upgrade.
    Upgrader,
    /// May add and remove whitelist entries.
    WhitelistManager,
    /// May toggle ordinary transfers.
    ComplianceOfficer,
}

impl RoleTag for LedgerRole {
    const ALL: &'static [Self] = &[
        Self::Admin,
        Self::Minter,
        Self::Burner,
        Self::Pauser,
        Self::Upgrader,
        Self::WhitelistManager,
        Self::ComplianceOfficer,
    ];
}

impl fmt::Display for LedgerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "ADMIN",
            Self::Minter => "MINTER",
            Self::Burner => "BURNER",
            Self::Pauser => "PAUSER",
            Self::Upgrader => "UPGRADER",
            Self::WhitelistManager => "WHITELIST_MANAGER",
            Self::ComplianceOfficer => "COMPLIANCE_OFFICER",
        };
        f.write_str(name)
    }
}

/// Roles of the scheduled operation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimelockRole {
    /// Grants and revokes every queue role.
    Admin,
    /// May schedule operations.
    Proposer,
    /// May execute ready operations. Held by the zero address means "anyone".
    Executor,
    /// May cancel scheduled operations.
    Canceller,
}

impl RoleTag for TimelockRole {
    const ALL: &'static [Self] = &[Self::Admin, Self::Proposer, Self::Executor, Self::Canceller];
}

impl fmt::Display for TimelockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "TIMELOCK_ADMIN",
            Self::Proposer => "PROPOSER",
            Self::Executor => "EXECUTOR",
            Self::Canceller => "CANCELLER",
        };
        f.write_str(name)
    }
}

/// Roles of the multi-party executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MultisigRole {
    /// May submit, confirm, revoke and execute proposals.
    Owner,
}

impl RoleTag for MultisigRole {
    const ALL: &'static [Self] = &[Self::Owner];
}

impl fmt::Display for MultisigRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OWNER")
    }
}

/// Any role of any subsystem, used in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnyRole {
    /// A ledger role.
    Ledger(LedgerRole),
    /// A scheduled-operation queue role.
    Timelock(TimelockRole),
    /// A multi-party executor role.
    Multisig(MultisigRole),
}

impl From<LedgerRole> for AnyRole {
    fn from(role: LedgerRole) -> Self {
        Self::Ledger(role)
    }
}

impl From<TimelockRole> for AnyRole {
    fn from(role: TimelockRole) -> Self {
        Self::Timelock(role)
    }
}

impl From<MultisigRole> for AnyRole {
    fn from(role: MultisigRole) -> Self {
        Self::Multisig(role)
    }
}

impl fmt::Display for AnyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ledger(role) => role.fmt(f),
            Self::Timelock(role) => role.fmt(f),
            Self::Multisig(role) => role.fmt(f),
        }
    }
}

// =============================================================================
// ROLE TABLE
// =============================================================================

/// Role → set of authorized identities.
///
/// The table itself performs no authorization; the owning engine decides who
/// may call `grant`/`revoke`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "R: Serialize + Ord",
    deserialize = "R: Deserialize<'de> + Ord"
))]
pub struct RoleTable<R> {
    members: BTreeMap<R, BTreeSet<Address>>,
}

impl<R> Default for RoleTable<R> {
    fn default() -> Self {
        Self {
            members: BTreeMap::new(),
        }
    }
}

impl<R: RoleTag> RoleTable<R> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `account` holds `role`.
    #[must_use]
    pub fn has_role(&self, role: R, account: &Address) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(account))
    }

    /// Adds `account` to `role`. Returns false if it already held the role.
    pub fn grant(&mut self, role: R, account: Address) -> bool {
        self.members.entry(role).or_default().insert(account)
    }

    /// Removes `account` from `role`. Returns false if it did not hold the role.
    pub fn revoke(&mut self, role: R, account: &Address) -> bool {
        let Some(set) = self.members.get_mut(&role) else {
            return false;
        };
        let removed = set.remove(account);
        if set.is_empty() {
            self.members.remove(&role);
        }
        removed
    }

    /// Returns the holders of `role` in address order.
    #[must_use]
    pub fn members(&self, role: R) -> Vec<Address> {
        self.members
            .get(&role)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of holders of `role`.
    #[must_use]
    pub fn member_count(&self, role: R) -> usize {
        self.members.get(&role).map_or(0, BTreeSet::len)
    }

    /// Returns every role held by `account`.
    #[must_use]
    pub fn roles_of(&self, account: &Address) -> Vec<R> {
        R::ALL
            .iter()
            .copied()
            .filter(|role| self.has_role(*role, account))
            .collect()
    }
}
