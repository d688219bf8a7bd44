//! # Ledger Events
//!
//! Defines every event that flows through the shared bus. The set is complete
//! enough that balances, backing, whitelist, flags, roles and governance
//! lifecycles can be rebuilt from the journal alone.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, AnyRole, Hash, Timestamp};

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // LEDGER: BALANCES AND BACKING
    // =========================================================================
    /// Units were minted against deposited backing.
    Minted {
        to: Address,
        amount: Amount,
        backing: Amount,
    },

    /// Units were burned and their proportional backing released.
    Burned {
        from: Address,
        amount: Amount,
        backing: Amount,
    },

    /// Units and their proportional backing moved between accounts.
    Transferred {
        from: Address,
        to: Address,
        amount: Amount,
        backing: Amount,
    },

    /// An allowance was set.
    Approved {
        owner: Address,
        spender: Address,
        amount: Amount,
    },

    /// An externally attested reserve figure was recorded.
    BackingUpdated {
        attested_reserve: Amount,
        total_backing: Amount,
        reference: Hash,
        by: Address,
    },

    // =========================================================================
    // LEDGER: COMPLIANCE AND FLAGS
    // =========================================================================
    /// A whitelist entry changed.
    WhitelistUpdated { account: Address, whitelisted: bool },

    /// Ordinary transfers were enabled or disabled.
    TransfersToggled { enabled: bool, by: Address },

    /// A call was rejected by the compliance gate. Audit record only.
    ComplianceViolation {
        operation: String,
        account: Address,
        reason: String,
    },

    /// Balance movements were paused.
    Paused { by: Address },

    /// Balance movements were resumed.
    Unpaused { by: Address },

    /// A state-version upgrade was authorized.
    UpgradeAuthorized {
        from_version: u32,
        to_version: u32,
        by: Address,
    },

    /// A snapshot was restored and migrated.
    StateMigrated { from_version: u32, to_version: u32 },

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================
    /// A role was granted.
    RoleGranted {
        role: AnyRole,
        account: Address,
        sender: Address,
    },

    /// A role was revoked or renounced.
    RoleRevoked {
        role: AnyRole,
        account: Address,
        sender: Address,
    },

    // =========================================================================
    // MULTI-PARTY EXECUTOR
    // =========================================================================
    /// A proposal was submitted.
    ProposalSubmitted {
        id: u64,
        tx_hash: Hash,
        nonce: u64,
        target: Address,
        value: Amount,
        submitter: Address,
    },

    /// An owner confirmed a proposal.
    ProposalConfirmed {
        id: u64,
        owner: Address,
        confirmations: usize,
    },

    /// An owner revoked a confirmation.
    ConfirmationRevoked {
        id: u64,
        owner: Address,
        confirmations: usize,
    },

    /// A proposal reached its threshold and its call succeeded.
    ProposalExecuted { id: u64, tx_hash: Hash },

    /// An owner was added.
    OwnerAdded { owner: Address },

    /// An owner was removed.
    OwnerRemoved { owner: Address },

    /// The confirmation threshold changed.
    ThresholdChanged { threshold: usize },

    // =========================================================================
    // SCHEDULED OPERATION QUEUE
    // =========================================================================
    /// An operation was scheduled.
    OperationScheduled {
        id: Hash,
        target: Address,
        value: Amount,
        predecessor: Hash,
        ready_at: Timestamp,
    },

    /// A scheduled operation was executed.
    OperationExecuted { id: Hash, target: Address },

    /// A scheduled operation was cancelled.
    OperationCancelled { id: Hash },

    /// The minimum delay changed.
    MinDelayChanged { old: u64, new: u64 },
}

impl LedgerEvent {
    /// Returns the topic of this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Minted { .. }
            | Self::Burned { .. }
            | Self::Transferred { .. }
            | Self::Approved { .. }
            | Self::BackingUpdated { .. }
            | Self::Paused { .. }
            | Self::Unpaused { .. }
            | Self::UpgradeAuthorized { .. }
            | Self::StateMigrated { .. } => EventTopic::Ledger,
            Self::WhitelistUpdated { .. }
            | Self::TransfersToggled { .. }
            | Self::ComplianceViolation { .. } => EventTopic::Compliance,
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => EventTopic::Access,
            Self::ProposalSubmitted { .. }
            | Self::ProposalConfirmed { .. }
            | Self::ConfirmationRevoked { .. }
            | Self::ProposalExecuted { .. }
            | Self::OwnerAdded { .. }
            | Self::OwnerRemoved { .. }
            | Self::ThresholdChanged { .. } => EventTopic::Multisig,
            Self::OperationScheduled { .. }
            | Self::OperationExecuted { .. }
            | Self::OperationCancelled { .. }
            | Self::MinDelayChanged { .. } => EventTopic::Timelock,
        }
    }
}

/// Event topics for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Balance, backing, pause and version events.
    Ledger,
    /// Whitelist, transfer toggles and compliance violations.
    Compliance,
    /// Role grants and revocations.
    Access,
    /// Multi-party executor lifecycle.
    Multisig,
    /// Scheduled operation lifecycle.
    Timelock,
    /// All topics.
    All,
}

/// A journal entry: an event stamped with its position and emitting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the journal.
    pub sequence: u64,
    /// Address of the engine that emitted the event.
    pub emitter: Address,
    /// The event.
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Serializes the record as a single JSON line for audit export.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the record cannot be encoded.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Filter for event subscriptions and journal queries.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Emitting engines to include. Empty means all emitters.
    pub emitters: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            emitters: Vec::new(),
        }
    }

    /// Create a filter for specific emitting engines.
    #[must_use]
    pub fn from_emitters(emitters: Vec<Address>) -> Self {
        Self {
            topics: Vec::new(),
            emitters,
        }
    }

    /// Check if a record matches this filter.
    #[must_use]
    pub fn matches(&self, record: &EventRecord) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&record.event.topic());

        let emitter_match = self.emitters.is_empty() || self.emitters.contains(&record.emitter);

        topic_match && emitter_match
    }
}
