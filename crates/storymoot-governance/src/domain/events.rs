//! Domain events for the governance context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

use super::proposals::CloseReason;
use super::sessions::Scope;

/// Emitted when the owner grants the rule-master role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMasterAdded {
    /// The account granted the role.
    pub account: AccountId,
    /// The owner who granted it.
    pub added_by: AccountId,
}

/// Emitted when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    /// The session identifier.
    pub session_id: u64,
    /// What part of the story the session governs.
    pub scope: Scope,
    /// The rule master who created it; the first member.
    pub creator: AccountId,
}

/// Emitted when an account joins a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    /// The session identifier.
    pub session_id: u64,
    /// The new member.
    pub member: AccountId,
    /// The rule master who enrolled them.
    pub added_by: AccountId,
}

/// Emitted when a proposal is raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreated {
    /// The proposal identifier.
    pub proposal_id: u64,
    /// The session the proposal belongs to.
    pub session_id: u64,
    /// Free-form description shown to voters.
    pub description: String,
    /// Number of options; ballots pick an index below this.
    pub option_count: u8,
    /// Electorate snapshot, sorted.
    pub eligible_voters: Vec<AccountId>,
    /// Instant after which anyone may close the proposal.
    pub deadline: DateTime<Utc>,
    /// The rule master who raised it.
    pub created_by: AccountId,
}

/// Emitted for every accepted ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCast {
    /// The proposal voted on.
    pub proposal_id: u64,
    /// The voter.
    pub voter: AccountId,
    /// The chosen option index.
    pub option: u8,
}

/// Emitted when a proposal reaches its terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalClosed {
    /// The proposal identifier.
    pub proposal_id: u64,
    /// The session the proposal belongs to.
    pub session_id: u64,
    /// Tally frozen at closure.
    pub final_tally: Vec<u64>,
    /// Highest-tallied option, lowest index on ties.
    pub winning_option: u8,
    /// Why the proposal closed.
    pub reason: CloseReason,
    /// The account whose call closed it (the last voter on auto-close).
    pub closed_by: AccountId,
}

/// Event type identifier for [`RuleMasterAdded`].
pub const RULE_MASTER_ADDED_EVENT_TYPE: &str = "governance.rule_master_added";

/// Event type identifier for [`SessionCreated`].
pub const SESSION_CREATED_EVENT_TYPE: &str = "governance.session_created";

/// Event type identifier for [`MemberAdded`].
pub const MEMBER_ADDED_EVENT_TYPE: &str = "governance.member_added";

/// Event type identifier for [`ProposalCreated`].
pub const PROPOSAL_CREATED_EVENT_TYPE: &str = "governance.proposal_created";

/// Event type identifier for [`VoteCast`].
pub const VOTE_CAST_EVENT_TYPE: &str = "governance.vote_cast";

/// Event type identifier for [`ProposalClosed`].
pub const PROPOSAL_CLOSED_EVENT_TYPE: &str = "governance.proposal_closed";

/// Event payload variants for the governance context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEventKind {
    /// A rule master has been added.
    RuleMasterAdded(RuleMasterAdded),
    /// A session has been created.
    SessionCreated(SessionCreated),
    /// A member has joined a session.
    MemberAdded(MemberAdded),
    /// A proposal has been raised.
    ProposalCreated(ProposalCreated),
    /// A ballot has been cast.
    VoteCast(VoteCast),
    /// A proposal has closed.
    ProposalClosed(ProposalClosed),
}

impl GovernanceEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RuleMasterAdded(_) => RULE_MASTER_ADDED_EVENT_TYPE,
            Self::SessionCreated(_) => SESSION_CREATED_EVENT_TYPE,
            Self::MemberAdded(_) => MEMBER_ADDED_EVENT_TYPE,
            Self::ProposalCreated(_) => PROPOSAL_CREATED_EVENT_TYPE,
            Self::VoteCast(_) => VOTE_CAST_EVENT_TYPE,
            Self::ProposalClosed(_) => PROPOSAL_CLOSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the governance context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GovernanceEventKind,
}

impl GovernanceEvent {
    /// Wraps a payload caused directly by the command `correlation_id`.
    #[must_use]
    pub fn new(
        kind: GovernanceEventKind,
        correlation_id: Uuid,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            metadata: EventMetadata::for_command(kind.event_type(), correlation_id, occurred_at),
            kind,
        }
    }
}

impl DomainEvent for GovernanceEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
