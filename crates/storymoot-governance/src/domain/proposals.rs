//! Proposals raised within a session.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_core::aggregate::AggregateRoot;
use storymoot_core::clock::Clock;
use storymoot_core::error::DomainError;
use uuid::Uuid;

use super::access_control::AccessControlRegistry;
use super::events::{GovernanceEvent, GovernanceEventKind, ProposalCreated};
use super::sessions::SessionRegistry;

/// Proposal lifecycle state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Accepting votes.
    Active,
    /// Tally frozen.
    Closed,
}

/// Why a proposal closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Every eligible voter voted.
    AllVotesCast,
    /// A rule master terminated it early.
    RuleMaster,
    /// Someone closed it after its deadline.
    Timeout,
}

/// Closure details recorded on a closed proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    /// When the proposal closed.
    pub closed_at: DateTime<Utc>,
    /// Why it closed.
    pub reason: CloseReason,
    /// Whose call closed it.
    pub closed_by: AccountId,
}

/// The aggregate root for a proposal.
///
/// `tally` and `votes_cast` change only in [`AggregateRoot::apply`], one
/// `VoteCast` at a time, so `sum(tally) == votes_cast.len()` always holds.
#[derive(Debug)]
pub struct Proposal {
    /// Aggregate identifier.
    pub id: u64,
    pub(crate) session_id: u64,
    pub(crate) description: String,
    pub(crate) option_count: u8,
    pub(crate) eligible_voters: BTreeSet<AccountId>,
    pub(crate) deadline: DateTime<Utc>,
    pub(crate) state: ProposalState,
    pub(crate) tally: Vec<u64>,
    pub(crate) votes_cast: BTreeSet<AccountId>,
    pub(crate) closure: Option<Closure>,
    pub(crate) version: u64,
    pub(crate) uncommitted_events: Vec<GovernanceEvent>,
}

impl Proposal {
    /// Opens a new active proposal with a pending `ProposalCreated` event.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        id: u64,
        session_id: u64,
        description: String,
        option_count: u8,
        eligible_voters: BTreeSet<AccountId>,
        deadline: DateTime<Utc>,
        created_by: AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let event = GovernanceEvent::new(
            GovernanceEventKind::ProposalCreated(ProposalCreated {
                proposal_id: id,
                session_id,
                description: description.clone(),
                option_count,
                eligible_voters: eligible_voters.iter().cloned().collect(),
                deadline,
                created_by,
            }),
            correlation_id,
            clock.now(),
        );
        Self {
            id,
            session_id,
            description,
            option_count,
            eligible_voters,
            deadline,
            state: ProposalState::Active,
            tally: vec![0; usize::from(option_count)],
            votes_cast: BTreeSet::new(),
            closure: None,
            version: 0,
            uncommitted_events: vec![event],
        }
    }

    /// Returns the owning session.
    #[must_use]
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the number of options.
    #[must_use]
    pub fn option_count(&self) -> u8 {
        self.option_count
    }

    /// Returns the electorate snapshot in address order.
    pub fn eligible_voters(&self) -> impl Iterator<Item = &AccountId> {
        self.eligible_voters.iter()
    }

    /// Returns whether `account` may vote.
    #[must_use]
    pub fn is_eligible(&self, account: &AccountId) -> bool {
        self.eligible_voters.contains(account)
    }

    /// Returns the accounts that have voted, in address order.
    pub fn votes_cast(&self) -> impl Iterator<Item = &AccountId> {
        self.votes_cast.iter()
    }

    /// Returns whether `account` has voted.
    #[must_use]
    pub fn has_voted(&self, account: &AccountId) -> bool {
        self.votes_cast.contains(account)
    }

    /// Returns the deadline after which anyone may close the proposal.
    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProposalState {
        self.state
    }

    /// Returns the per-option vote counts.
    #[must_use]
    pub fn tally(&self) -> &[u64] {
        &self.tally
    }

    /// Returns closure details once closed.
    #[must_use]
    pub fn closure(&self) -> Option<&Closure> {
        self.closure.as_ref()
    }
}

impl AggregateRoot for Proposal {
    type Event = GovernanceEvent;

    fn aggregate_id(&self) -> u64 {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            GovernanceEventKind::ProposalCreated(payload) => {
                self.session_id = payload.session_id;
                self.description.clone_from(&payload.description);
                self.option_count = payload.option_count;
                self.eligible_voters = payload.eligible_voters.iter().cloned().collect();
                self.deadline = payload.deadline;
                self.state = ProposalState::Active;
                self.tally = vec![0; usize::from(payload.option_count)];
                self.votes_cast.clear();
            }
            GovernanceEventKind::VoteCast(payload) => {
                if self.votes_cast.insert(payload.voter.clone()) {
                    self.tally[usize::from(payload.option)] += 1;
                }
            }
            GovernanceEventKind::ProposalClosed(payload) => {
                self.state = ProposalState::Closed;
                self.closure = Some(Closure {
                    closed_at: event.metadata.occurred_at,
                    reason: payload.reason,
                    closed_by: payload.closed_by.clone(),
                });
            }
            // Other kinds belong to other aggregates.
            _ => return,
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

/// Owns every proposal, keyed by id. Ids are assigned sequentially from 0.
#[derive(Debug, Default)]
pub struct ProposalStore {
    proposals: BTreeMap<u64, Proposal>,
    next_id: u64,
}

impl ProposalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises a proposal in an existing session and returns its id with the
    /// committed `ProposalCreated` event.
    ///
    /// # Errors
    ///
    /// Checked in order: `DomainError::Unauthorized` if `caller` is not a rule
    /// master, `DomainError::SessionNotFound`, `DomainError::InvalidOptionCount`
    /// if fewer than two options, `DomainError::EmptyElectorate`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_proposal(
        &mut self,
        access: &AccessControlRegistry,
        sessions: &SessionRegistry,
        caller: &AccountId,
        session_id: u64,
        description: String,
        duration_seconds: u64,
        option_count: u8,
        eligible_voters: &[AccountId],
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(u64, Vec<GovernanceEvent>), DomainError> {
        access.ensure_rule_master(caller, "create proposals")?;
        if !sessions.contains(session_id) {
            return Err(DomainError::SessionNotFound(session_id));
        }
        if option_count < 2 {
            return Err(DomainError::InvalidOptionCount(option_count));
        }
        if eligible_voters.is_empty() {
            return Err(DomainError::EmptyElectorate);
        }

        let proposal_id = self.next_id;
        let mut proposal = Proposal::open(
            proposal_id,
            session_id,
            description,
            option_count,
            eligible_voters.iter().cloned().collect(),
            clock.seconds_from_now(duration_seconds),
            caller.clone(),
            correlation_id,
            clock,
        );
        let events = proposal.commit();
        self.proposals.insert(proposal_id, proposal);
        self.next_id += 1;
        Ok((proposal_id, events))
    }

    /// Looks up a proposal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound` if the proposal does not exist.
    pub fn get(&self, proposal_id: u64) -> Result<&Proposal, DomainError> {
        self.proposals
            .get(&proposal_id)
            .ok_or(DomainError::ProposalNotFound(proposal_id))
    }

    pub(crate) fn get_mut(&mut self, proposal_id: u64) -> Result<&mut Proposal, DomainError> {
        self.proposals
            .get_mut(&proposal_id)
            .ok_or(DomainError::ProposalNotFound(proposal_id))
    }

    /// Returns the current tally, whatever the proposal's state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound` if the proposal does not exist.
    pub fn results(&self, proposal_id: u64) -> Result<&[u64], DomainError> {
        self.get(proposal_id).map(Proposal::tally)
    }

    /// Returns the ids of proposals raised in `session_id`, ascending.
    #[must_use]
    pub fn ids_for_session(&self, session_id: u64) -> Vec<u64> {
        self.proposals
            .values()
            .filter(|proposal| proposal.session_id == session_id)
            .map(|proposal| proposal.id)
            .collect()
    }
}
