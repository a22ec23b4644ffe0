//! The governance engine.
//!
//! A single owner for the rule-master set, the session table, and the
//! proposal table. Every mutation takes `&mut self`, so the host decides how
//! calls are sequenced (the API wraps the engine in one `RwLock`). Events are
//! published only after the state change that produced them is committed.

use std::sync::Arc;

use storymoot_core::account::AccountId;
use storymoot_core::aggregate::AggregateRoot;
use storymoot_core::clock::Clock;
use storymoot_core::error::DomainError;
use storymoot_core::event::DomainEvent;
use storymoot_core::notification::NotificationSink;
use tracing::{debug, info, instrument};

use crate::domain::access_control::AccessControlRegistry;
use crate::domain::commands::{
    AddRuleMaster, AddUserToSession, CastVote, CloseProposal, CreateProposal, CreateSession,
};
use crate::domain::events::GovernanceEvent;
use crate::domain::proposals::{Proposal, ProposalStore};
use crate::domain::sessions::{Session, SessionRegistry};

/// Result of a successfully created proposal.
#[derive(Debug)]
pub struct ProposalCreatedResult {
    /// The id assigned to the new proposal.
    pub proposal_id: u64,
    /// The committed events.
    pub events: Vec<GovernanceEvent>,
}

/// Session-scoped governance engine.
pub struct GovernanceEngine {
    access: AccessControlRegistry,
    sessions: SessionRegistry,
    proposals: ProposalStore,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink<GovernanceEvent>>,
}

impl std::fmt::Debug for GovernanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceEngine")
            .field("access", &self.access)
            .field("sessions", &self.sessions)
            .field("proposals", &self.proposals)
            .finish_non_exhaustive()
    }
}

impl GovernanceEngine {
    /// Creates an engine bootstrapped by `owner`, who starts as the only
    /// rule master.
    #[must_use]
    pub fn new(
        owner: AccountId,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink<GovernanceEvent>>,
    ) -> Self {
        Self {
            access: AccessControlRegistry::new(owner),
            sessions: SessionRegistry::new(),
            proposals: ProposalStore::new(),
            clock,
            sink,
        }
    }

    fn publish(&self, events: &[GovernanceEvent]) {
        for event in events {
            info!(
                event_id = %event.metadata.event_id,
                event_type = event.event_type(),
                "committed governance event"
            );
            self.sink.publish(event);
        }
    }

    // --- commands ---

    /// Grants the rule-master role. Granting it twice commits nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if the caller is not the owner.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            target = %command.target
        )
    )]
    pub fn add_rule_master(
        &mut self,
        command: &AddRuleMaster,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        let event = self.access.add_rule_master(
            &command.caller,
            &command.target,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        let events: Vec<GovernanceEvent> = event.into_iter().collect();
        if events.is_empty() {
            debug!("account already holds the rule-master role");
        }
        self.publish(&events);
        Ok(events)
    }

    /// Creates a session with the caller as its first member.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` or `DomainError::DuplicateSession`.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            session_id = command.session_id
        )
    )]
    pub fn create_session(
        &mut self,
        command: &CreateSession,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        let events = self.sessions.create_session(
            &self.access,
            &command.caller,
            command.session_id,
            command.scope,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        self.publish(&events);
        Ok(events)
    }

    /// Enrolls a user in a session. Enrolling a member twice commits nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` or `DomainError::SessionNotFound`.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            session_id = command.session_id,
            user = %command.user
        )
    )]
    pub fn add_user_to_session(
        &mut self,
        command: &AddUserToSession,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        let events = self.sessions.add_user_to_session(
            &self.access,
            &command.caller,
            command.session_id,
            &command.user,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        if events.is_empty() {
            debug!("user is already a session member");
        }
        self.publish(&events);
        Ok(events)
    }

    /// Raises a proposal with an electorate snapshot taken now.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized`, `DomainError::SessionNotFound`,
    /// `DomainError::InvalidOptionCount`, or `DomainError::EmptyElectorate`.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            session_id = command.session_id
        )
    )]
    pub fn create_proposal(
        &mut self,
        command: &CreateProposal,
    ) -> Result<ProposalCreatedResult, DomainError> {
        let (proposal_id, events) = self.proposals.create_proposal(
            &self.access,
            &self.sessions,
            &command.caller,
            command.session_id,
            command.description.clone(),
            command.duration_seconds,
            command.option_count,
            &command.eligible_voters,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        self.publish(&events);
        Ok(ProposalCreatedResult {
            proposal_id,
            events,
        })
    }

    /// Casts a ballot. The ballot that completes participation also closes
    /// the proposal, within this call.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound`, `DomainError::ProposalClosed`,
    /// `DomainError::NotEligible`, `DomainError::AlreadyVoted`, or
    /// `DomainError::InvalidOption`.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            proposal_id = command.proposal_id,
            option = command.option
        )
    )]
    pub fn vote(&mut self, command: &CastVote) -> Result<Vec<GovernanceEvent>, DomainError> {
        let proposal = self.proposals.get_mut(command.proposal_id)?;
        proposal.cast_vote(
            &command.caller,
            command.option,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        let events = proposal.commit();
        self.publish(&events);
        Ok(events)
    }

    /// Closes a proposal: early by a rule master, or by anyone once the
    /// deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound`, `DomainError::ProposalClosed`,
    /// or `DomainError::Unauthorized`.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            caller = %command.caller,
            proposal_id = command.proposal_id
        )
    )]
    pub fn close_proposal(
        &mut self,
        command: &CloseProposal,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        let caller_is_rule_master = self.access.is_rule_master(&command.caller);
        let proposal = self.proposals.get_mut(command.proposal_id)?;
        proposal.close(
            &command.caller,
            caller_is_rule_master,
            command.correlation_id,
            self.clock.as_ref(),
        )?;
        let events = proposal.commit();
        self.publish(&events);
        Ok(events)
    }

    // --- queries ---

    /// Returns the bootstrap owner.
    #[must_use]
    pub fn owner(&self) -> &AccountId {
        self.access.owner()
    }

    /// Returns whether `account` holds the rule-master role.
    #[must_use]
    pub fn is_rule_master(&self, account: &AccountId) -> bool {
        self.access.is_rule_master(account)
    }

    /// Returns all rule masters in address order.
    #[must_use]
    pub fn rule_masters(&self) -> Vec<AccountId> {
        self.access.rule_masters().cloned().collect()
    }

    /// Returns whether `account` is a member of the session.
    #[must_use]
    pub fn is_member(&self, session_id: u64, account: &AccountId) -> bool {
        self.sessions.is_member(session_id, account)
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound`.
    pub fn session(&self, session_id: u64) -> Result<&Session, DomainError> {
        self.sessions.get(session_id)
    }

    /// Returns the ids of proposals raised in the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound`.
    pub fn proposals_for_session(&self, session_id: u64) -> Result<Vec<u64>, DomainError> {
        self.sessions.get(session_id)?;
        Ok(self.proposals.ids_for_session(session_id))
    }

    /// Looks up a proposal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound`.
    pub fn proposal(&self, proposal_id: u64) -> Result<&Proposal, DomainError> {
        self.proposals.get(proposal_id)
    }

    /// Returns the current tally, whatever the proposal's state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound`.
    pub fn results(&self, proposal_id: u64) -> Result<Vec<u64>, DomainError> {
        self.proposals.results(proposal_id).map(<[u64]>::to_vec)
    }

    /// Returns the winning option of a closed proposal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotFound` or `DomainError::ProposalActive`.
    pub fn resolve(&self, proposal_id: u64) -> Result<u8, DomainError> {
        self.proposals.get(proposal_id)?.resolve()
    }
}
