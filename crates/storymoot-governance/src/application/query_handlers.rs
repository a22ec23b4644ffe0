//! Query handlers for the governance context.
//!
//! Queries take the engine's read lock, so each view is built from one
//! consistent snapshot and never observes a half-applied command.

use std::sync::{RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use storymoot_core::account::AccountId;
use storymoot_core::aggregate::AggregateRoot;
use storymoot_core::error::DomainError;

use crate::application::engine::GovernanceEngine;
use crate::domain::proposals::{CloseReason, ProposalState};
use crate::domain::sessions::Scope;

/// Read-only view of an account's rule-master status.
#[derive(Debug, Serialize)]
pub struct RuleMasterView {
    /// The queried account.
    pub address: AccountId,
    /// Whether it holds the rule-master role.
    pub is_rule_master: bool,
}

/// Read-only view of a session aggregate.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: u64,
    /// What part of the story the session governs.
    pub scope: Scope,
    /// The rule master who created it.
    pub creator: AccountId,
    /// Members in address order.
    pub members: Vec<AccountId>,
    /// Proposals raised in the session, ascending.
    pub proposal_ids: Vec<u64>,
    /// Current version (event count).
    pub version: u64,
}

/// Read-only view of one account's membership in a session.
#[derive(Debug, Serialize)]
pub struct MembershipView {
    /// The session identifier.
    pub session_id: u64,
    /// The queried account.
    pub address: AccountId,
    /// Whether the account is a member.
    pub is_member: bool,
}

/// Read-only view of a proposal aggregate.
#[derive(Debug, Serialize)]
pub struct ProposalView {
    /// The proposal identifier.
    pub proposal_id: u64,
    /// The owning session.
    pub session_id: u64,
    /// Free-form description.
    pub description: String,
    /// Number of options.
    pub option_count: u8,
    /// Electorate snapshot in address order.
    pub eligible_voters: Vec<AccountId>,
    /// Accounts that have voted, in address order.
    pub votes_cast: Vec<AccountId>,
    /// Instant after which anyone may close the proposal.
    pub deadline: DateTime<Utc>,
    /// Lifecycle state.
    pub state: ProposalState,
    /// Per-option vote counts.
    pub tally: Vec<u64>,
    /// When the proposal closed, if it has.
    pub closed_at: Option<DateTime<Utc>>,
    /// Why the proposal closed, if it has.
    pub close_reason: Option<CloseReason>,
    /// Current version (event count).
    pub version: u64,
}

/// Read-only view of a proposal's tally.
#[derive(Debug, Serialize)]
pub struct ResultsView {
    /// The proposal identifier.
    pub proposal_id: u64,
    /// Lifecycle state at the time of the snapshot.
    pub state: ProposalState,
    /// Per-option vote counts.
    pub tally: Vec<u64>,
}

/// Read-only view of a closed proposal's outcome.
#[derive(Debug, Serialize)]
pub struct WinnerView {
    /// The proposal identifier.
    pub proposal_id: u64,
    /// The winning option index.
    pub winning_option: u8,
    /// Final per-option vote counts.
    pub tally: Vec<u64>,
}

fn read_engine(
    engine: &RwLock<GovernanceEngine>,
) -> Result<RwLockReadGuard<'_, GovernanceEngine>, DomainError> {
    engine
        .read()
        .map_err(|e| DomainError::Infrastructure(format!("engine lock poisoned: {e}")))
}

/// Reports whether an account holds the rule-master role.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_rule_master_status(
    address: &AccountId,
    engine: &RwLock<GovernanceEngine>,
) -> Result<RuleMasterView, DomainError> {
    let engine = read_engine(engine)?;
    Ok(RuleMasterView {
        address: address.clone(),
        is_rule_master: engine.is_rule_master(address),
    })
}

/// Retrieves a session by id.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session does not exist.
/// Returns `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_session_by_id(
    session_id: u64,
    engine: &RwLock<GovernanceEngine>,
) -> Result<SessionView, DomainError> {
    let engine = read_engine(engine)?;
    let session = engine.session(session_id)?;
    Ok(SessionView {
        session_id,
        scope: session.scope(),
        creator: session.creator().clone(),
        members: session.members().cloned().collect(),
        proposal_ids: engine.proposals_for_session(session_id)?,
        version: session.version(),
    })
}

/// Reports whether an account is a member of a session. Unknown sessions
/// report no members.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_membership(
    session_id: u64,
    address: &AccountId,
    engine: &RwLock<GovernanceEngine>,
) -> Result<MembershipView, DomainError> {
    let engine = read_engine(engine)?;
    Ok(MembershipView {
        session_id,
        address: address.clone(),
        is_member: engine.is_member(session_id, address),
    })
}

/// Retrieves a proposal by id.
///
/// # Errors
///
/// Returns `DomainError::ProposalNotFound` if the proposal does not exist.
/// Returns `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_proposal_by_id(
    proposal_id: u64,
    engine: &RwLock<GovernanceEngine>,
) -> Result<ProposalView, DomainError> {
    let engine = read_engine(engine)?;
    let proposal = engine.proposal(proposal_id)?;
    let closure = proposal.closure();
    Ok(ProposalView {
        proposal_id,
        session_id: proposal.session_id(),
        description: proposal.description().to_owned(),
        option_count: proposal.option_count(),
        eligible_voters: proposal.eligible_voters().cloned().collect(),
        votes_cast: proposal.votes_cast().cloned().collect(),
        deadline: proposal.deadline(),
        state: proposal.state(),
        tally: proposal.tally().to_vec(),
        closed_at: closure.map(|c| c.closed_at),
        close_reason: closure.map(|c| c.reason),
        version: proposal.version(),
    })
}

/// Retrieves a proposal's current tally.
///
/// # Errors
///
/// Returns `DomainError::ProposalNotFound` if the proposal does not exist.
/// Returns `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_results(
    proposal_id: u64,
    engine: &RwLock<GovernanceEngine>,
) -> Result<ResultsView, DomainError> {
    let engine = read_engine(engine)?;
    let proposal = engine.proposal(proposal_id)?;
    Ok(ResultsView {
        proposal_id,
        state: proposal.state(),
        tally: proposal.tally().to_vec(),
    })
}

/// Resolves the winner of a closed proposal.
///
/// # Errors
///
/// Returns `DomainError::ProposalNotFound` if the proposal does not exist,
/// `DomainError::ProposalActive` if it has not closed, or
/// `DomainError::Infrastructure` if the engine lock is poisoned.
pub fn get_winner(
    proposal_id: u64,
    engine: &RwLock<GovernanceEngine>,
) -> Result<WinnerView, DomainError> {
    let engine = read_engine(engine)?;
    let winning_option = engine.resolve(proposal_id)?;
    Ok(WinnerView {
        proposal_id,
        winning_option,
        tally: engine.results(proposal_id)?,
    })
}
