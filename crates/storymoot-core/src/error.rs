//! Domain error types.

use thiserror::Error;

use crate::account::AccountId;

/// Top-level domain error type.
///
/// Every variant except `Infrastructure` is a validation failure raised
/// before any state is touched, so a rejected command has no effects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The caller lacks the role required for the attempted mutation.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
        /// The attempted action.
        action: &'static str,
    },

    /// A session was not found.
    #[error("session not found: {0}")]
    SessionNotFound(u64),

    /// A proposal was not found.
    #[error("proposal not found: {0}")]
    ProposalNotFound(u64),

    /// A session with this identifier already exists.
    #[error("session already exists: {0}")]
    DuplicateSession(u64),

    /// The voter is not part of the proposal's electorate.
    #[error("{voter} is not eligible to vote on proposal {proposal_id}")]
    NotEligible {
        /// The proposal voted on.
        proposal_id: u64,
        /// The rejected voter.
        voter: AccountId,
    },

    /// The voter already cast a ballot on this proposal.
    #[error("{voter} already voted on proposal {proposal_id}")]
    AlreadyVoted {
        /// The proposal voted on.
        proposal_id: u64,
        /// The rejected voter.
        voter: AccountId,
    },

    /// The proposal is closed and accepts no further mutations.
    #[error("proposal {0} is closed")]
    ProposalClosed(u64),

    /// The proposal is still active and has no final result.
    #[error("proposal {0} is still active")]
    ProposalActive(u64),

    /// The chosen option is outside the proposal's option range.
    #[error("invalid option {option}: proposal has {option_count} options")]
    InvalidOption {
        /// The chosen option index.
        option: u64,
        /// Number of options on the proposal.
        option_count: u8,
    },

    /// A proposal needs at least two options.
    #[error("invalid option count {0}: at least 2 options are required")]
    InvalidOptionCount(u8),

    /// A proposal needs at least one eligible voter.
    #[error("electorate must not be empty")]
    EmptyElectorate,

    /// An infrastructure error at the application boundary.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
