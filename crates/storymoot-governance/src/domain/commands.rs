//! Commands for the governance context.

use storymoot_core::account::AccountId;
use storymoot_core::command::Command;
use uuid::Uuid;

use super::sessions::Scope;

/// Command to grant the rule-master role.
#[derive(Debug, Clone)]
pub struct AddRuleMaster {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing account.
    pub caller: AccountId,
    /// The account to promote.
    pub target: AccountId,
}

impl Command for AddRuleMaster {
    fn command_type(&self) -> &'static str {
        "governance.add_rule_master"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}

/// Command to create a session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing account.
    pub caller: AccountId,
    /// The caller-chosen session identifier.
    pub session_id: u64,
    /// What part of the story the session governs.
    pub scope: Scope,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "governance.create_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}

/// Command to enroll an account in a session.
#[derive(Debug, Clone)]
pub struct AddUserToSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing account.
    pub caller: AccountId,
    /// The session to join.
    pub session_id: u64,
    /// The account to enroll.
    pub user: AccountId,
}

impl Command for AddUserToSession {
    fn command_type(&self) -> &'static str {
        "governance.add_user_to_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}

/// Command to raise a proposal in a session.
#[derive(Debug, Clone)]
pub struct CreateProposal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing account.
    pub caller: AccountId,
    /// The session the proposal belongs to.
    pub session_id: u64,
    /// Free-form description shown to voters.
    pub description: String,
    /// Seconds from now until anyone may close the proposal.
    pub duration_seconds: u64,
    /// Number of options.
    pub option_count: u8,
    /// Accounts allowed to vote. Duplicates are collapsed.
    pub eligible_voters: Vec<AccountId>,
}

impl Command for CreateProposal {
    fn command_type(&self) -> &'static str {
        "governance.create_proposal"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}

/// Command to cast a ballot.
#[derive(Debug, Clone)]
pub struct CastVote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The voter.
    pub caller: AccountId,
    /// The proposal voted on.
    pub proposal_id: u64,
    /// The chosen option index, as submitted.
    pub option: u64,
}

impl Command for CastVote {
    fn command_type(&self) -> &'static str {
        "governance.cast_vote"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}

/// Command to close a proposal early (rule master) or after its deadline
/// (anyone).
#[derive(Debug, Clone)]
pub struct CloseProposal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The issuing account.
    pub caller: AccountId,
    /// The proposal to close.
    pub proposal_id: u64,
}

impl Command for CloseProposal {
    fn command_type(&self) -> &'static str {
        "governance.close_proposal"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn caller(&self) -> &AccountId {
        &self.caller
    }
}
