//! Command handlers for the governance context.
//!
//! Each handler takes the engine's write lock for exactly one synchronous
//! engine call, which makes the lock the single-writer sequencer for all
//! mutations. Handlers are synchronous, so the lock is never held across an
//! await point.

use std::sync::{RwLock, RwLockWriteGuard};

use storymoot_core::command::Command;
use storymoot_core::error::DomainError;
use tracing::warn;

use crate::application::engine::{GovernanceEngine, ProposalCreatedResult};
use crate::domain::commands::{
    AddRuleMaster, AddUserToSession, CastVote, CloseProposal, CreateProposal, CreateSession,
};
use crate::domain::events::GovernanceEvent;

fn write_engine(
    engine: &RwLock<GovernanceEngine>,
) -> Result<RwLockWriteGuard<'_, GovernanceEngine>, DomainError> {
    engine
        .write()
        .map_err(|e| DomainError::Infrastructure(format!("engine lock poisoned: {e}")))
}

fn log_rejection(command: &dyn Command, error: &DomainError) {
    warn!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        caller = %command.caller(),
        %error,
        "command rejected"
    );
}

fn execute<C, T>(
    command: &C,
    engine: &RwLock<GovernanceEngine>,
    run: impl FnOnce(&mut GovernanceEngine, &C) -> Result<T, DomainError>,
) -> Result<T, DomainError>
where
    C: Command,
{
    let mut guard = write_engine(engine)?;
    run(&mut guard, command).inspect_err(|error| log_rejection(command, error))
}

/// Handles the `AddRuleMaster` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_add_rule_master(
    command: &AddRuleMaster,
    engine: &RwLock<GovernanceEngine>,
) -> Result<Vec<GovernanceEvent>, DomainError> {
    execute(command, engine, GovernanceEngine::add_rule_master)
}

/// Handles the `CreateSession` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_create_session(
    command: &CreateSession,
    engine: &RwLock<GovernanceEngine>,
) -> Result<Vec<GovernanceEvent>, DomainError> {
    execute(command, engine, GovernanceEngine::create_session)
}

/// Handles the `AddUserToSession` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_add_user_to_session(
    command: &AddUserToSession,
    engine: &RwLock<GovernanceEngine>,
) -> Result<Vec<GovernanceEvent>, DomainError> {
    execute(command, engine, GovernanceEngine::add_user_to_session)
}

/// Handles the `CreateProposal` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_create_proposal(
    command: &CreateProposal,
    engine: &RwLock<GovernanceEngine>,
) -> Result<ProposalCreatedResult, DomainError> {
    execute(command, engine, GovernanceEngine::create_proposal)
}

/// Handles the `CastVote` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_cast_vote(
    command: &CastVote,
    engine: &RwLock<GovernanceEngine>,
) -> Result<Vec<GovernanceEvent>, DomainError> {
    execute(command, engine, GovernanceEngine::vote)
}

/// Handles the `CloseProposal` command.
///
/// # Errors
///
/// Returns `DomainError` if the command is rejected or the lock is poisoned.
pub fn handle_close_proposal(
    command: &CloseProposal,
    engine: &RwLock<GovernanceEngine>,
) -> Result<Vec<GovernanceEvent>, DomainError> {
    execute(command, engine, GovernanceEngine::close_proposal)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use chrono::{TimeZone, Utc};
    use storymoot_core::account::AccountId;
    use storymoot_core::error::DomainError;
    use storymoot_test_support::{FixedClock, RecordingNotificationSink};
    use uuid::Uuid;

    use super::*;
    use crate::domain::sessions::Scope;

    fn engine_with_sink() -> (
        RwLock<GovernanceEngine>,
        Arc<RecordingNotificationSink<GovernanceEvent>>,
    ) {
        let sink: Arc<RecordingNotificationSink<GovernanceEvent>> =
            Arc::new(RecordingNotificationSink::new());
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = Arc::new(FixedClock(now));
        let engine = GovernanceEngine::new(AccountId::from("owner"), clock, sink.clone());
        (RwLock::new(engine), sink)
    }

    #[test]
    fn test_handle_create_session_publishes_session_created() {
        // Arrange
        let (engine, sink) = engine_with_sink();
        let correlation_id = Uuid::new_v4();
        let command = CreateSession {
            correlation_id,
            caller: AccountId::from("owner"),
            session_id: 1,
            scope: Scope::World(2),
        };

        // Act
        let events = handle_create_session(&command, &engine).unwrap();

        // Assert
        assert_eq!(events.len(), 1);
        assert_eq!(sink.published_events(), events);
        assert_eq!(
            sink.published_event_types(),
            vec!["governance.session_created"]
        );
        assert_eq!(events[0].metadata.correlation_id, correlation_id);
        let owner = AccountId::from("owner");
        assert!(engine.read().unwrap().is_member(1, &owner));
    }

    #[test]
    fn test_handle_create_session_rejection_publishes_nothing() {
        let (engine, sink) = engine_with_sink();
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            caller: AccountId::from("stranger"),
            session_id: 1,
            scope: Scope::Custom(0),
        };

        let result = handle_create_session(&command, &engine);

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
        assert!(sink.published_events().is_empty());
    }

    #[test]
    fn test_handle_cast_vote_unknown_proposal_returns_not_found() {
        let (engine, _sink) = engine_with_sink();
        let command = CastVote {
            correlation_id: Uuid::new_v4(),
            caller: AccountId::from("owner"),
            proposal_id: 9,
            option: 0,
        };

        let result = handle_cast_vote(&command, &engine);

        assert_eq!(result.unwrap_err(), DomainError::ProposalNotFound(9));
    }

    #[test]
    fn test_handler_reports_poisoned_lock_as_infrastructure_error() {
        let (engine, _sink) = engine_with_sink();
        let engine = Arc::new(engine);
        let poisoner = Arc::clone(&engine);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the engine lock");
        })
        .join();

        let command = CloseProposal {
            correlation_id: Uuid::new_v4(),
            caller: AccountId::from("owner"),
            proposal_id: 0,
        };
        let result = handle_close_proposal(&command, &engine);

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
