//! Sessions and session membership.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use storymoot_core::account::AccountId;
use storymoot_core::aggregate::AggregateRoot;
use storymoot_core::clock::Clock;
use storymoot_core::error::DomainError;
use uuid::Uuid;

use super::access_control::AccessControlRegistry;
use super::events::{GovernanceEvent, GovernanceEventKind, MemberAdded, SessionCreated};

/// The part of the story a session governs. Each variant carries an id in
/// its own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// A free-standing session.
    Custom(u64),
    /// A session over a whole world.
    World(u64),
    /// A session over a single chapter.
    Chapter(u64),
}

/// The aggregate root for a session.
#[derive(Debug)]
pub struct Session {
    /// Aggregate identifier.
    pub id: u64,
    pub(crate) scope: Scope,
    pub(crate) creator: AccountId,
    pub(crate) members: BTreeSet<AccountId>,
    pub(crate) version: u64,
    uncommitted_events: Vec<GovernanceEvent>,
}

impl Session {
    /// Opens a new session with a pending `SessionCreated` event. The creator
    /// becomes a member once the event is committed.
    pub(crate) fn open(
        id: u64,
        scope: Scope,
        creator: AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let event = GovernanceEvent::new(
            GovernanceEventKind::SessionCreated(SessionCreated {
                session_id: id,
                scope,
                creator: creator.clone(),
            }),
            correlation_id,
            clock.now(),
        );
        Self {
            id,
            scope,
            creator,
            members: BTreeSet::new(),
            version: 0,
            uncommitted_events: vec![event],
        }
    }

    /// Returns the session's scope.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the rule master who created the session.
    #[must_use]
    pub fn creator(&self) -> &AccountId {
        &self.creator
    }

    /// Returns whether `account` is a member.
    #[must_use]
    pub fn is_member(&self, account: &AccountId) -> bool {
        self.members.contains(account)
    }

    /// Returns the members in address order.
    pub fn members(&self) -> impl Iterator<Item = &AccountId> {
        self.members.iter()
    }

    /// Records a `MemberAdded` event unless `user` is already a member.
    pub(crate) fn add_member(
        &mut self,
        user: &AccountId,
        added_by: &AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        if self.is_member(user) {
            return;
        }
        self.uncommitted_events.push(GovernanceEvent::new(
            GovernanceEventKind::MemberAdded(MemberAdded {
                session_id: self.id,
                member: user.clone(),
                added_by: added_by.clone(),
            }),
            correlation_id,
            clock.now(),
        ));
    }
}

impl AggregateRoot for Session {
    type Event = GovernanceEvent;

    fn aggregate_id(&self) -> u64 {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            GovernanceEventKind::SessionCreated(payload) => {
                self.scope = payload.scope;
                self.creator = payload.creator.clone();
                self.members.insert(payload.creator.clone());
            }
            GovernanceEventKind::MemberAdded(payload) => {
                self.members.insert(payload.member.clone());
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

/// Owns every session, keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<u64, Session>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session whose only member is `caller`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if `caller` is not a rule master,
    /// or `DomainError::DuplicateSession` if `session_id` is taken.
    pub fn create_session(
        &mut self,
        access: &AccessControlRegistry,
        caller: &AccountId,
        session_id: u64,
        scope: Scope,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        access.ensure_rule_master(caller, "create sessions")?;
        if self.sessions.contains_key(&session_id) {
            return Err(DomainError::DuplicateSession(session_id));
        }

        let mut session = Session::open(session_id, scope, caller.clone(), correlation_id, clock);
        let events = session.commit();
        self.sessions.insert(session_id, session);
        Ok(events)
    }

    /// Enrolls `user` in a session. Enrolling an existing member commits no
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if `caller` is not a rule master,
    /// or `DomainError::SessionNotFound` if the session does not exist.
    pub fn add_user_to_session(
        &mut self,
        access: &AccessControlRegistry,
        caller: &AccountId,
        session_id: u64,
        user: &AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Vec<GovernanceEvent>, DomainError> {
        access.ensure_rule_master(caller, "add users to sessions")?;
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))?;

        session.add_member(user, caller, correlation_id, clock);
        Ok(session.commit())
    }

    /// Returns whether `account` is a member of the session. Unknown sessions
    /// have no members.
    #[must_use]
    pub fn is_member(&self, session_id: u64, account: &AccountId) -> bool {
        self.sessions
            .get(&session_id)
            .is_some_and(|session| session.is_member(account))
    }

    /// Returns whether the session exists.
    #[must_use]
    pub fn contains(&self, session_id: u64) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session does not exist.
    pub fn get(&self, session_id: u64) -> Result<&Session, DomainError> {
        self.sessions
            .get(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use storymoot_test_support::FixedClock;

    use super::*;

    fn fixed_clock() -> FixedClock {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        FixedClock(now)
    }

    fn account(address: &str) -> AccountId {
        AccountId::from(address)
    }

    fn access_with_user1() -> AccessControlRegistry {
        let mut access = AccessControlRegistry::new(account("owner"));
        let (owner, user1) = (account("owner"), account("user1"));
        access
            .add_rule_master(&owner, &user1, Uuid::new_v4(), &fixed_clock())
            .unwrap();
        access
    }

    #[test]
    fn test_create_session_makes_creator_the_only_member() {
        // Arrange
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();
        let correlation_id = Uuid::new_v4();

        // Act
        let events = registry
            .create_session(
                &access,
                &account("user1"),
                1,
                Scope::World(7),
                correlation_id,
                &fixed_clock(),
            )
            .unwrap();

        // Assert
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.event_type, "governance.session_created");
        assert_eq!(events[0].metadata.correlation_id, correlation_id);

        let session = registry.get(1).unwrap();
        assert_eq!(session.scope(), Scope::World(7));
        assert_eq!(session.creator(), &account("user1"));
        let members: Vec<_> = session.members().collect();
        assert_eq!(members, vec![&account("user1")]);
        assert_eq!(session.version(), 1);
        assert!(session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_create_session_rejects_non_rule_master() {
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();

        let result = registry.create_session(
            &access,
            &account("user2"),
            1,
            Scope::Custom(0),
            Uuid::new_v4(),
            &fixed_clock(),
        );

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
        assert!(!registry.contains(1));
    }

    #[test]
    fn test_create_session_rejects_duplicate_id() {
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();
        let clock = fixed_clock();
        registry
            .create_session(
                &access,
                &account("user1"),
                1,
                Scope::Chapter(2),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();

        let result = registry.create_session(
            &access,
            &account("owner"),
            1,
            Scope::World(9),
            Uuid::new_v4(),
            &clock,
        );

        assert_eq!(result.unwrap_err(), DomainError::DuplicateSession(1));
        let session = registry.get(1).unwrap();
        assert_eq!(session.scope(), Scope::Chapter(2));
        assert_eq!(session.creator(), &account("user1"));
    }

    #[test]
    fn test_add_user_to_session_is_idempotent() {
        // Arrange
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();
        let clock = fixed_clock();
        registry
            .create_session(
                &access,
                &account("user1"),
                1,
                Scope::Custom(1),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();

        // Act
        let first = registry
            .add_user_to_session(
                &access,
                &account("user1"),
                1,
                &account("user2"),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        let second = registry
            .add_user_to_session(
                &access,
                &account("user1"),
                1,
                &account("user2"),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();

        // Assert
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].metadata.event_type, "governance.member_added");
        assert!(second.is_empty());
        assert!(registry.is_member(1, &account("user2")));
        assert_eq!(registry.get(1).unwrap().members().count(), 2);
        assert_eq!(registry.get(1).unwrap().version(), 2);
    }

    #[test]
    fn test_add_user_to_missing_session_returns_not_found() {
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();

        let result = registry.add_user_to_session(
            &access,
            &account("user1"),
            42,
            &account("user2"),
            Uuid::new_v4(),
            &fixed_clock(),
        );

        assert_eq!(result.unwrap_err(), DomainError::SessionNotFound(42));
    }

    #[test]
    fn test_add_user_by_non_rule_master_is_unauthorized_before_lookup() {
        let access = access_with_user1();
        let mut registry = SessionRegistry::new();

        let result = registry.add_user_to_session(
            &access,
            &account("user2"),
            42,
            &account("user3"),
            Uuid::new_v4(),
            &fixed_clock(),
        );

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[test]
    fn test_is_member_of_unknown_session_is_false() {
        let registry = SessionRegistry::new();

        assert!(!registry.is_member(5, &account("user1")));
    }

    #[test]
    fn test_scope_serializes_as_tagged_variant() {
        let json = serde_json::to_value(Scope::Chapter(12)).unwrap();

        assert_eq!(json, serde_json::json!({ "kind": "chapter", "id": 12 }));
    }
}
