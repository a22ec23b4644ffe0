//! Rule-master access control.
//!
//! The rule-master role is plain set membership: every privileged operation
//! starts with [`AccessControlRegistry::ensure_rule_master`].

use std::collections::BTreeSet;

use storymoot_core::account::AccountId;
use storymoot_core::clock::Clock;
use storymoot_core::error::DomainError;
use uuid::Uuid;

use super::events::{GovernanceEvent, GovernanceEventKind, RuleMasterAdded};

/// The set of accounts holding the rule-master role.
///
/// Only the bootstrap owner may grant the role. The owner holds it from
/// construction, and the role is never revoked.
#[derive(Debug)]
pub struct AccessControlRegistry {
    owner: AccountId,
    rule_masters: BTreeSet<AccountId>,
}

impl AccessControlRegistry {
    /// Creates a registry bootstrapped by `owner`.
    #[must_use]
    pub fn new(owner: AccountId) -> Self {
        let rule_masters = BTreeSet::from([owner.clone()]);
        Self {
            owner,
            rule_masters,
        }
    }

    /// Returns the bootstrap owner.
    #[must_use]
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Returns whether `account` holds the rule-master role.
    #[must_use]
    pub fn is_rule_master(&self, account: &AccountId) -> bool {
        self.rule_masters.contains(account)
    }

    /// Returns all rule masters in address order.
    pub fn rule_masters(&self) -> impl Iterator<Item = &AccountId> {
        self.rule_masters.iter()
    }

    /// Guard for privileged operations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if `caller` is not a rule master.
    pub fn ensure_rule_master(
        &self,
        caller: &AccountId,
        action: &'static str,
    ) -> Result<(), DomainError> {
        if self.is_rule_master(caller) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized {
                caller: caller.clone(),
                action,
            })
        }
    }

    /// Grants the rule-master role to `target`.
    ///
    /// Returns the committed event, or `None` when `target` already held the
    /// role.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` if `caller` is not the owner.
    pub fn add_rule_master(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Option<GovernanceEvent>, DomainError> {
        if caller != &self.owner {
            return Err(DomainError::Unauthorized {
                caller: caller.clone(),
                action: "add rule masters",
            });
        }
        if self.is_rule_master(target) {
            return Ok(None);
        }

        let event = GovernanceEvent::new(
            GovernanceEventKind::RuleMasterAdded(RuleMasterAdded {
                account: target.clone(),
                added_by: caller.clone(),
            }),
            correlation_id,
            clock.now(),
        );
        self.apply(&event);
        Ok(Some(event))
    }

    fn apply(&mut self, event: &GovernanceEvent) {
        if let GovernanceEventKind::RuleMasterAdded(payload) = &event.kind {
            self.rule_masters.insert(payload.account.clone());
        }
    }
}
