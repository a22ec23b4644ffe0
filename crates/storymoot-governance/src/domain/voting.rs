//! Ballot and closure rules for proposals.
//!
//! These methods only validate and record events; the engine commits them,
//! so a rejected ballot or close leaves the proposal untouched.

use storymoot_core::account::AccountId;
use storymoot_core::clock::Clock;
use storymoot_core::error::DomainError;
use uuid::Uuid;

use super::events::{GovernanceEvent, GovernanceEventKind, ProposalClosed, VoteCast};
use super::proposals::{CloseReason, Proposal, ProposalState};

/// Returns the index of the highest count. Ties go to the lowest index, and
/// an all-zero tally resolves to option 0.
#[must_use]
pub fn winning_option(tally: &[u64]) -> u8 {
    let mut winner = 0;
    let mut best = 0;
    for (index, &count) in (0..=u8::MAX).zip(tally) {
        if count > best {
            best = count;
            winner = index;
        }
    }
    winner
}

impl Proposal {
    fn ensure_active(&self) -> Result<(), DomainError> {
        match self.state {
            ProposalState::Active => Ok(()),
            ProposalState::Closed => Err(DomainError::ProposalClosed(self.id)),
        }
    }

    fn closed_event(
        &self,
        final_tally: Vec<u64>,
        reason: CloseReason,
        closed_by: &AccountId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> GovernanceEvent {
        GovernanceEvent::new(
            GovernanceEventKind::ProposalClosed(ProposalClosed {
                proposal_id: self.id,
                session_id: self.session_id,
                winning_option: winning_option(&final_tally),
                final_tally,
                reason,
                closed_by: closed_by.clone(),
            }),
            correlation_id,
            clock.now(),
        )
    }

    /// Records a ballot for `option`. When this is the last outstanding
    /// ballot, also records the closure, so both commit together.
    ///
    /// # Errors
    ///
    /// Checked in order: `DomainError::ProposalClosed`,
    /// `DomainError::NotEligible`, `DomainError::AlreadyVoted`,
    /// `DomainError::InvalidOption`.
    pub(crate) fn cast_vote(
        &mut self,
        voter: &AccountId,
        option: u64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        if !self.is_eligible(voter) {
            return Err(DomainError::NotEligible {
                proposal_id: self.id,
                voter: voter.clone(),
            });
        }
        if self.has_voted(voter) {
            return Err(DomainError::AlreadyVoted {
                proposal_id: self.id,
                voter: voter.clone(),
            });
        }
        let Some(option) = u8::try_from(option)
            .ok()
            .filter(|index| *index < self.option_count)
        else {
            return Err(DomainError::InvalidOption {
                option,
                option_count: self.option_count,
            });
        };

        let vote = GovernanceEvent::new(
            GovernanceEventKind::VoteCast(VoteCast {
                proposal_id: self.id,
                voter: voter.clone(),
                option,
            }),
            correlation_id,
            clock.now(),
        );
        let completes = self.votes_cast.len() + 1 == self.eligible_voters.len();
        let closure = completes.then(|| {
            let mut final_tally = self.tally.clone();
            final_tally[usize::from(option)] += 1;
            self.closed_event(
                final_tally,
                CloseReason::AllVotesCast,
                voter,
                correlation_id,
                clock,
            )
        });

        self.uncommitted_events.push(vote);
        self.uncommitted_events.extend(closure);
        Ok(())
    }

    /// Records the closure of an active proposal. A rule master may close at
    /// any time; anyone else only once `now >= deadline`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalClosed` if already closed, or
    /// `DomainError::Unauthorized` if `caller` is not a rule master and the
    /// deadline has not passed.
    pub(crate) fn close(
        &mut self,
        caller: &AccountId,
        caller_is_rule_master: bool,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        let reason = if caller_is_rule_master {
            CloseReason::RuleMaster
        } else if clock.now() >= self.deadline {
            CloseReason::Timeout
        } else {
            return Err(DomainError::Unauthorized {
                caller: caller.clone(),
                action: "close a proposal before its deadline",
            });
        };

        let event = self.closed_event(self.tally.clone(), reason, caller, correlation_id, clock);
        self.uncommitted_events.push(event);
        Ok(())
    }

    /// Returns the winning option of a closed proposal.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalActive` while the proposal is open.
    pub fn resolve(&self) -> Result<u8, DomainError> {
        match self.state {
            ProposalState::Closed => Ok(winning_option(&self.tally)),
            ProposalState::Active => Err(DomainError::ProposalActive(self.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use proptest::prelude::*;
    use storymoot_core::aggregate::AggregateRoot;
    use storymoot_test_support::{FixedClock, ManualClock};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn account(address: &str) -> AccountId {
        AccountId::from(address)
    }

    fn proposal(option_count: u8, voters: &[&str], clock: &dyn Clock) -> Proposal {
        let eligible: BTreeSet<AccountId> = voters.iter().copied().map(AccountId::from).collect();
        let mut proposal = Proposal::open(
            0,
            1,
            "Which road north?".to_owned(),
            option_count,
            eligible,
            clock.now() + TimeDelta::seconds(60),
            account("user1"),
            Uuid::new_v4(),
            clock,
        );
        proposal.commit();
        proposal
    }

    // --- winning_option tests ---

    #[test]
    fn test_winning_option_picks_maximum() {
        assert_eq!(winning_option(&[1, 4, 2]), 1);
    }

    #[test]
    fn test_winning_option_breaks_ties_by_lowest_index() {
        assert_eq!(winning_option(&[3, 3, 1]), 0);
        assert_eq!(winning_option(&[0, 2, 2]), 1);
    }

    #[test]
    fn test_winning_option_of_empty_tally_is_zero() {
        assert_eq!(winning_option(&[0, 0]), 0);
    }

    // --- cast_vote tests ---

    #[test]
    fn test_cast_vote_records_nothing_until_committed() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1", "user2"], &clock);

        proposal
            .cast_vote(&account("user2"), 1, Uuid::new_v4(), &clock)
            .unwrap();

        assert_eq!(proposal.tally(), &[0, 0]);
        assert_eq!(proposal.uncommitted_events().len(), 1);

        let events = proposal.commit();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.event_type, "governance.vote_cast");
        assert_eq!(proposal.tally(), &[0, 1]);
        assert!(proposal.has_voted(&account("user2")));
        assert_eq!(proposal.state(), ProposalState::Active);
    }

    #[test]
    fn test_last_ballot_records_vote_and_closure_together() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1", "user2"], &clock);
        proposal
            .cast_vote(&account("user2"), 1, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();
        let correlation_id = Uuid::new_v4();

        // Act
        proposal
            .cast_vote(&account("user1"), 0, correlation_id, &clock)
            .unwrap();
        let events = proposal.commit();

        // Assert
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].metadata.event_type, "governance.vote_cast");
        assert_eq!(events[1].metadata.event_type, "governance.proposal_closed");
        assert_eq!(events[1].metadata.correlation_id, correlation_id);
        match &events[1].kind {
            GovernanceEventKind::ProposalClosed(payload) => {
                assert_eq!(payload.final_tally, vec![1, 1]);
                assert_eq!(payload.winning_option, 0);
                assert_eq!(payload.reason, CloseReason::AllVotesCast);
                assert_eq!(payload.closed_by, account("user1"));
            }
            other => panic!("expected ProposalClosed, got {other:?}"),
        }
        assert_eq!(proposal.state(), ProposalState::Closed);
        assert_eq!(proposal.tally(), &[1, 1]);
        let closure = proposal.closure().unwrap();
        assert_eq!(closure.reason, CloseReason::AllVotesCast);
    }

    #[test]
    fn test_cast_vote_rejections_in_order() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1", "user2"], &clock);
        proposal
            .cast_vote(&account("user1"), 0, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        assert_eq!(
            proposal.cast_vote(&account("user3"), 9, Uuid::new_v4(), &clock),
            Err(DomainError::NotEligible {
                proposal_id: 0,
                voter: account("user3"),
            })
        );
        assert_eq!(
            proposal.cast_vote(&account("user1"), 9, Uuid::new_v4(), &clock),
            Err(DomainError::AlreadyVoted {
                proposal_id: 0,
                voter: account("user1"),
            })
        );
        assert_eq!(
            proposal.cast_vote(&account("user2"), 2, Uuid::new_v4(), &clock),
            Err(DomainError::InvalidOption {
                option: 2,
                option_count: 2,
            })
        );
        assert!(proposal.uncommitted_events().is_empty());
        assert_eq!(proposal.tally(), &[1, 0]);
    }

    #[test]
    fn test_cast_vote_on_closed_proposal_is_rejected_first() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1", "user2"], &clock);
        proposal
            .close(&account("user1"), true, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        assert_eq!(
            proposal.cast_vote(&account("user3"), 7, Uuid::new_v4(), &clock),
            Err(DomainError::ProposalClosed(0))
        );
    }

    #[test]
    fn test_cast_vote_beyond_option_index_range_is_invalid_option() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1"], &clock);

        assert_eq!(
            proposal.cast_vote(&account("user1"), 300, Uuid::new_v4(), &clock),
            Err(DomainError::InvalidOption {
                option: 300,
                option_count: 2,
            })
        );
        assert!(proposal.uncommitted_events().is_empty());
        assert!(!proposal.has_voted(&account("user1")));
    }

    // --- close tests ---

    #[test]
    fn test_rule_master_closes_before_deadline() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(3, &["user1", "user2"], &clock);
        proposal
            .cast_vote(&account("user2"), 2, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        proposal
            .close(&account("user1"), true, Uuid::new_v4(), &clock)
            .unwrap();
        let events = proposal.commit();

        assert_eq!(events.len(), 1);
        let closure = proposal.closure().unwrap();
        assert_eq!(closure.reason, CloseReason::RuleMaster);
        assert_eq!(closure.closed_by, account("user1"));
        assert_eq!(closure.closed_at, fixed_now());
        assert_eq!(proposal.resolve(), Ok(2));
    }

    #[test]
    fn test_non_rule_master_cannot_close_before_deadline() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1"], &clock);

        let result = proposal.close(&account("user9"), false, Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
        assert!(proposal.uncommitted_events().is_empty());
        assert_eq!(proposal.state(), ProposalState::Active);
    }

    #[test]
    fn test_anyone_closes_at_deadline() {
        let clock = ManualClock::new(fixed_now());
        let mut proposal = proposal(2, &["user1"], &clock);
        clock.advance_seconds(60);

        proposal
            .close(&account("user9"), false, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        assert_eq!(proposal.closure().unwrap().reason, CloseReason::Timeout);
    }

    #[test]
    fn test_rule_master_after_deadline_closes_as_rule_master() {
        // Arrange
        let clock = ManualClock::new(fixed_now());
        let mut proposal = proposal(2, &["user1", "user2"], &clock);
        clock.advance_seconds(7200);

        // Act
        proposal
            .close(&account("user1"), true, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        // Assert
        let closure = proposal.closure().unwrap();
        assert_eq!(closure.reason, CloseReason::RuleMaster);
        assert_eq!(closure.closed_by, account("user1"));
        assert_eq!(closure.closed_at, clock.now());
    }

    #[test]
    fn test_close_twice_is_rejected() {
        let clock = FixedClock(fixed_now());
        let mut proposal = proposal(2, &["user1"], &clock);
        proposal
            .close(&account("user1"), true, Uuid::new_v4(), &clock)
            .unwrap();
        proposal.commit();

        assert_eq!(
            proposal.close(&account("user1"), true, Uuid::new_v4(), &clock),
            Err(DomainError::ProposalClosed(0))
        );
    }

    #[test]
    fn test_resolve_active_proposal_is_rejected() {
        let clock = FixedClock(fixed_now());
        let proposal = proposal(2, &["user1"], &clock);

        assert_eq!(proposal.resolve(), Err(DomainError::ProposalActive(0)));
    }

    proptest! {
        /// Every committed ballot keeps sum(tally) == |votes_cast|, no voter
        /// counts twice, and full participation always closes the proposal.
        #[test]
        fn prop_tally_matches_voters(
            ballots in proptest::collection::vec((0u8..6, 0u64..4), 0..40),
        ) {
            let clock = FixedClock(fixed_now());
            let voters = ["v0", "v1", "v2", "v3", "v4", "v5"];
            let mut proposal = proposal(3, &voters, &clock);

            for (voter, option) in ballots {
                let voter = account(voters[usize::from(voter)]);
                let before = proposal.tally().to_vec();
                let outcome = proposal.cast_vote(&voter, option, Uuid::new_v4(), &clock);
                proposal.commit();

                if outcome.is_err() {
                    prop_assert_eq!(proposal.tally(), before.as_slice());
                }
                let total: u64 = proposal.tally().iter().sum();
                prop_assert_eq!(total, u64::try_from(proposal.votes_cast().count()).unwrap());
                prop_assert!(proposal.votes_cast().all(|v| proposal.is_eligible(v)));
                if proposal.votes_cast().count() == voters.len() {
                    prop_assert_eq!(proposal.state(), ProposalState::Closed);
                }
            }
        }
    }
}
