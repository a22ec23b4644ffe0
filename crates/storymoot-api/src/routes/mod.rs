//! Route modules organized by governance resource.

use serde::Serialize;
use storymoot_governance::domain::events::GovernanceEvent;
use uuid::Uuid;

pub mod health;
pub mod proposals;
pub mod rule_masters;
pub mod sessions;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced and published.
    pub event_ids: Vec<Uuid>,
}

pub(crate) fn event_ids(events: &[GovernanceEvent]) -> Vec<Uuid> {
    events.iter().map(|e| e.metadata.event_id).collect()
}
