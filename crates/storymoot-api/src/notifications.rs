//! Logging subscriber for governance notifications.

use storymoot_core::event::DomainEvent;
use storymoot_governance::domain::events::GovernanceEvent;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Drains `receiver`, logging each notification, until every sender is gone.
pub async fn log_notifications(mut receiver: Receiver<GovernanceEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => info!(
                event_id = %event.metadata.event_id,
                event_type = event.event_type(),
                correlation_id = %event.metadata.correlation_id,
                payload = %event.to_payload(),
                "governance notification"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "notification subscriber lagged behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
