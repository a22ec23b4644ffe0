//! Outbound notification port.
//!
//! The engine publishes committed domain events to a sink and never waits
//! on, or inspects the outcome of, delivery.

use tokio::sync::broadcast;
use tracing::debug;

use crate::event::DomainEvent;

/// Receives events after the state change that produced them has committed.
pub trait NotificationSink<E: DomainEvent>: Send + Sync {
    /// Publishes a committed event. Delivery is fire-and-forget.
    fn publish(&self, event: &E);
}

/// A sink backed by a `tokio` broadcast channel.
///
/// Every subscriber receives every event published after it subscribed.
/// Publishing with no subscribers drops the event; a lagging subscriber
/// loses the oldest events once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct BroadcastNotificationSink<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> BroadcastNotificationSink<E> {
    /// Creates a sink whose channel buffers up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a new receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

impl<E> NotificationSink<E> for BroadcastNotificationSink<E>
where
    E: DomainEvent + Clone + 'static,
{
    fn publish(&self, event: &E) {
        if self.sender.send(event.clone()).is_err() {
            debug!(
                event_type = event.event_type(),
                "no notification subscribers; event dropped"
            );
        }
    }
}
