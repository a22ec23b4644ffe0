//! Test sinks — mock `NotificationSink` implementations for tests.

use std::sync::Mutex;

use storymoot_core::event::DomainEvent;
use storymoot_core::notification::NotificationSink;

/// A sink that records every published event in order.
#[derive(Debug)]
pub struct RecordingNotificationSink<E> {
    published: Mutex<Vec<E>>,
}

impl<E: Clone> RecordingNotificationSink<E> {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all events that were published.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_events(&self) -> Vec<E> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the event type names of all published events, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_event_types(&self) -> Vec<&'static str>
    where
        E: DomainEvent,
    {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(DomainEvent::event_type)
            .collect()
    }
}

impl<E: Clone> Default for RecordingNotificationSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent + Clone> NotificationSink<E> for RecordingNotificationSink<E> {
    fn publish(&self, event: &E) {
        self.published.lock().unwrap().push(event.clone());
    }
}

/// A sink that discards every event. Useful when a test does not inspect
/// notifications.
#[derive(Debug, Clone, Copy)]
pub struct NullNotificationSink;

impl<E: DomainEvent> NotificationSink<E> for NullNotificationSink {
    fn publish(&self, _event: &E) {}
}
