//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for aggregate roots whose state changes only through applied events.
///
/// Command methods validate and record uncommitted events; nothing is
/// visible on the aggregate until [`AggregateRoot::commit`] applies them.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent + Clone;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> u64;

    /// Returns the current version (number of events applied).
    fn version(&self) -> u64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events.
    fn clear_uncommitted_events(&mut self);

    /// Applies every uncommitted event in order and returns them.
    fn commit(&mut self) -> Vec<Self::Event> {
        let events = self.uncommitted_events().to_vec();
        self.clear_uncommitted_events();
        for event in &events {
            self.apply(event);
        }
        events
    }
}
