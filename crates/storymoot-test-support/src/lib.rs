//! Shared test mocks and utilities for the Storymoot governance engine.

mod clock;
mod sink;

pub use clock::{FixedClock, ManualClock};
pub use sink::{NullNotificationSink, RecordingNotificationSink};
