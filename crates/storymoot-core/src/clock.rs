//! Time source for proposal deadlines.

use chrono::{DateTime, TimeDelta, Utc};

/// Supplies "now" to the domain, so deadlines are testable.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the instant `seconds` after [`Clock::now`], saturating at the
    /// latest representable instant.
    fn seconds_from_now(&self, seconds: u64) -> DateTime<Utc> {
        saturating_add_seconds(self.now(), seconds)
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `start + seconds`, or `DateTime::<Utc>::MAX_UTC` on overflow.
#[must_use]
pub fn saturating_add_seconds(start: DateTime<Utc>, seconds: u64) -> DateTime<Utc> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|duration| start.checked_add_signed(duration))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
