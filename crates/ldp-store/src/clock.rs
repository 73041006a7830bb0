//! Monotonic timestamps for `modified` values and version datetimes.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Monotonic clock for modification and version timestamps.
///
/// Instants carry microsecond precision, matching the resolution of version
/// URIs.
///
/// Follows the local-event rule of a hybrid logical clock: the returned
/// instant is `max(wall_clock, last + 1µs)`, so every call yields an instant
/// strictly after every earlier one even when the wall clock stalls or steps
/// backwards. Safe for concurrent use.
pub struct VersionClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl VersionClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// The next instant, strictly after any previously returned one.
    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().trunc_subsecs(6);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match *last {
            Some(prev) if wall <= prev => prev + Duration::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }

    /// Fold an externally observed instant into the clock so later calls
    /// come after it (used when reloading persisted state).
    pub fn observe(&self, instant: DateTime<Utc>) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if last.map_or(true, |prev| instant > prev) {
            *last = Some(instant);
        }
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VersionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = *self.last.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("VersionClock").field("last", &last).finish()
    }
}
