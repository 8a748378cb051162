//! Pinnable clock for tests.

use std::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Clock pinned to a settable instant.
///
/// Expiry, renewal windows, and quota windows are all tested by moving this
/// clock instead of sleeping.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Pins the clock to a new instant.
    pub fn set(&self, now: Timestamp) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = guard.add_days(days);
    }

    /// Moves the clock forward by whole hours.
    pub fn advance_hours(&self, hours: i64) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = guard.add_hours(hours);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
