//! Clock port.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
///
/// Every "now" read in the application layer goes through this port, so
/// expiry and renewal-window logic is testable with a pinned clock.
pub trait Clock: Send + Sync {
    /// Returns the current moment.
    fn now(&self) -> Timestamp;
}
