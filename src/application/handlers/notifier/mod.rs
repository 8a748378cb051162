//! Scheduled notification handlers.

mod send_expiration_reminders;

pub use send_expiration_reminders::SendExpirationRemindersHandler;
