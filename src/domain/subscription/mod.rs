//! Subscription domain - the billing lifecycle.
//!
//! A `Subscription` owns its `Period`s, and every period owns exactly one
//! `Payment`. Status is never stored; it is derived from the periods and
//! payments on demand, so it cannot drift from the underlying facts.

mod aggregate;
mod errors;
mod payment;
mod period;
mod status;

pub use aggregate::{Address, PaymentConfirmation, Subscription};
pub use errors::SubscriptionError;
pub use payment::{Payment, PaymentMethod};
pub use period::Period;
pub use status::SubscriptionStatus;
