//! Subscription lifecycle handlers.

mod cancel_subscription;
mod confirm_payment;
mod create_subscription;
mod invoicing;
mod renew_subscription;

pub use cancel_subscription::CancelSubscriptionHandler;
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler};
pub use create_subscription::{CreateSubscriptionCommand, CreateSubscriptionHandler};
pub use renew_subscription::{RenewSubscriptionHandler, RenewalOutcome};

pub use create_subscription::CreateSubscriptionResult;
