//! Invoice message composition shared by creation and renewal.

use tracing::warn;

use crate::config::BillingConfig;
use crate::domain::foundation::{Email, Timestamp};
use crate::domain::identity::User;
use crate::domain::subscription::Payment;
use crate::ports::{Notification, NotificationGateway};

/// Builds the invoice message pair: one to the subscriber, one copy to
/// accounting.
pub(super) fn invoice_messages(
    user: &User,
    plan_name: &str,
    payment: &Payment,
    billing: &BillingConfig,
) -> Vec<Notification> {
    let subscriber = Notification::new(user.email.clone(), "payment_invoice")
        .with_context("name", user.full_name())
        .with_context("plan", plan_name)
        .with_context("amount", payment.amount.to_string())
        .with_context("payment_code", payment.code.clone())
        .with_context("due_on", payment.due_on.date().to_string());

    let mut messages = vec![subscriber.clone()];
    if let Ok(accounting) = Email::new(&billing.accounting_email) {
        messages.push(Notification {
            recipient: accounting,
            ..subscriber
        });
    }
    messages
}

/// Dispatches invoice messages, logging instead of failing.
///
/// A lost invoice is recoverable (the payment stays open and can be
/// re-billed); a rolled-back subscription is not.
pub(super) async fn dispatch_invoices(
    gateway: &dyn NotificationGateway,
    user: &User,
    plan_name: &str,
    payment: &Payment,
    billing: &BillingConfig,
) {
    let messages = invoice_messages(user, plan_name, payment, billing);
    if let Err(err) = gateway.send_batch(&messages).await {
        warn!(
            payment_code = %payment.code,
            %err,
            "invoice dispatch failed, payment stays open"
        );
    }
}

/// Builds the confirmation message sent after a payment settles.
pub(super) fn confirmation_message(
    user: &User,
    plan_name: &str,
    is_renewal: bool,
    end_date: Timestamp,
) -> Notification {
    let template = if is_renewal {
        "subscription_renewed"
    } else {
        "subscription_started"
    };
    Notification::new(user.email.clone(), template)
        .with_context("name", user.full_name())
        .with_context("plan", plan_name)
        .with_context("paid_until", end_date.date().to_string())
}
