//! ConfirmPaymentHandler - settles an open payment and starts coverage.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{ErrorCode, PaymentId, SubscriptionId};
use crate::domain::subscription::{PaymentConfirmation, SubscriptionError};
use crate::ports::{
    Clock, NotificationGateway, PlanRepository, SubscriptionRepository, UserRepository,
};

use super::invoicing;

/// Command to confirm one payment.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPaymentCommand {
    pub subscription_id: SubscriptionId,
    pub payment_id: PaymentId,
}

/// Handler confirming a payment, typically driven by staff matching bank
/// statements.
///
/// Idempotent in the rejecting sense: the second confirmation of the same
/// payment fails with `AlreadyPaid` and extends nothing. The persist step
/// is conditional on the stored payment still being unpaid, so two
/// concurrent confirmations cannot both win.
pub struct ConfirmPaymentHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            users,
            gateway,
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
    ) -> Result<PaymentConfirmation, SubscriptionError> {
        let now = self.clock.now();

        let mut subscription = self
            .subscriptions
            .find_by_id(&cmd.subscription_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(cmd.subscription_id))?;
        let plan = self
            .plans
            .find_by_slug(&subscription.plan_slug)
            .await?
            .ok_or_else(|| SubscriptionError::plan_not_found(&subscription.plan_slug))?;

        let outcome = subscription.confirm_payment(cmd.payment_id, &plan, now)?;

        self.subscriptions
            .update_if_unpaid(&subscription, &cmd.payment_id)
            .await
            .map_err(|err| match err.code {
                ErrorCode::AlreadyPaid => SubscriptionError::already_paid(cmd.payment_id),
                _ => SubscriptionError::from(err),
            })?;

        // confirmation stands even if the message is lost
        match self.users.find_by_id(&subscription.user_id).await {
            Ok(Some(user)) => {
                let message = invoicing::confirmation_message(
                    &user,
                    &plan.name,
                    outcome.is_renewal,
                    outcome.end_date,
                );
                if let Err(err) = self.gateway.send(&message).await {
                    warn!(
                        subscription_id = %subscription.id,
                        %err,
                        "confirmation dispatch failed"
                    );
                }
            }
            Ok(None) => {
                warn!(subscription_id = %subscription.id, "subscriber account missing");
            }
            Err(err) => {
                warn!(subscription_id = %subscription.id, %err, "subscriber lookup failed");
            }
        }

        Ok(outcome)
    }
}
