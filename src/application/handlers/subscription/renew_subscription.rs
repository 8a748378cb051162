//! RenewSubscriptionHandler - chains a new billing period onto a
//! subscription.

use std::sync::Arc;

use tracing::info;

use crate::config::BillingConfig;
use crate::domain::catalog::Plan;
use crate::domain::foundation::{ErrorCode, PaymentId, SubscriptionId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{
    Clock, NotificationGateway, PlanRepository, SubscriptionRepository, UserRepository,
};

use super::invoicing;

const MAX_CODE_ATTEMPTS: u32 = 5;

/// Result of a successful renewal.
#[derive(Debug, Clone)]
pub struct RenewalOutcome {
    pub subscription: Subscription,
    pub payment_id: PaymentId,
}

/// Handler renewing an active subscription inside the renewal window.
///
/// The new period starts at the current coverage's end, whatever plan the
/// current plan renews into, and ships a fresh invoice. Early renewal never
/// shortens coverage already paid for.
pub struct RenewSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
    billing: BillingConfig,
}

impl RenewSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
        billing: BillingConfig,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            users,
            gateway,
            clock,
            billing,
        }
    }

    pub async fn handle(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<RenewalOutcome, SubscriptionError> {
        let now = self.clock.now();

        let mut subscription = self
            .subscriptions
            .find_by_id(&subscription_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(subscription_id))?;
        let current_plan = self
            .plans
            .find_by_slug(&subscription.plan_slug)
            .await?
            .ok_or_else(|| SubscriptionError::plan_not_found(&subscription.plan_slug))?;

        if !current_plan.is_renewable {
            return Err(SubscriptionError::not_renewable(&current_plan.slug));
        }
        let renews_to = match current_plan.renews_to {
            Some(id) if id != current_plan.id => self
                .plans
                .find_by_id(&id)
                .await?
                .ok_or_else(|| SubscriptionError::plan_not_found(id.to_string()))?,
            _ => current_plan,
        };
        if renews_to.eligible_active_subscriptions_per_user == Some(0) {
            return Err(SubscriptionError::plan_not_eligible(
                &renews_to.slug,
                "plan has been retired",
            ));
        }

        subscription.renew(
            &renews_to,
            now,
            self.billing.renewal_window_days,
            self.billing.payment_due_days,
        )?;
        self.persist_renewal(&mut subscription, &renews_to).await?;

        let payment = &subscription.periods[subscription.periods.len() - 1].payment;
        let payment_id = payment.id;
        info!(
            subscription_id = %subscription.id,
            plan = %renews_to.slug,
            "subscription renewed"
        );

        if let Ok(Some(user)) = self.users.find_by_id(&subscription.user_id).await {
            invoicing::dispatch_invoices(
                self.gateway.as_ref(),
                &user,
                &renews_to.name,
                payment,
                &self.billing,
            )
            .await;
        }

        Ok(RenewalOutcome {
            payment_id,
            subscription,
        })
    }

    async fn persist_renewal(
        &self,
        subscription: &mut Subscription,
        plan: &Plan,
    ) -> Result<(), SubscriptionError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            match self.subscriptions.update(subscription).await {
                Ok(()) => return Ok(()),
                Err(err) if err.code == ErrorCode::CodeConflict => {
                    let last = subscription.periods.len() - 1;
                    subscription.periods[last].payment.regenerate_code(&plan.slug);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(SubscriptionError::infrastructure(
            "Payment code generation kept colliding",
        ))
    }
}
