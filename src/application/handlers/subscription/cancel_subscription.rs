//! CancelSubscriptionHandler - ends a subscription at the subscriber's
//! request.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{Clock, SubscriptionRepository};

/// Handler canceling an active subscription.
///
/// Cancellation is terminal; a subscriber who wants the paper again buys a
/// fresh subscription. Open payments must be settled (or the period
/// voided by staff) before cancellation goes through.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subscriptions,
            clock,
        }
    }

    pub async fn handle(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Subscription, SubscriptionError> {
        let now = self.clock.now();

        let mut subscription = self
            .subscriptions
            .find_by_id(&subscription_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(subscription_id))?;

        subscription.cancel(now)?;
        self.subscriptions.update(&subscription).await?;

        info!(subscription_id = %subscription.id, "subscription canceled");
        Ok(subscription)
    }
}
