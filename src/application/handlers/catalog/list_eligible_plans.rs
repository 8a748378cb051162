//! ListEligiblePlansHandler - the plans a user may buy or renew into.

use std::sync::Arc;

use crate::domain::catalog::{CatalogError, EligibilityFacts, EligibilityPurpose, Plan};
use crate::domain::foundation::UserId;
use crate::ports::{Clock, PlanRepository, SubscriptionRepository, UserRepository};

/// Handler filtering the catalog down to what one user is eligible for.
///
/// Every plan runs through [`Plan::is_eligible`] with the same facts, so a
/// plan appears in the list exactly when the single-plan test would accept
/// it.
pub struct ListEligiblePlansHandler {
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
}

impl ListEligiblePlansHandler {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plans,
            users,
            subscriptions,
            clock,
        }
    }

    pub async fn handle(
        &self,
        user_id: UserId,
        purpose: EligibilityPurpose,
    ) -> Result<Vec<Plan>, CatalogError> {
        let now = self.clock.now();
        let verified_domains = self.users.verified_domains(&user_id, None).await?;

        let mut eligible = Vec::new();
        for plan in self.plans.list_all().await? {
            let facts = EligibilityFacts {
                verified_domains: verified_domains.clone(),
                active_subscriptions_of_plan: self
                    .subscriptions
                    .count_active_for_plan(&user_id, &plan.slug, now)
                    .await?,
            };
            if plan.is_eligible(purpose, &facts) {
                eligible.push(plan);
            }
        }
        Ok(eligible)
    }
}
