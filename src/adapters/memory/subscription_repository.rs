//! In-memory subscription repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::subscription::Subscription;
use crate::ports::SubscriptionRepository;

/// Lock-based store for subscription aggregates.
///
/// Payment codes are unique across every stored aggregate; the conditional
/// update runs under a single write lock, which is what makes concurrent
/// confirmation first-wins.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn code_conflict(
        stored: &HashMap<SubscriptionId, Subscription>,
        candidate: &Subscription,
    ) -> bool {
        stored
            .values()
            .flat_map(|s| s.periods.iter())
            .any(|period| {
                candidate.periods.iter().any(|own| {
                    own.payment.id != period.payment.id && own.payment.code == period.payment.code
                })
            })
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        if Self::code_conflict(&subscriptions, subscription) {
            return Err(DomainError::new(
                ErrorCode::CodeConflict,
                "Payment code already exists",
            ));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        if !subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }
        if Self::code_conflict(&subscriptions, subscription) {
            return Err(DomainError::new(
                ErrorCode::CodeConflict,
                "Payment code already exists",
            ));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update_if_unpaid(
        &self,
        subscription: &Subscription,
        payment_id: &PaymentId,
    ) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        let stored = subscriptions.get(&subscription.id).ok_or_else(|| {
            DomainError::new(ErrorCode::SubscriptionNotFound, "Subscription not found")
        })?;
        let stored_payment = stored.payment(*payment_id).ok_or_else(|| {
            DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
        })?;
        if stored_payment.is_paid() {
            return Err(DomainError::new(
                ErrorCode::AlreadyPaid,
                "Payment already confirmed",
            ));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_active_for_plan(
        &self,
        user_id: &UserId,
        plan_slug: &str,
        now: Timestamp,
    ) -> Result<u32, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        let count = subscriptions
            .values()
            .filter(|s| &s.user_id == user_id && s.plan_slug == plan_slug)
            .filter(|s| s.is_active(now))
            .count();
        Ok(count as u32)
    }

    async fn find_expiring_on(&self, on: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.canceled_at.is_none())
            .filter(|s| match s.latest_end_date() {
                Some(end) => end.same_day_as(&on),
                None => false,
            })
            .cloned()
            .collect())
    }
}
