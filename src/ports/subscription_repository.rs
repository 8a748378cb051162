//! Subscription repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::Subscription;

/// Repository port for subscription aggregates.
///
/// The aggregate persists as one unit: subscription, periods, and payments
/// together. Implementations must enforce uniqueness of payment codes; the
/// handlers retry with a fresh code on conflict.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Creates a subscription with its initial period and payment in one
    /// atomic operation.
    ///
    /// # Errors
    ///
    /// - `CodeConflict` if a payment code collides
    /// - `StorageError` on persistence failure
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Finds a subscription by id. Returns `None` if not found.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Updates an existing subscription aggregate.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if it does not exist
    /// - `CodeConflict` if a newly added payment code collides
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Updates the aggregate only if the stored copy still has the given
    /// payment unpaid.
    ///
    /// This is the compare-and-set that makes payment confirmation safe
    /// under concurrency: of two simultaneous confirmations exactly one
    /// succeeds.
    ///
    /// # Errors
    ///
    /// - `AlreadyPaid` if the stored payment is already confirmed
    /// - `SubscriptionNotFound` / `PaymentNotFound` if either is missing
    async fn update_if_unpaid(
        &self,
        subscription: &Subscription,
        payment_id: &PaymentId,
    ) -> Result<(), DomainError>;

    /// All subscriptions belonging to a user.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<Subscription>, DomainError>;

    /// How many not-canceled, currently active subscriptions of the given
    /// plan the user holds. Feeds the per-plan eligibility cap.
    async fn count_active_for_plan(
        &self,
        user_id: &UserId,
        plan_slug: &str,
        now: Timestamp,
    ) -> Result<u32, DomainError>;

    /// Not-canceled subscriptions whose latest paid coverage ends on the
    /// same calendar day as `on`. The expiration scan matches exact days
    /// because the job runs daily.
    async fn find_expiring_on(&self, on: Timestamp) -> Result<Vec<Subscription>, DomainError>;
}
