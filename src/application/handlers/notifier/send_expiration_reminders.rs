//! SendExpirationRemindersHandler - daily scan for expiring coverage.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::handlers::auth::{IssueTokenCommand, IssueTokenHandler};
use crate::config::NotificationConfig;
use crate::domain::auth::{AuthError, Token, TokenPurpose};
use crate::domain::foundation::DomainError;
use crate::domain::subscription::Subscription;
use crate::ports::{
    Clock, Notification, NotificationGateway, PlanRepository, SubscriptionRepository,
    UserRepository,
};

/// Handler reminding subscribers whose coverage ends in a given number of
/// days, with a login link straight into the renewal flow.
///
/// Meant to run once a day per configured offset; the expiring scan matches
/// exact calendar days, so a subscription is picked up by each offset
/// exactly once.
pub struct SendExpirationRemindersHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    issue_tokens: Arc<IssueTokenHandler>,
    gateway: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
    notifications: NotificationConfig,
}

impl SendExpirationRemindersHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        issue_tokens: Arc<IssueTokenHandler>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
        notifications: NotificationConfig,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            users,
            issue_tokens,
            gateway,
            clock,
            notifications,
        }
    }

    /// Sends reminders for coverage ending `remaining_days` from today and
    /// returns how many went out.
    ///
    /// Skips subscriptions on non-renewable plans and subscribers who are
    /// missing or deactivated; a subscriber over the token quota is skipped
    /// with a warning rather than failing the whole run.
    pub async fn handle(&self, remaining_days: i64) -> Result<usize, DomainError> {
        let now = self.clock.now();
        let target = now.add_days(remaining_days);

        let expiring = self.subscriptions.find_expiring_on(target).await?;
        let mut messages = Vec::new();
        for subscription in &expiring {
            if let Some(message) = self.compose_reminder(subscription, remaining_days).await? {
                messages.push(message);
            }
        }

        if messages.is_empty() {
            info!(remaining_days, "no expiration reminders due");
            return Ok(0);
        }
        if let Err(err) = self.gateway.send_batch(&messages).await {
            error!(
                remaining_days,
                count = messages.len(),
                %err,
                "expiration reminder batch failed"
            );
            return Err(err);
        }

        info!(remaining_days, count = messages.len(), "expiration reminders sent");
        Ok(messages.len())
    }

    async fn compose_reminder(
        &self,
        subscription: &Subscription,
        remaining_days: i64,
    ) -> Result<Option<Notification>, DomainError> {
        let plan = match self.plans.find_by_slug(&subscription.plan_slug).await? {
            Some(plan) if plan.is_renewable => plan,
            Some(_) => return Ok(None),
            None => {
                warn!(
                    subscription_id = %subscription.id,
                    plan = %subscription.plan_slug,
                    "expiring subscription references unknown plan"
                );
                return Ok(None);
            }
        };
        let user = match self.users.find_by_id(&subscription.user_id).await? {
            Some(user) if user.is_active => user,
            _ => return Ok(None),
        };
        let address = match self.users.find_email_address_by_email(&user.email).await? {
            Some(address) => address,
            None => {
                warn!(user_id = %user.id, "primary email address record missing");
                return Ok(None);
            }
        };

        let issued = match self
            .issue_tokens
            .handle(IssueTokenCommand {
                email_address_id: address.id,
                purpose: TokenPurpose::Login,
                redirect_hint: Some(format!("/subscriptions/{}/renew", subscription.id)),
            })
            .await
        {
            Ok(issued) => issued,
            Err(AuthError::QuotaExceeded { user_id, limit }) => {
                warn!(%user_id, limit, "reminder skipped, token quota exhausted");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let end_date = match subscription.latest_end_date() {
            Some(end) => end,
            None => return Ok(None),
        };
        let expires = if remaining_days <= 1 {
            "today".to_string()
        } else {
            format!("in {} days", remaining_days)
        };
        let url = Token::url(&self.notifications.base_url, &issued.plaintext_code);
        Ok(Some(
            Notification::new(user.email.clone(), "subscription_expiring")
                .with_context("name", user.full_name())
                .with_context("subscription_id", subscription.id.to_string())
                .with_context("plan", plan.name.clone())
                .with_context("expires", expires)
                .with_context("end_date", end_date.date().to_string())
                .with_context("renewal_url", url),
        ))
    }
}
