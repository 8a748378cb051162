//! CreateSubscriptionHandler - purchase entry point.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::domain::catalog::Plan;
use crate::domain::foundation::{ErrorCode, PaymentId, UserId};
use crate::domain::subscription::{
    Address, PaymentMethod, Subscription, SubscriptionError,
};
use crate::ports::{
    Clock, NotificationGateway, PlanRepository, SubscriptionRepository, UserRepository,
};

use super::invoicing;

// bounded retry for payment-code uniqueness conflicts
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Command to purchase a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    pub plan_slug: String,
    /// Settlement method name; only "invoice" is processable today.
    pub payment_method: String,
    pub address: Address,
}

/// Result of a successful purchase.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    pub payment_id: PaymentId,
    /// True when the plan was free and coverage started immediately.
    pub auto_confirmed: bool,
}

/// Handler creating a subscription with its first period and payment.
///
/// Eligibility is re-validated at purchase time against the primary
/// verified address, not whatever the catalog listing showed earlier. Free
/// plans activate immediately; priced plans get an invoice and stay pending
/// until staff confirm the payment.
pub struct CreateSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
    billing: BillingConfig,
}

impl CreateSubscriptionHandler {
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
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, SubscriptionError> {
        let now = self.clock.now();

        let plan = self
            .plans
            .find_by_slug(&cmd.plan_slug)
            .await?
            .ok_or_else(|| SubscriptionError::plan_not_found(&cmd.plan_slug))?;
        PaymentMethod::parse(&cmd.payment_method)?;

        let user = self
            .users
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or_else(|| SubscriptionError::infrastructure("User not found"))?;

        self.check_eligibility(&plan, &cmd.user_id, now).await?;

        let mut subscription =
            Subscription::create(cmd.user_id, &plan, cmd.address, now, self.billing.payment_due_days)?;
        self.persist_new(&mut subscription, &plan).await?;
        let payment_id = subscription.periods[0].payment.id;
        info!(
            subscription_id = %subscription.id,
            plan = %plan.slug,
            "subscription created"
        );

        let auto_confirmed = if plan.price == 0 {
            let outcome = subscription.confirm_payment(payment_id, &plan, now)?;
            self.subscriptions
                .update_if_unpaid(&subscription, &payment_id)
                .await?;
            let message =
                invoicing::confirmation_message(&user, &plan.name, false, outcome.end_date);
            if let Err(err) = self.gateway.send(&message).await {
                warn!(subscription_id = %subscription.id, %err, "confirmation dispatch failed");
            }
            true
        } else {
            invoicing::dispatch_invoices(
                self.gateway.as_ref(),
                &user,
                &plan.name,
                &subscription.periods[0].payment,
                &self.billing,
            )
            .await;
            false
        };

        Ok(CreateSubscriptionResult {
            subscription,
            payment_id,
            auto_confirmed,
        })
    }

    /// Purchase-time eligibility: purchasable, under the cap, and (for
    /// domain-restricted plans) a verified primary address in an allowed
    /// domain.
    async fn check_eligibility(
        &self,
        plan: &Plan,
        user_id: &UserId,
        now: crate::domain::foundation::Timestamp,
    ) -> Result<(), SubscriptionError> {
        if !plan.is_purchasable {
            return Err(SubscriptionError::plan_not_eligible(
                &plan.slug,
                "plan is not purchasable",
            ));
        }
        match plan.eligible_active_subscriptions_per_user {
            Some(0) => {
                return Err(SubscriptionError::plan_not_eligible(
                    &plan.slug,
                    "plan has been retired",
                ))
            }
            Some(cap) => {
                let active = self
                    .subscriptions
                    .count_active_for_plan(user_id, &plan.slug, now)
                    .await?;
                if active >= cap {
                    return Err(SubscriptionError::plan_not_eligible(
                        &plan.slug,
                        "subscription cap reached",
                    ));
                }
            }
            None => {}
        }
        if plan.eligible_email_domains.is_some() {
            let addresses = self.users.email_addresses_for_user(user_id).await?;
            let primary_ok = addresses
                .iter()
                .find(|a| a.is_primary)
                .map(|a| a.is_verified() && plan.allows_domain(a.email.domain()))
                .unwrap_or(false);
            if !primary_ok {
                return Err(SubscriptionError::plan_not_eligible(
                    &plan.slug,
                    "no verified primary address in an eligible domain",
                ));
            }
        }
        Ok(())
    }

    /// Persists the fresh aggregate, redrawing the payment code on a
    /// uniqueness conflict.
    async fn persist_new(
        &self,
        subscription: &mut Subscription,
        plan: &Plan,
    ) -> Result<(), SubscriptionError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            match self.subscriptions.create(subscription).await {
                Ok(()) => return Ok(()),
                Err(err) if err.code == ErrorCode::CodeConflict => {
                    subscription.periods[0].payment.regenerate_code(&plan.slug);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(SubscriptionError::infrastructure(
            "Payment code generation kept colliding",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{
        InMemoryNotificationGateway, InMemoryPlanRepository, InMemorySubscriptionRepository,
        InMemoryUserRepository,
    };
    use crate::domain::catalog::PlanDuration;
    use crate::domain::foundation::{Email, EmailAddressId, PlanId, Timestamp};
    use crate::domain::identity::{EmailAddress, User};
    use crate::domain::subscription::SubscriptionStatus;

    fn plan(slug: &str, price: u32) -> Plan {
        Plan {
            id: PlanId::new(),
            slug: slug.to_string(),
            name: slug.to_string(),
            price,
            duration: PlanDuration::Months(12),
            is_purchasable: true,
            is_renewable: true,
            eligible_email_domains: None,
            eligible_active_subscriptions_per_user: None,
            renews_to: None,
        }
    }

    fn postal_address() -> Address {
        Address {
            first_name: "Nora".to_string(),
            last_name: "Keller".to_string(),
            address_line_1: "Musterstrasse 1".to_string(),
            address_line_2: None,
            postcode: "8000".to_string(),
            city: "Zurich".to_string(),
            country: "Switzerland".to_string(),
        }
    }

    struct Fixture {
        subscriptions: Arc<InMemorySubscriptionRepository>,
        users: Arc<InMemoryUserRepository>,
        gateway: Arc<InMemoryNotificationGateway>,
        handler: CreateSubscriptionHandler,
        user: User,
        email_address: EmailAddress,
        now: Timestamp,
    }

    async fn fixture(plans: Vec<Plan>, email: &str) -> Fixture {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let plans = Arc::new(InMemoryPlanRepository::with_plans(plans));
        let users = Arc::new(InMemoryUserRepository::new());
        let gateway = Arc::new(InMemoryNotificationGateway::new());
        let now = Timestamp::from_ymd(2024, 5, 1).unwrap();
        let clock = Arc::new(FixedClock::at(now));

        let email = Email::new(email).unwrap();
        let user = User::create(UserId::new(), email.clone(), "Nora", "Keller", now).unwrap();
        let email_address = EmailAddress::new(EmailAddressId::new(), user.id, email, true, now);
        users
            .create_with_primary_email(&user, &email_address)
            .await
            .unwrap();

        let handler = CreateSubscriptionHandler::new(
            subscriptions.clone(),
            plans,
            users.clone(),
            gateway.clone(),
            clock,
            BillingConfig::default(),
        );
        Fixture {
            subscriptions,
            users,
            gateway,
            handler,
            user,
            email_address,
            now,
        }
    }

    fn command(user_id: UserId, slug: &str) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            user_id,
            plan_slug: slug.to_string(),
            payment_method: "invoice".to_string(),
            address: postal_address(),
        }
    }

    #[tokio::test]
    async fn priced_plan_creates_pending_subscription_with_invoice() {
        let f = fixture(vec![plan("regular", 50)], "nora@example.com").await;
        let result = f
            .handler
            .handle(command(f.user.id, "regular"))
            .await
            .unwrap();

        assert!(!result.auto_confirmed);
        assert_eq!(
            result.subscription.status(f.now),
            SubscriptionStatus::Pending
        );
        assert_eq!(result.subscription.periods[0].payment.due_on, f.now.add_days(30));

        // invoice to subscriber plus accounting copy
        let sent = f.gateway.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|n| n.template_id == "payment_invoice"));
        assert!(sent
            .iter()
            .any(|n| n.recipient.as_str() == "nora@example.com"));
    }

    #[tokio::test]
    async fn free_plan_activates_immediately() {
        let f = fixture(vec![plan("friend", 0)], "nora@example.com").await;
        let result = f
            .handler
            .handle(command(f.user.id, "friend"))
            .await
            .unwrap();

        assert!(result.auto_confirmed);
        let stored = f
            .subscriptions
            .find_by_id(&result.subscription.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status(f.now), SubscriptionStatus::Active);

        let sent = f.gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template_id, "subscription_started");
    }

    #[tokio::test]
    async fn unknown_plan_is_rejected() {
        let f = fixture(vec![], "nora@example.com").await;
        let err = f
            .handler
            .handle(command(f.user.id, "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::PlanNotFound(_)));
    }

    #[tokio::test]
    async fn unsupported_payment_method_is_a_failure_value() {
        let f = fixture(vec![plan("regular", 50)], "nora@example.com").await;
        let mut cmd = command(f.user.id, "regular");
        cmd.payment_method = "card".to_string();

        let err = f.handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::UnsupportedPaymentMethod(_)));
        assert!(f.gateway.sent().await.is_empty());
    }

    #[tokio::test]
    async fn domain_restricted_plan_requires_verified_primary() {
        let mut student = plan("student", 25);
        student.eligible_email_domains = Some(vec!["student.example.edu".to_string()]);
        let f = fixture(vec![student], "nora@student.example.edu").await;

        // primary not verified yet
        let err = f
            .handler
            .handle(command(f.user.id, "student"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::PlanNotEligible { .. }));

        let mut verified = f.email_address.clone();
        verified.verify(f.now).unwrap();
        f.users.update_email_address(&verified).await.unwrap();
        assert!(f.handler.handle(command(f.user.id, "student")).await.is_ok());
    }

    #[tokio::test]
    async fn cap_blocks_second_active_subscription() {
        let mut capped = plan("regular", 0);
        capped.eligible_active_subscriptions_per_user = Some(1);
        let f = fixture(vec![capped], "nora@example.com").await;

        // free plan, so the first purchase is immediately active
        f.handler.handle(command(f.user.id, "regular")).await.unwrap();
        let err = f
            .handler
            .handle(command(f.user.id, "regular"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::PlanNotEligible { .. }));
    }
}
