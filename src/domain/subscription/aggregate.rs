//! Subscription aggregate root.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::catalog::Plan;
use crate::domain::foundation::{
    PaymentId, StateMachine, SubscriptionId, Timestamp, UserId, ValidationError,
};

use super::{Payment, PaymentMethod, Period, SubscriptionError, SubscriptionStatus};

/// Postal address the subscription is delivered and invoiced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub postcode: String,
    pub city: String,
    pub country: String,
}

impl Address {
    /// Validates that all required lines are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address_line_1", &self.address_line_1),
            ("postcode", &self.postcode),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::empty_field(field));
            }
        }
        Ok(())
    }
}

/// Outcome of confirming a payment, for notification template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub payment_id: PaymentId,
    /// True when the confirmed payment belongs to a renewal, not the first
    /// period.
    pub is_renewal: bool,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// A subscription and its full billing history.
///
/// Owns its periods; each period owns one payment. Status is derived from
/// these facts plus the cancel flag, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_slug: String,
    pub address: Address,
    pub periods: Vec<Period>,
    pub canceled_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Subscription {
    /// Creates a subscription with its initial period and unpaid payment.
    ///
    /// Dates stay unset until the payment confirms; free plans are confirmed
    /// by the caller immediately after persisting.
    pub fn create(
        user_id: UserId,
        plan: &Plan,
        address: Address,
        now: Timestamp,
        payment_due_days: i64,
    ) -> Result<Self, SubscriptionError> {
        address.validate()?;
        let payment = Payment::new(
            plan.price,
            PaymentMethod::Invoice,
            &plan.slug,
            now,
            payment_due_days,
        );
        Ok(Self {
            id: SubscriptionId::new(),
            user_id,
            plan_slug: plan.slug.clone(),
            address,
            periods: vec![Period::new(payment)],
            canceled_at: None,
            created_at: now,
        })
    }

    /// Derives the lifecycle status at the given moment.
    ///
    /// Canceled wins over everything; otherwise a paid period covering `now`
    /// means active; otherwise any confirmed payment means the coverage has
    /// lapsed; otherwise the first payment is still open.
    pub fn status(&self, now: Timestamp) -> SubscriptionStatus {
        if self.canceled_at.is_some() {
            return SubscriptionStatus::Canceled;
        }
        if self.periods.iter().any(|p| p.covers(now)) {
            return SubscriptionStatus::Active;
        }
        if self.periods.iter().any(|p| p.is_paid()) {
            return SubscriptionStatus::Expired;
        }
        SubscriptionStatus::Pending
    }

    /// True while a paid period covers the present moment and the
    /// subscription is not canceled.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.status(now) == SubscriptionStatus::Active
    }

    /// The paid period covering the given moment, if any.
    pub fn active_period(&self, now: Timestamp) -> Option<&Period> {
        self.periods.iter().find(|p| p.covers(now))
    }

    /// The end of the latest paid coverage.
    pub fn latest_end_date(&self) -> Option<Timestamp> {
        self.periods
            .iter()
            .filter(|p| p.is_paid())
            .filter_map(|p| p.end_date)
            .max()
    }

    /// True while any payment on the subscription is unconfirmed.
    pub fn has_open_payments(&self) -> bool {
        self.periods.iter().any(|p| !p.is_paid())
    }

    /// Looks up a payment across all periods.
    pub fn payment(&self, payment_id: PaymentId) -> Option<&Payment> {
        self.periods
            .iter()
            .map(|p| &p.payment)
            .find(|payment| payment.id == payment_id)
    }

    /// Confirms a payment and starts the coverage it bought.
    ///
    /// If the owning period has no planned start, or the confirmation
    /// arrives after the planned start, coverage runs from `now` for one
    /// plan duration; a renewal confirmed on time keeps its pre-chained
    /// dates. A second confirmation is rejected and never extends coverage.
    pub fn confirm_payment(
        &mut self,
        payment_id: PaymentId,
        plan: &Plan,
        now: Timestamp,
    ) -> Result<PaymentConfirmation, SubscriptionError> {
        let is_renewal = self.periods.len() > 1;
        let period = self
            .periods
            .iter_mut()
            .find(|p| p.payment.id == payment_id)
            .ok_or(SubscriptionError::PaymentNotFound(payment_id))?;

        period.payment.confirm(now)?;

        let restart = match period.start_date {
            None => true,
            Some(start) => now.is_after(&start),
        };
        if restart {
            period.set_dates(now, plan.duration.extend(now));
        }
        let start_date = period.start_date.unwrap_or(now);
        let end_date = period.end_date.unwrap_or(now);

        info!(
            subscription_id = %self.id,
            payment_id = %payment_id,
            is_renewal,
            end_date = %end_date.date(),
            "payment confirmed"
        );
        Ok(PaymentConfirmation {
            payment_id,
            is_renewal,
            start_date,
            end_date,
        })
    }

    /// Appends a renewal period chained to the current coverage.
    ///
    /// Requires the subscription to be active with nothing outstanding, and
    /// the current coverage to end within the renewal window. The new period
    /// runs from the previous `end_date` so coverage never overlaps and
    /// early renewal never shortens what was already bought.
    pub fn renew(
        &mut self,
        renews_to: &Plan,
        now: Timestamp,
        renewal_window_days: i64,
        payment_due_days: i64,
    ) -> Result<&Period, SubscriptionError> {
        if self.has_open_payments() {
            return Err(SubscriptionError::open_payments(self.id));
        }
        // a canceled subscription still has a covering paid period; the
        // derived status is the gate, not coverage alone
        if self.status(now) != SubscriptionStatus::Active {
            return Err(SubscriptionError::not_active(self.id));
        }
        let current_end = match self.active_period(now).and_then(|p| p.end_date) {
            Some(end) => end,
            None => return Err(SubscriptionError::not_active(self.id)),
        };
        let days_left = now.days_until(&current_end);
        if days_left > renewal_window_days {
            return Err(SubscriptionError::renewal_too_early(
                days_left,
                renewal_window_days,
            ));
        }

        let payment = Payment::new(
            renews_to.price,
            PaymentMethod::Invoice,
            &renews_to.slug,
            now,
            payment_due_days,
        );
        let period = Period::with_dates(
            current_end,
            renews_to.duration.extend(current_end),
            payment,
        );
        info!(
            subscription_id = %self.id,
            plan = %renews_to.slug,
            start_date = %current_end.date(),
            "renewal period added"
        );
        let idx = self.periods.len();
        self.periods.push(period);
        // a plan with renews_to carries the subscription over to that plan
        self.plan_slug = renews_to.slug.clone();
        Ok(&self.periods[idx])
    }

    /// Cancels the subscription, one-way.
    ///
    /// Only an active subscription with nothing outstanding may cancel;
    /// records are retained.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), SubscriptionError> {
        let status = self.status(now);
        if self.has_open_payments() {
            return Err(SubscriptionError::open_payments(self.id));
        }
        if status != SubscriptionStatus::Active {
            return Err(SubscriptionError::not_active(self.id));
        }
        status
            .transition_to(SubscriptionStatus::Canceled)
            .map_err(SubscriptionError::from)?;
        self.canceled_at = Some(now);
        info!(subscription_id = %self.id, "subscription canceled");
        Ok(())
    }
}
