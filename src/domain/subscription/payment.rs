//! Payment entity and code generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{PaymentId, Timestamp};

use super::SubscriptionError;

/// How a payment is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Billed by emailed invoice, settled out of band.
    Invoice,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Invoice => "invoice",
        }
    }

    /// Parses a method name from external input.
    ///
    /// Unknown names are a failure value, not a panic; new gateways extend
    /// this match.
    pub fn parse(input: &str) -> Result<Self, SubscriptionError> {
        match input.trim().to_lowercase().as_str() {
            "invoice" => Ok(PaymentMethod::Invoice),
            other => Err(SubscriptionError::unsupported_method(other)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment, owned by exactly one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Price in whole currency units; zero auto-confirms at creation time.
    pub amount: u32,
    pub method: PaymentMethod,
    /// Human-readable unique reference, `ps-<plan slug>-<12 random>`.
    /// Appears on invoices and bank statements.
    pub code: String,
    pub due_on: Timestamp,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Payment {
    /// Creates an unpaid payment with a freshly generated code.
    pub fn new(
        amount: u32,
        method: PaymentMethod,
        plan_slug: &str,
        now: Timestamp,
        due_days: i64,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            amount,
            method,
            code: Self::generate_code(plan_slug),
            due_on: now.add_days(due_days),
            paid_at: None,
            created_at: now,
        }
    }

    /// Generates a payment reference, `ps-<slug>-<12 random hex>`.
    ///
    /// 48 bits of randomness; the persist layer retries with a fresh code on
    /// a uniqueness conflict.
    pub fn generate_code(plan_slug: &str) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("ps-{}-{}", plan_slug, &random[..12])
    }

    /// Draws a new code after a uniqueness conflict.
    pub fn regenerate_code(&mut self, plan_slug: &str) {
        self.code = Self::generate_code(plan_slug);
    }

    /// True once the payment has been confirmed.
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    /// Confirms the payment, setting `paid_at` exactly once.
    ///
    /// A second confirmation is rejected so coverage is never extended twice
    /// for one payment.
    pub fn confirm(&mut self, now: Timestamp) -> Result<(), SubscriptionError> {
        if self.is_paid() {
            return Err(SubscriptionError::already_paid(self.id));
        }
        self.paid_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: u32) -> Payment {
        Payment::new(amount, PaymentMethod::Invoice, "regular", Timestamp::now(), 30)
    }

    #[test]
    fn new_payment_is_unpaid_with_due_date() {
        let now = Timestamp::now();
        let p = Payment::new(50, PaymentMethod::Invoice, "regular", now, 30);
        assert!(!p.is_paid());
        assert_eq!(p.due_on, now.add_days(30));
    }

    #[test]
    fn code_embeds_plan_slug() {
        let p = payment(50);
        assert!(p.code.starts_with("ps-regular-"));
        assert_eq!(p.code.len(), "ps-regular-".len() + 12);
    }

    #[test]
    fn generated_codes_differ() {
        assert_ne!(payment(50).code, payment(50).code);
    }

    #[test]
    fn confirm_sets_paid_at_exactly_once() {
        let mut p = payment(50);
        let now = Timestamp::now();
        p.confirm(now).unwrap();
        assert_eq!(p.paid_at, Some(now));

        let again = p.confirm(now.add_days(1));
        assert_eq!(again, Err(SubscriptionError::already_paid(p.id)));
        assert_eq!(p.paid_at, Some(now));
    }

    #[test]
    fn parse_accepts_invoice_and_rejects_others() {
        assert_eq!(PaymentMethod::parse(" Invoice "), Ok(PaymentMethod::Invoice));
        assert!(matches!(
            PaymentMethod::parse("card"),
            Err(SubscriptionError::UnsupportedPaymentMethod(m)) if m == "card"
        ));
    }
}
