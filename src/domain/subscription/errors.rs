//! Subscription-specific error types.

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, SubscriptionId, ValidationError,
};

/// Errors raised by subscription lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Subscription was not found.
    SubscriptionNotFound(SubscriptionId),

    /// No such payment on the subscription.
    PaymentNotFound(PaymentId),

    /// The referenced plan does not exist.
    PlanNotFound(String),

    /// The user does not meet the plan's eligibility rules.
    PlanNotEligible { plan_slug: String, reason: String },

    /// The payment has already been confirmed. Confirmation never
    /// double-extends coverage.
    AlreadyPaid(PaymentId),

    /// An unpaid payment blocks the requested operation.
    OpenPayments(SubscriptionId),

    /// The operation requires a currently active subscription.
    NotActive(SubscriptionId),

    /// The plan does not allow renewal.
    NotRenewable(String),

    /// The active period ends too far in the future to renew yet.
    RenewalTooEarly { days_left: i64, window_days: i64 },

    /// Payment method this system cannot process. Extension point for
    /// future gateways.
    UnsupportedPaymentMethod(String),

    /// Validation error.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::SubscriptionNotFound(id)
    }

    pub fn payment_not_found(id: PaymentId) -> Self {
        SubscriptionError::PaymentNotFound(id)
    }

    pub fn plan_not_found(slug: impl Into<String>) -> Self {
        SubscriptionError::PlanNotFound(slug.into())
    }

    pub fn plan_not_eligible(plan_slug: impl Into<String>, reason: impl Into<String>) -> Self {
        SubscriptionError::PlanNotEligible {
            plan_slug: plan_slug.into(),
            reason: reason.into(),
        }
    }

    pub fn already_paid(id: PaymentId) -> Self {
        SubscriptionError::AlreadyPaid(id)
    }

    pub fn open_payments(id: SubscriptionId) -> Self {
        SubscriptionError::OpenPayments(id)
    }

    pub fn not_active(id: SubscriptionId) -> Self {
        SubscriptionError::NotActive(id)
    }

    pub fn not_renewable(slug: impl Into<String>) -> Self {
        SubscriptionError::NotRenewable(slug.into())
    }

    pub fn renewal_too_early(days_left: i64, window_days: i64) -> Self {
        SubscriptionError::RenewalTooEarly {
            days_left,
            window_days,
        }
    }

    pub fn unsupported_method(method: impl Into<String>) -> Self {
        SubscriptionError::UnsupportedPaymentMethod(method.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            SubscriptionError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            SubscriptionError::PlanNotEligible { .. } => ErrorCode::PlanNotEligible,
            SubscriptionError::AlreadyPaid(_) => ErrorCode::AlreadyPaid,
            SubscriptionError::OpenPayments(_) => ErrorCode::OpenPayments,
            SubscriptionError::NotActive(_) => ErrorCode::InvalidStateTransition,
            SubscriptionError::NotRenewable(_) => ErrorCode::NotRenewable,
            SubscriptionError::RenewalTooEarly { .. } => ErrorCode::RenewalTooEarly,
            SubscriptionError::UnsupportedPaymentMethod(_) => ErrorCode::UnsupportedPaymentMethod,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a descriptive error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::SubscriptionNotFound(id) => {
                format!("Subscription not found: {}", id)
            }
            SubscriptionError::PaymentNotFound(id) => format!("Payment not found: {}", id),
            SubscriptionError::PlanNotFound(slug) => format!("Plan '{}' not found", slug),
            SubscriptionError::PlanNotEligible { plan_slug, reason } => {
                format!("Plan '{}' is not available to this user: {}", plan_slug, reason)
            }
            SubscriptionError::AlreadyPaid(id) => {
                format!("Payment {} has already been confirmed", id)
            }
            SubscriptionError::OpenPayments(id) => {
                format!("Subscription {} has an outstanding payment", id)
            }
            SubscriptionError::NotActive(id) => {
                format!("Subscription {} is not currently active", id)
            }
            SubscriptionError::NotRenewable(slug) => {
                format!("Plan '{}' cannot be renewed", slug)
            }
            SubscriptionError::RenewalTooEarly {
                days_left,
                window_days,
            } => format!(
                "Renewal opens {} days before expiry; {} days remain",
                window_days, days_left
            ),
            SubscriptionError::UnsupportedPaymentMethod(method) => {
                format!("Unsupported payment method: {}", method)
            }
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } => field.clone(),
            ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        SubscriptionError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        SubscriptionError::Infrastructure(err.to_string())
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
