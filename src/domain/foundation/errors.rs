//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Quota errors (recoverable, distinct from validation)
    QuotaExceeded,

    // Not found errors
    UserNotFound,
    EmailAddressNotFound,
    PlanNotFound,
    SubscriptionNotFound,
    PaymentNotFound,

    // Authentication errors
    TokenNotFound,
    TokenExpired,
    UserInactive,

    // State errors (caller bugs, loud in logs)
    InvalidStateTransition,
    AlreadyPaid,
    OpenPayments,
    NotRenewable,
    RenewalTooEarly,
    PrimaryEmailUndeletable,
    AlreadyVerified,
    EmailTaken,
    PlanNotEligible,
    UnsupportedPaymentMethod,

    // Uniqueness collisions (handled internally via retry)
    CodeConflict,

    // Infrastructure errors
    StorageError,
    DispatchError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::EmailAddressNotFound => "EMAIL_ADDRESS_NOT_FOUND",
            ErrorCode::PlanNotFound => "PLAN_NOT_FOUND",
            ErrorCode::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            ErrorCode::PaymentNotFound => "PAYMENT_NOT_FOUND",
            ErrorCode::TokenNotFound => "TOKEN_NOT_FOUND",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::UserInactive => "USER_INACTIVE",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::AlreadyPaid => "ALREADY_PAID",
            ErrorCode::OpenPayments => "OPEN_PAYMENTS",
            ErrorCode::NotRenewable => "NOT_RENEWABLE",
            ErrorCode::RenewalTooEarly => "RENEWAL_TOO_EARLY",
            ErrorCode::PrimaryEmailUndeletable => "PRIMARY_EMAIL_UNDELETABLE",
            ErrorCode::AlreadyVerified => "ALREADY_VERIFIED",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::PlanNotEligible => "PLAN_NOT_ELIGIBLE",
            ErrorCode::UnsupportedPaymentMethod => "UNSUPPORTED_PAYMENT_METHOD",
            ErrorCode::CodeConflict => "CODE_CONFLICT",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::DispatchError => "DISPATCH_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates a storage-layer error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}
