//! Catalog-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, PlanId, ValidationError};

/// Errors raised by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The referenced plan does not exist.
    PlanNotFound(PlanId),

    /// The plan exists but the user does not meet its eligibility rules.
    PlanNotEligible { plan_id: PlanId, reason: String },

    /// Validation error.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl CatalogError {
    pub fn plan_not_found(plan_id: PlanId) -> Self {
        CatalogError::PlanNotFound(plan_id)
    }

    pub fn plan_not_eligible(plan_id: PlanId, reason: impl Into<String>) -> Self {
        CatalogError::PlanNotEligible {
            plan_id,
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        CatalogError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            CatalogError::PlanNotEligible { .. } => ErrorCode::PlanNotEligible,
            CatalogError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            CatalogError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a descriptive error message.
    pub fn message(&self) -> String {
        match self {
            CatalogError::PlanNotFound(plan_id) => format!("Plan {} not found", plan_id),
            CatalogError::PlanNotEligible { plan_id, reason } => {
                format!("Plan {} is not available to this user: {}", plan_id, reason)
            }
            CatalogError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            CatalogError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CatalogError {}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field } => field.clone(),
            ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        CatalogError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        CatalogError::Infrastructure(err.to_string())
    }
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
