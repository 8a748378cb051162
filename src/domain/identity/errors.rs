//! Identity-specific error types.

use crate::domain::foundation::{
    DomainError, Email, EmailAddressId, ErrorCode, UserId, ValidationError,
};

/// Errors raised by user and email-address operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// User was not found.
    UserNotFound(UserId),

    /// Email address record was not found.
    EmailAddressNotFound(EmailAddressId),

    /// Another account already owns this email address.
    EmailTaken(Email),

    /// The address belongs to a different user.
    NotOwned {
        user_id: UserId,
        email_address_id: EmailAddressId,
    },

    /// The address is already verified; verification is one-way.
    AlreadyVerified(EmailAddressId),

    /// A primary address cannot be deleted.
    PrimaryEmailUndeletable(EmailAddressId),

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl IdentityError {
    pub fn user_not_found(id: UserId) -> Self {
        IdentityError::UserNotFound(id)
    }

    pub fn email_address_not_found(id: EmailAddressId) -> Self {
        IdentityError::EmailAddressNotFound(id)
    }

    pub fn email_taken(email: Email) -> Self {
        IdentityError::EmailTaken(email)
    }

    pub fn not_owned(user_id: UserId, email_address_id: EmailAddressId) -> Self {
        IdentityError::NotOwned {
            user_id,
            email_address_id,
        }
    }

    pub fn already_verified(id: EmailAddressId) -> Self {
        IdentityError::AlreadyVerified(id)
    }

    pub fn primary_undeletable(id: EmailAddressId) -> Self {
        IdentityError::PrimaryEmailUndeletable(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        IdentityError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        IdentityError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            IdentityError::UserNotFound(_) => ErrorCode::UserNotFound,
            IdentityError::EmailAddressNotFound(_) | IdentityError::NotOwned { .. } => {
                ErrorCode::EmailAddressNotFound
            }
            IdentityError::EmailTaken(_) => ErrorCode::EmailTaken,
            IdentityError::AlreadyVerified(_) => ErrorCode::AlreadyVerified,
            IdentityError::PrimaryEmailUndeletable(_) => ErrorCode::PrimaryEmailUndeletable,
            IdentityError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            IdentityError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a descriptive error message.
    pub fn message(&self) -> String {
        match self {
            IdentityError::UserNotFound(id) => format!("User not found: {}", id),
            IdentityError::EmailAddressNotFound(id) => {
                format!("Email address not found: {}", id)
            }
            IdentityError::EmailTaken(email) => {
                format!("Email address {} is already in use", email)
            }
            IdentityError::NotOwned {
                user_id,
                email_address_id,
            } => format!(
                "Email address {} does not belong to user {}",
                email_address_id, user_id
            ),
            IdentityError::AlreadyVerified(id) => {
                format!("Email address {} is already verified", id)
            }
            IdentityError::PrimaryEmailUndeletable(id) => {
                format!("Email address {} is primary and cannot be deleted", id)
            }
            IdentityError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            IdentityError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for IdentityError {}

impl From<ValidationError> for IdentityError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { ref field } => {
                IdentityError::validation(field.clone(), err.to_string())
            }
            ValidationError::InvalidFormat { ref field, .. } => {
                IdentityError::validation(field.clone(), err.to_string())
            }
        }
    }
}

impl From<DomainError> for IdentityError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::UserNotFound => IdentityError::Infrastructure(err.to_string()),
            ErrorCode::ValidationFailed => IdentityError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => IdentityError::Infrastructure(err.to_string()),
        }
    }
}

impl From<IdentityError> for DomainError {
    fn from(err: IdentityError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
