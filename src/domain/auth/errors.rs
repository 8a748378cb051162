//! Auth-specific error types.
//!
//! Two families: `AuthError` for issuance and maintenance operations, and
//! `AuthFailure` for consumption. Consumption failures stay distinguishable
//! internally (for logs) but collapse to one uniform public message so
//! callers cannot enumerate accounts or tokens.

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Errors raised while issuing, dispatching, or sweeping tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The owning user has hit the hourly issuance quota. Recoverable;
    /// callers show "try again later", not "your input was wrong".
    QuotaExceeded { user_id: UserId, limit: u32 },

    /// Code generation kept colliding. Practically unreachable with 128-bit
    /// codes; indicates a broken storage layer.
    CodeGenerationExhausted,

    /// Infrastructure error.
    Infrastructure(String),
}

impl AuthError {
    pub fn quota_exceeded(user_id: UserId, limit: u32) -> Self {
        AuthError::QuotaExceeded { user_id, limit }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AuthError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            AuthError::CodeGenerationExhausted => ErrorCode::InternalError,
            AuthError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// Returns a descriptive error message.
    pub fn message(&self) -> String {
        match self {
            AuthError::QuotaExceeded { user_id, limit } => format!(
                "User {} exceeded the token quota of {} per hour",
                user_id, limit
            ),
            AuthError::CodeGenerationExhausted => {
                "Token code generation kept colliding".to_string()
            }
            AuthError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AuthError {}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        AuthError::Infrastructure(err.to_string())
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

/// Why token consumption failed.
///
/// The variants exist for logging and tests; anything user-facing goes
/// through [`AuthFailure::public_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// No token matches the presented code.
    NotFound,

    /// The token exists but its validity window has passed. The token is
    /// retained; only the sweep deletes expired tokens.
    Expired,

    /// The token was valid and has been consumed, but the owning user is
    /// deactivated. Consuming anyway prevents retry-based enumeration.
    InactiveUser(UserId),

    /// Infrastructure error.
    Infrastructure(String),
}

impl AuthFailure {
    pub fn infrastructure(message: impl Into<String>) -> Self {
        AuthFailure::Infrastructure(message.into())
    }

    /// Returns the error code for logging.
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthFailure::NotFound => ErrorCode::TokenNotFound,
            AuthFailure::Expired => ErrorCode::TokenExpired,
            AuthFailure::InactiveUser(_) => ErrorCode::UserInactive,
            AuthFailure::Infrastructure(_) => ErrorCode::StorageError,
        }
    }

    /// The one message external callers may see, regardless of variant.
    pub fn public_message(&self) -> &'static str {
        "This link is invalid or has expired."
    }

    /// Internal description for structured logs.
    pub fn message(&self) -> String {
        match self {
            AuthFailure::NotFound => "Token code not found".to_string(),
            AuthFailure::Expired => "Token has expired".to_string(),
            AuthFailure::InactiveUser(user_id) => {
                format!("Token consumed for inactive user {}", user_id)
            }
            AuthFailure::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AuthFailure {}

impl From<DomainError> for AuthFailure {
    fn from(err: DomainError) -> Self {
        AuthFailure::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_carries_limit() {
        let err = AuthError::quota_exceeded(UserId::new(), 10);
        assert_eq!(err.code(), ErrorCode::QuotaExceeded);
        assert!(err.message().contains("10"));
    }

    #[test]
    fn public_message_is_uniform_across_variants() {
        let failures = [
            AuthFailure::NotFound,
            AuthFailure::Expired,
            AuthFailure::InactiveUser(UserId::new()),
        ];
        let messages: Vec<_> = failures.iter().map(|f| f.public_message()).collect();
        assert!(messages.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn internal_codes_stay_distinguishable() {
        assert_ne!(AuthFailure::NotFound.code(), AuthFailure::Expired.code());
        assert_ne!(
            AuthFailure::Expired.code(),
            AuthFailure::InactiveUser(UserId::new()).code()
        );
    }
}
