//! ConsumeTokenHandler - authenticates a presented token code.

use std::sync::Arc;

use tracing::info;

use crate::domain::auth::{AuthFailure, Token};
use crate::domain::identity::User;
use crate::ports::{Clock, TokenRepository, UserRepository};

/// Handler resolving a plaintext code into an authenticated user.
///
/// Single-use: success deletes the token in the same operation, so the same
/// code presented twice fails the second time. All failures collapse to one
/// public message; the variants exist for logs.
pub struct ConsumeTokenHandler {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ConsumeTokenHandler {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            clock,
        }
    }

    /// Consumes a code and returns the owning user.
    ///
    /// Expired tokens are left in place for the sweep; a valid token is
    /// deleted even when the owning user turns out to be deactivated, so
    /// repeated probing of one code learns nothing.
    pub async fn handle(&self, plaintext_code: &str) -> Result<User, AuthFailure> {
        let now = self.clock.now();

        let token = self
            .tokens
            .find_by_code_hash(&Token::hash_code(plaintext_code))
            .await?
            .ok_or(AuthFailure::NotFound)?;

        if token.is_expired(now) {
            return Err(AuthFailure::Expired);
        }

        self.tokens.delete(&token.id).await?;
        let address = self
            .users
            .find_email_address(&token.email_address_id)
            .await?
            .ok_or_else(|| AuthFailure::infrastructure("Email address gone"))?;

        let user = self
            .users
            .find_by_id(&address.user_id)
            .await?
            .ok_or_else(|| AuthFailure::infrastructure("User gone"))?;

        if !user.is_active {
            return Err(AuthFailure::InactiveUser(user.id));
        }

        info!(user_id = %user.id, purpose = %token.purpose, "token consumed");
        Ok(user)
    }
}
