//! VerifyEmailHandler - proves address ownership via a token.

use std::sync::Arc;

use tracing::info;

use crate::domain::auth::{AuthFailure, Token, TokenPurpose};
use crate::domain::identity::EmailAddress;
use crate::ports::{Clock, TokenRepository, UserRepository};

/// Handler consuming a `Verification` token and marking the owning address
/// verified.
///
/// Failures use the same uniform public message as login consumption.
/// Verification is one-way; a second token for an already-verified address
/// succeeds without changing anything.
pub struct VerifyEmailHandler {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl VerifyEmailHandler {
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

    pub async fn handle(&self, plaintext_code: &str) -> Result<EmailAddress, AuthFailure> {
        let now = self.clock.now();

        let token = self
            .tokens
            .find_by_code_hash(&Token::hash_code(plaintext_code))
            .await?
            .ok_or(AuthFailure::NotFound)?;
        if token.purpose != TokenPurpose::Verification {
            return Err(AuthFailure::NotFound);
        }
        if token.is_expired(now) {
            return Err(AuthFailure::Expired);
        }

        self.tokens.delete(&token.id).await?;

        let mut address = self
            .users
            .find_email_address(&token.email_address_id)
            .await?
            .ok_or_else(|| AuthFailure::infrastructure("Email address gone"))?;

        if !address.is_verified() {
            address
                .verify(now)
                .map_err(|err| AuthFailure::infrastructure(err.to_string()))?;
            self.users.update_email_address(&address).await?;
            info!(email_address_id = %address.id, "email address verified");
        }
        Ok(address)
    }
}
