//! IssueTokenHandler - mints and dispatches single-use tokens.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{NotificationConfig, TokenConfig};
use crate::domain::auth::{AuthError, Token, TokenPurpose};
use crate::domain::foundation::{EmailAddressId, ErrorCode};
use crate::ports::{Clock, Notification, NotificationGateway, TokenRepository, UserRepository};

/// Command to issue a token for an email address.
#[derive(Debug, Clone)]
pub struct IssueTokenCommand {
    pub email_address_id: EmailAddressId,
    pub purpose: TokenPurpose,
    /// Optional path the consuming surface should land the user on.
    pub redirect_hint: Option<String>,
}

/// A freshly issued token with its one-time plaintext code.
///
/// The plaintext exists only in this value and in the dispatched message;
/// storage holds the hash.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: Token,
    pub plaintext_code: String,
}

/// Handler minting single-use tokens, with a per-user issuance quota.
pub struct IssueTokenHandler {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn NotificationGateway>,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
    notifications: NotificationConfig,
}

impl IssueTokenHandler {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
        config: TokenConfig,
        notifications: NotificationConfig,
    ) -> Self {
        Self {
            tokens,
            users,
            gateway,
            clock,
            config,
            notifications,
        }
    }

    /// Issues a token without dispatching it.
    ///
    /// Rejects with `QuotaExceeded` once the owning user has hit the hourly
    /// issuance limit, counted across all of their addresses. A code
    /// collision at persist time retries with a fresh draw.
    pub async fn handle(&self, cmd: IssueTokenCommand) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();

        let address = self
            .users
            .find_email_address(&cmd.email_address_id)
            .await?
            .ok_or_else(|| AuthError::infrastructure("Email address not found"))?;

        let sibling_ids: Vec<EmailAddressId> = self
            .users
            .email_addresses_for_user(&address.user_id)
            .await?
            .iter()
            .map(|a| a.id)
            .collect();
        let issued_last_hour = self
            .tokens
            .count_issued_since(&sibling_ids, now.add_hours(-1))
            .await?;
        if issued_last_hour >= self.config.issue_limit_per_hour {
            warn!(
                user_id = %address.user_id,
                issued_last_hour,
                limit = self.config.issue_limit_per_hour,
                "token issuance quota exceeded"
            );
            return Err(AuthError::quota_exceeded(
                address.user_id,
                self.config.issue_limit_per_hour,
            ));
        }

        // fresh randomness on every attempt; a collision is a storage-level
        // uniqueness conflict, never a reuse of the colliding draw
        for _ in 0..self.config.generation_attempts {
            let (token, plaintext_code) = Token::generate(
                cmd.email_address_id,
                cmd.purpose,
                now,
                self.config.ttl_hours,
            );
            match self.tokens.insert(&token).await {
                Ok(()) => {
                    info!(
                        token_id = %token.id,
                        purpose = %cmd.purpose,
                        "token issued"
                    );
                    return Ok(IssuedToken {
                        token,
                        plaintext_code,
                    });
                }
                Err(err) if err.code == ErrorCode::CodeConflict => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(AuthError::CodeGenerationExhausted)
    }

    /// Issues a token and dispatches the matching message.
    ///
    /// Returns `Ok(true)` when the message went out, `Ok(false)` when
    /// dispatch failed; the token is kept either way so a later resend can
    /// succeed. Quota failures propagate before anything is sent.
    pub async fn handle_and_dispatch(&self, cmd: IssueTokenCommand) -> Result<bool, AuthError> {
        let email_address_id = cmd.email_address_id;
        let purpose = cmd.purpose;
        let redirect_hint = cmd.redirect_hint.clone();

        let issued = self.handle(cmd).await?;

        let address = self
            .users
            .find_email_address(&email_address_id)
            .await?
            .ok_or_else(|| AuthError::infrastructure("Email address not found"))?;
        let user = self
            .users
            .find_by_id(&address.user_id)
            .await?
            .ok_or_else(|| AuthError::infrastructure("User not found"))?;

        let url = Token::url(&self.notifications.base_url, &issued.plaintext_code);
        let mut notification = Notification::new(address.email.clone(), purpose.template_id())
            .with_context("name", user.full_name())
            .with_context("url", url);
        if let Some(hint) = redirect_hint {
            notification = notification.with_context("redirect", hint);
        }

        match self.gateway.send(&notification).await {
            Ok(()) => {
                let mut token = issued.token;
                token.mark_sent(self.clock.now());
                if let Err(err) = self.tokens.update(&token).await {
                    warn!(token_id = %token.id, %err, "failed to record dispatch time");
                }
                Ok(true)
            }
            Err(err) => {
                warn!(
                    token_id = %issued.token.id,
                    %err,
                    "token message dispatch failed, token kept"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{
        InMemoryNotificationGateway, InMemoryTokenRepository, InMemoryUserRepository,
    };
    use crate::domain::foundation::{Email, Timestamp, UserId};
    use crate::domain::identity::{EmailAddress, User};

    struct Fixture {
        tokens: Arc<InMemoryTokenRepository>,
        users: Arc<InMemoryUserRepository>,
        gateway: Arc<InMemoryNotificationGateway>,
        clock: Arc<FixedClock>,
        handler: IssueTokenHandler,
        address: EmailAddress,
    }

    async fn fixture() -> Fixture {
        fixture_with_gateway(InMemoryNotificationGateway::new()).await
    }

    async fn fixture_with_gateway(gateway: InMemoryNotificationGateway) -> Fixture {
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let gateway = Arc::new(gateway);
        let now = Timestamp::from_ymd(2024, 5, 1).unwrap();
        let clock = Arc::new(FixedClock::at(now));

        let email = Email::new("nora@example.com").unwrap();
        let user = User::create(UserId::new(), email.clone(), "Nora", "Keller", now).unwrap();
        let address = EmailAddress::new(
            crate::domain::foundation::EmailAddressId::new(),
            user.id,
            email,
            true,
            now,
        );
        users.create_with_primary_email(&user, &address).await.unwrap();

        let handler = IssueTokenHandler::new(
            tokens.clone(),
            users.clone(),
            gateway.clone(),
            clock.clone(),
            TokenConfig::default(),
            NotificationConfig::default(),
        );
        Fixture {
            tokens,
            users,
            gateway,
            clock,
            handler,
            address,
        }
    }

    fn command(address: &EmailAddress) -> IssueTokenCommand {
        IssueTokenCommand {
            email_address_id: address.id,
            purpose: TokenPurpose::Login,
            redirect_hint: None,
        }
    }

    #[tokio::test]
    async fn issues_token_with_configured_ttl() {
        let f = fixture().await;
        let issued = f.handler.handle(command(&f.address)).await.unwrap();

        assert_eq!(issued.token.valid_until, f.clock.now().add_hours(72));
        assert_eq!(f.tokens.len().await, 1);
    }

    #[tokio::test]
    async fn quota_rejects_eleventh_issue_in_hour() {
        let f = fixture().await;
        for _ in 0..10 {
            f.handler.handle(command(&f.address)).await.unwrap();
        }

        let err = f.handler.handle(command(&f.address)).await.unwrap_err();
        assert!(matches!(err, AuthError::QuotaExceeded { limit: 10, .. }));
    }

    #[tokio::test]
    async fn quota_window_slides() {
        let f = fixture().await;
        for _ in 0..10 {
            f.handler.handle(command(&f.address)).await.unwrap();
        }

        f.clock.advance_hours(2);
        assert!(f.handler.handle(command(&f.address)).await.is_ok());
    }

    #[tokio::test]
    async fn quota_counts_across_all_user_addresses() {
        let f = fixture().await;
        let secondary = EmailAddress::new(
            crate::domain::foundation::EmailAddressId::new(),
            f.address.user_id,
            Email::new("nora@work.example").unwrap(),
            false,
            f.clock.now(),
        );
        f.users.add_email_address(&secondary).await.unwrap();

        for _ in 0..10 {
            f.handler.handle(command(&f.address)).await.unwrap();
        }
        let err = f.handler.handle(command(&secondary)).await.unwrap_err();
        assert!(matches!(err, AuthError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn dispatch_sends_template_for_purpose_and_marks_sent() {
        let f = fixture().await;
        let sent = f
            .handler
            .handle_and_dispatch(IssueTokenCommand {
                email_address_id: f.address.id,
                purpose: TokenPurpose::Verification,
                redirect_hint: Some("/account".to_string()),
            })
            .await
            .unwrap();
        assert!(sent);

        let messages = f.gateway.sent().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].template_id, "token_verification");
        assert_eq!(messages[0].context.get("name"), Some(&"Nora Keller".to_string()));
        assert_eq!(messages[0].context.get("redirect"), Some(&"/account".to_string()));
        assert!(messages[0]
            .context
            .get("url")
            .unwrap()
            .contains("/auth/token/"));
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_token_and_reports_false() {
        let f = fixture_with_gateway(InMemoryNotificationGateway::failing()).await;
        let sent = f
            .handler
            .handle_and_dispatch(command(&f.address))
            .await
            .unwrap();
        assert!(!sent);
        assert_eq!(f.tokens.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_address_is_an_infrastructure_error() {
        let f = fixture().await;
        let err = f
            .handler
            .handle(IssueTokenCommand {
                email_address_id: crate::domain::foundation::EmailAddressId::new(),
                purpose: TokenPurpose::Login,
                redirect_hint: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Infrastructure(_)));
    }
}
