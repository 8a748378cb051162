//! RegisterUserHandler - creates an account around an email address.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::handlers::auth::{IssueTokenCommand, IssueTokenHandler};
use crate::domain::auth::TokenPurpose;
use crate::domain::foundation::{Email, EmailAddressId, ErrorCode, UserId};
use crate::domain::identity::{EmailAddress, IdentityError, User};
use crate::ports::{Clock, UserRepository};

/// Command to register a new subscriber.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Handler creating a user with their primary address, then dispatching a
/// verification token.
///
/// There is no password anywhere in the flow; the verification message
/// doubles as the first login link.
pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
    issue_tokens: Arc<IssueTokenHandler>,
    clock: Arc<dyn Clock>,
}

impl RegisterUserHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        issue_tokens: Arc<IssueTokenHandler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            issue_tokens,
            clock,
        }
    }

    /// Registers a user; the account and its primary address appear
    /// together or not at all.
    ///
    /// Verification dispatch is best effort: a mail outage must not block
    /// signups, the token can be re-requested later.
    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<User, IdentityError> {
        let now = self.clock.now();
        let email = Email::new(&cmd.email)?;

        if self
            .users
            .find_email_address_by_email(&email)
            .await?
            .is_some()
        {
            return Err(IdentityError::email_taken(email));
        }

        let user = User::create(
            UserId::new(),
            email.clone(),
            cmd.first_name,
            cmd.last_name,
            now,
        )?;
        let address = EmailAddress::new(EmailAddressId::new(), user.id, email, true, now);

        self.users
            .create_with_primary_email(&user, &address)
            .await
            .map_err(|err| match err.code {
                ErrorCode::EmailTaken => IdentityError::email_taken(address.email.clone()),
                _ => IdentityError::from(err),
            })?;
        info!(user_id = %user.id, "user registered");

        let dispatch = self
            .issue_tokens
            .handle_and_dispatch(IssueTokenCommand {
                email_address_id: address.id,
                purpose: TokenPurpose::Verification,
                redirect_hint: None,
            })
            .await;
        if let Err(err) = dispatch {
            warn!(user_id = %user.id, %err, "verification token could not be issued");
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{
        InMemoryNotificationGateway, InMemoryTokenRepository, InMemoryUserRepository,
    };
    use crate::config::{NotificationConfig, TokenConfig};
    use crate::domain::foundation::Timestamp;

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        gateway: Arc<InMemoryNotificationGateway>,
        handler: RegisterUserHandler,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let gateway = Arc::new(InMemoryNotificationGateway::new());
        let clock = Arc::new(FixedClock::at(Timestamp::from_ymd(2024, 5, 1).unwrap()));

        let issue_tokens = Arc::new(IssueTokenHandler::new(
            tokens,
            users.clone(),
            gateway.clone(),
            clock.clone(),
            TokenConfig::default(),
            NotificationConfig::default(),
        ));
        let handler = RegisterUserHandler::new(users.clone(), issue_tokens, clock);
        Fixture {
            users,
            gateway,
            handler,
        }
    }

    fn command(email: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            email: email.to_string(),
            first_name: "Nora".to_string(),
            last_name: "Keller".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_user_with_primary_unverified_address() {
        let f = fixture();
        let user = f.handler.handle(command("nora@example.com")).await.unwrap();

        let addresses = f.users.email_addresses_for_user(&user.id).await.unwrap();
        assert_eq!(addresses.len(), 1);
        assert!(addresses[0].is_primary);
        assert!(!addresses[0].is_verified());
        assert_eq!(user.email.as_str(), "nora@example.com");
    }

    #[tokio::test]
    async fn dispatches_verification_message() {
        let f = fixture();
        f.handler.handle(command("nora@example.com")).await.unwrap();

        let sent = f.gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template_id, "token_verification");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let f = fixture();
        f.handler.handle(command("nora@example.com")).await.unwrap();

        let err = f
            .handler
            .handle(command("Nora@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn invalid_email_fails_validation() {
        let f = fixture();
        let err = f.handler.handle(command("not-an-address")).await.unwrap_err();
        assert!(matches!(err, IdentityError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn mail_outage_does_not_block_signup() {
        let f = fixture();
        f.gateway.set_failing(true);
        let user = f.handler.handle(command("nora@example.com")).await.unwrap();
        assert!(f.users.find_by_id(&user.id).await.unwrap().is_some());
    }
}
