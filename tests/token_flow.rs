//! Integration tests for passwordless token authentication.
//!
//! Covers the full credential lifecycle over the in-memory adapters:
//! registration with verification, login link consumption, single use,
//! expiry, the hourly quota, and the daily sweep.

use std::sync::Arc;

use pressabo::adapters::clock::FixedClock;
use pressabo::adapters::memory::{
    InMemoryNotificationGateway, InMemoryTokenRepository, InMemoryUserRepository,
};
use pressabo::application::handlers::auth::{
    ConsumeTokenHandler, IssueTokenCommand, IssueTokenHandler, SweepExpiredTokensHandler,
};
use pressabo::application::handlers::identity::{
    RegisterUserCommand, RegisterUserHandler, VerifyEmailHandler,
};
use pressabo::config::{NotificationConfig, TokenConfig};
use pressabo::domain::auth::{AuthError, AuthFailure, TokenPurpose};
use pressabo::domain::foundation::Timestamp;
use pressabo::domain::identity::EmailAddress;
use pressabo::ports::{Notification, UserRepository};

struct World {
    tokens: Arc<InMemoryTokenRepository>,
    users: Arc<InMemoryUserRepository>,
    gateway: Arc<InMemoryNotificationGateway>,
    clock: Arc<FixedClock>,
    register: RegisterUserHandler,
    issue: Arc<IssueTokenHandler>,
    consume: ConsumeTokenHandler,
    verify: VerifyEmailHandler,
    sweep: SweepExpiredTokensHandler,
}

fn world() -> World {
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let gateway = Arc::new(InMemoryNotificationGateway::new());
    let clock = Arc::new(FixedClock::at(Timestamp::from_ymd(2024, 5, 1).unwrap()));

    let issue = Arc::new(IssueTokenHandler::new(
        tokens.clone(),
        users.clone(),
        gateway.clone(),
        clock.clone(),
        TokenConfig::default(),
        NotificationConfig::default(),
    ));
    World {
        register: RegisterUserHandler::new(users.clone(), issue.clone(), clock.clone()),
        consume: ConsumeTokenHandler::new(tokens.clone(), users.clone(), clock.clone()),
        verify: VerifyEmailHandler::new(tokens.clone(), users.clone(), clock.clone()),
        sweep: SweepExpiredTokensHandler::new(tokens.clone(), clock.clone()),
        issue,
        tokens,
        users,
        gateway,
        clock,
    }
}

async fn register(w: &World, email: &str) -> EmailAddress {
    let user = w
        .register
        .handle(RegisterUserCommand {
            email: email.to_string(),
            first_name: "Nora".to_string(),
            last_name: "Keller".to_string(),
        })
        .await
        .unwrap();
    w.users
        .email_addresses_for_user(&user.id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.is_primary)
        .unwrap()
}

fn code_from(notification: &Notification) -> String {
    let url = notification.context.get("url").unwrap();
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap()
        .to_string()
}

async fn dispatched_login_code(w: &World, address: &EmailAddress) -> String {
    w.issue
        .handle_and_dispatch(IssueTokenCommand {
            email_address_id: address.id,
            purpose: TokenPurpose::Login,
            redirect_hint: None,
        })
        .await
        .unwrap();
    let sent = w.gateway.sent().await;
    code_from(sent.last().unwrap())
}

#[tokio::test]
async fn registration_verification_link_verifies_the_address() {
    let w = world();
    let address = register(&w, "nora@example.com").await;
    assert!(!address.is_verified());

    let sent = w.gateway.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template_id, "token_verification");

    let verified = w.verify.handle(&code_from(&sent[0])).await.unwrap();
    assert!(verified.is_verified());

    // verification tokens are single-use too
    let err = w.verify.handle(&code_from(&sent[0])).await.unwrap_err();
    assert_eq!(err, AuthFailure::NotFound);
}

#[tokio::test]
async fn login_code_works_exactly_once() {
    let w = world();
    let address = register(&w, "nora@example.com").await;
    let code = dispatched_login_code(&w, &address).await;

    let user = w.consume.handle(&code).await.unwrap();
    assert_eq!(user.id, address.user_id);

    let err = w.consume.handle(&code).await.unwrap_err();
    assert_eq!(err, AuthFailure::NotFound);
    assert_eq!(err.public_message(), "This link is invalid or has expired.");
}

#[tokio::test]
async fn login_tokens_cannot_verify_addresses() {
    let w = world();
    let address = register(&w, "nora@example.com").await;
    let code = dispatched_login_code(&w, &address).await;

    let err = w.verify.handle(&code).await.unwrap_err();
    assert_eq!(err, AuthFailure::NotFound);
    // the token survives a wrong-purpose probe and still logs in
    assert!(w.consume.handle(&code).await.is_ok());
}

#[tokio::test]
async fn expired_code_fails_and_is_removed_by_the_sweep() {
    let w = world();
    let address = register(&w, "nora@example.com").await;
    let code = dispatched_login_code(&w, &address).await;

    // default TTL is 72 hours
    w.clock.advance_hours(73);
    let err = w.consume.handle(&code).await.unwrap_err();
    assert_eq!(err, AuthFailure::Expired);

    // the failed attempt leaves the token for the sweep
    assert_eq!(w.tokens.len().await, 2);
    assert_eq!(w.sweep.handle().await.unwrap(), 2);
    assert_eq!(w.tokens.len().await, 0);

    let err = w.consume.handle(&code).await.unwrap_err();
    assert_eq!(err, AuthFailure::NotFound);
}

#[tokio::test]
async fn hourly_quota_covers_the_whole_account() {
    let w = world();
    let address = register(&w, "nora@example.com").await;

    // registration already issued one verification token
    for _ in 0..9 {
        w.issue
            .handle(IssueTokenCommand {
                email_address_id: address.id,
                purpose: TokenPurpose::Login,
                redirect_hint: None,
            })
            .await
            .unwrap();
    }
    let err = w
        .issue
        .handle(IssueTokenCommand {
            email_address_id: address.id,
            purpose: TokenPurpose::Login,
            redirect_hint: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::QuotaExceeded { limit: 10, .. }));

    // quota is a sliding window, not a calendar hour
    w.clock.advance_hours(2);
    assert!(w
        .issue
        .handle(IssueTokenCommand {
            email_address_id: address.id,
            purpose: TokenPurpose::Login,
            redirect_hint: None,
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn deactivated_account_cannot_log_in_but_burns_the_token() {
    let w = world();
    let address = register(&w, "nora@example.com").await;
    let code = dispatched_login_code(&w, &address).await;

    let mut user = w.users.find_by_id(&address.user_id).await.unwrap().unwrap();
    user.deactivate();
    w.users.update(&user).await.unwrap();

    let err = w.consume.handle(&code).await.unwrap_err();
    assert!(matches!(err, AuthFailure::InactiveUser(_)));
    assert_eq!(err.public_message(), "This link is invalid or has expired.");

    // consumed anyway; a second probe learns nothing new
    let err = w.consume.handle(&code).await.unwrap_err();
    assert_eq!(err, AuthFailure::NotFound);
}
