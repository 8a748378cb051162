//! Notification gateway port.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Email};

/// One message to dispatch.
///
/// Rendering is the gateway's problem; the core hands over a template id
/// and a flat string context, never markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Email,
    pub template_id: String,
    pub context: HashMap<String, String>,
}

impl Notification {
    /// Creates a notification with an empty context.
    pub fn new(recipient: Email, template_id: impl Into<String>) -> Self {
        Self {
            recipient,
            template_id: template_id.into(),
            context: HashMap::new(),
        }
    }

    /// Adds a context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Gateway port for outbound messages.
///
/// Dispatch is best effort from the core's point of view: handlers log
/// failures and decide per operation whether to surface them, but a failed
/// send never rolls back domain state.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Dispatches a single message.
    ///
    /// # Errors
    ///
    /// - `DispatchError` if the message could not be handed off
    async fn send(&self, notification: &Notification) -> Result<(), DomainError>;

    /// Dispatches a batch in one hand-off.
    ///
    /// The daily expiration run composes all reminders first and sends them
    /// together.
    async fn send_batch(&self, notifications: &[Notification]) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn NotificationGateway) {}
    }

    #[test]
    fn with_context_accumulates_entries() {
        let n = Notification::new(Email::new("dora@example.com").unwrap(), "token_login")
            .with_context("name", "Dora")
            .with_context("url", "https://abo.example.org/auth/token/abc/");
        assert_eq!(n.context.len(), 2);
        assert_eq!(n.context.get("name"), Some(&"Dora".to_string()));
    }
}
