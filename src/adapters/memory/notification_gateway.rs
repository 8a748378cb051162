//! In-memory notification gateway.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Notification, NotificationGateway};

/// Gateway that records every message instead of sending it.
///
/// Tests assert on the recorded traffic; the `failing` switch simulates a
/// mail backend outage.
#[derive(Debug, Default)]
pub struct InMemoryNotificationGateway {
    sent: RwLock<Vec<Notification>>,
    failing: AtomicBool,
}

impl InMemoryNotificationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a gateway that refuses every dispatch.
    pub fn failing() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            failing: AtomicBool::new(true),
        }
    }

    /// Toggles dispatch failure at runtime.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything dispatched so far.
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationGateway for InMemoryNotificationGateway {
    async fn send(&self, notification: &Notification) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DispatchError,
                "Notification backend unavailable",
            ));
        }
        self.sent.write().await.push(notification.clone());
        Ok(())
    }

    async fn send_batch(&self, notifications: &[Notification]) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DispatchError,
                "Notification backend unavailable",
            ));
        }
        self.sent.write().await.extend_from_slice(notifications);
        Ok(())
    }
}
