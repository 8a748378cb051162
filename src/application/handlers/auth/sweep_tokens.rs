//! SweepExpiredTokensHandler - daily expired-token cleanup.

use std::sync::Arc;

use tracing::info;

use crate::domain::auth::AuthError;
use crate::ports::{Clock, TokenRepository};

/// Handler deleting every token whose validity window has passed.
///
/// Meant to run from a daily cron entry; safe to run any number of times.
pub struct SweepExpiredTokensHandler {
    tokens: Arc<dyn TokenRepository>,
    clock: Arc<dyn Clock>,
}

impl SweepExpiredTokensHandler {
    pub fn new(tokens: Arc<dyn TokenRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }

    /// Runs the sweep and returns how many tokens were removed.
    pub async fn handle(&self) -> Result<u64, AuthError> {
        let removed = self.tokens.delete_expired(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, "expired tokens swept");
        }
        Ok(removed)
    }
}
