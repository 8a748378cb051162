//! Derived subscription status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a subscription.
///
/// Never persisted. `Subscription::status` derives it from the cancel flag
/// and the periods, so stored state and reported state cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created, but no period has started (first payment still open).
    Pending,
    /// A paid period covers the present moment.
    Active,
    /// All paid coverage lies in the past.
    Expired,
    /// The subscriber opted out of further renewal reminders. Terminal.
    Canceled,
}

impl SubscriptionStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Active, Expired) | (Active, Canceled) | (Expired, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active],
            Active => vec![Expired, Canceled],
            Expired => vec![Active],
            Canceled => vec![],
        }
    }
}
