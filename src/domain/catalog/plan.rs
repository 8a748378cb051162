//! Plan entity and eligibility rules.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{PlanId, Timestamp, ValidationError};

/// How long one billing period of a plan lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDuration {
    Months(u32),
    Days(u32),
}

impl PlanDuration {
    /// Extends a start timestamp by one period.
    pub fn extend(&self, start: Timestamp) -> Timestamp {
        match self {
            PlanDuration::Months(months) => start.add_months(*months),
            PlanDuration::Days(days) => start.add_days(i64::from(*days)),
        }
    }
}

/// Whether a plan is being checked for first purchase or for renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityPurpose {
    Purchase,
    Renewal,
}

/// Per-user facts the eligibility predicate needs.
///
/// The catalog handler assembles these once and runs every plan through the
/// same predicate, so the list filter and the single-plan test can never
/// disagree.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFacts {
    /// Domains of the user's verified email addresses.
    pub verified_domains: HashSet<String>,
    /// Count of the user's active, non-canceled subscriptions per plan slug.
    pub active_subscriptions_of_plan: u32,
}

/// A purchasable/renewable subscription offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Unique, URL-safe identifier, e.g. `regular`, `student`.
    pub slug: String,
    pub name: String,
    /// Price in whole currency units; zero means the initial payment
    /// auto-confirms.
    pub price: u32,
    pub duration: PlanDuration,
    pub is_purchasable: bool,
    pub is_renewable: bool,
    /// Allow-list of email domains; `None` means open to everyone.
    pub eligible_email_domains: Option<Vec<String>>,
    /// Cap on concurrent active subscriptions per user; `None` = unlimited,
    /// `Some(0)` = retired (nobody is eligible).
    pub eligible_active_subscriptions_per_user: Option<u32>,
    /// What a renewal produces; `None` renews to this plan itself.
    pub renews_to: Option<PlanId>,
}

impl Plan {
    /// Parses a semicolon-delimited admin-entered allow-list
    /// (`"a.example.edu; b.example.edu"`) into domain entries.
    ///
    /// An empty or all-whitespace input yields `None` (open plan).
    pub fn parse_domain_allow_list(input: &str) -> Option<Vec<String>> {
        let domains: Vec<String> = input
            .split(';')
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        if domains.is_empty() {
            None
        } else {
            Some(domains)
        }
    }

    /// Validates invariant fields on an admin-managed plan.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slug.trim().is_empty() {
            return Err(ValidationError::empty_field("slug"));
        }
        if self
            .slug
            .chars()
            .any(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-')
        {
            return Err(ValidationError::invalid_format(
                "slug",
                "only lowercase letters, digits and dashes",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(())
    }

    /// The plan a renewal of this plan produces.
    pub fn renews_to(&self) -> PlanId {
        self.renews_to.unwrap_or(self.id)
    }

    /// Single-plan eligibility test.
    ///
    /// Rules, in order:
    /// - purpose gate: `is_purchasable` for purchase, `is_renewable` for
    ///   renewal;
    /// - a cap of zero retires the plan for everyone;
    /// - a positive cap excludes users already holding that many active,
    ///   non-canceled subscriptions of the plan;
    /// - a non-empty domain allow-list must intersect the user's verified
    ///   domains.
    pub fn is_eligible(&self, purpose: EligibilityPurpose, facts: &EligibilityFacts) -> bool {
        let purpose_ok = match purpose {
            EligibilityPurpose::Purchase => self.is_purchasable,
            EligibilityPurpose::Renewal => self.is_renewable,
        };
        if !purpose_ok {
            return false;
        }

        match self.eligible_active_subscriptions_per_user {
            Some(0) => return false,
            Some(cap) if facts.active_subscriptions_of_plan >= cap => return false,
            _ => {}
        }

        if let Some(domains) = &self.eligible_email_domains {
            if !domains.iter().any(|d| facts.verified_domains.contains(d)) {
                return false;
            }
        }

        true
    }

    /// True if the given email domain satisfies this plan's allow-list.
    ///
    /// Used at purchase time to re-validate the specific (primary verified)
    /// address, not just any verified address.
    pub fn allows_domain(&self, domain: &str) -> bool {
        match &self.eligible_email_domains {
            Some(domains) => domains.iter().any(|d| d == domain),
            None => true,
        }
    }
}
