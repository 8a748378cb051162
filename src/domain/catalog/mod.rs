//! Catalog domain - purchasable and renewable subscription plans.

mod errors;
mod plan;

pub use errors::CatalogError;
pub use plan::{EligibilityFacts, EligibilityPurpose, Plan, PlanDuration};
