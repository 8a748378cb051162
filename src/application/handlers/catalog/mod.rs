//! Catalog handlers.

mod list_eligible_plans;

pub use list_eligible_plans::ListEligiblePlansHandler;
