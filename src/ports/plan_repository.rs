//! Plan repository port.

use async_trait::async_trait;

use crate::domain::catalog::Plan;
use crate::domain::foundation::{DomainError, PlanId};

/// Repository port for the plan catalog.
///
/// Plans are admin-managed reference data; the core only reads and seeds
/// them.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Inserts or replaces a plan.
    async fn save(&self, plan: &Plan) -> Result<(), DomainError>;

    /// Finds a plan by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;

    /// Finds a plan by slug. Returns `None` if not found.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Plan>, DomainError>;

    /// All plans, in catalog order.
    async fn list_all(&self) -> Result<Vec<Plan>, DomainError>;
}
