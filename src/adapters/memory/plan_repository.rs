//! In-memory plan repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::catalog::Plan;
use crate::domain::foundation::{DomainError, PlanId};
use crate::ports::PlanRepository;

/// Lock-based plan catalog, preserving insertion order for listing.
#[derive(Debug, Default)]
pub struct InMemoryPlanRepository {
    plans: RwLock<Vec<Plan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-seeded with the given plans.
    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self {
            plans: RwLock::new(plans),
        }
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn save(&self, plan: &Plan) -> Result<(), DomainError> {
        let mut plans = self.plans.write().await;
        match plans.iter_mut().find(|p| p.id == plan.id) {
            Some(existing) => *existing = plan.clone(),
            None => plans.push(plan.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let plans = self.plans.read().await;
        Ok(plans.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Plan>, DomainError> {
        let plans = self.plans.read().await;
        Ok(plans.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Plan>, DomainError> {
        Ok(self.plans.read().await.clone())
    }
}
