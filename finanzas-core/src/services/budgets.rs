//! Budget service - `/Presupuestos`

use std::sync::Arc;

use super::resource::Resource;
use crate::api::envelope::PAGED_LIST;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{Budget, Period};

pub struct BudgetService {
    resource: Resource,
}

impl BudgetService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            resource: Resource::new(client, "/Presupuestos", PAGED_LIST),
        }
    }

    pub fn list(&self, params: Vec<(String, String)>) -> Result<Vec<Budget>> {
        self.resource.list(params)
    }

    pub fn get(&self, id: i64) -> Result<Budget> {
        self.resource.get(id)
    }

    pub fn create(&self, budget: &Budget) -> Result<Option<Budget>> {
        self.resource.create(budget)
    }

    pub fn update(&self, id: i64, budget: &Budget) -> Result<Option<Budget>> {
        self.resource.update(id, budget)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.resource.delete(id)
    }

    /// Budgets for one month (`/Presupuestos/{anio}/{mes}`)
    pub fn by_period(&self, period: Period) -> Result<Vec<Budget>> {
        let path = self
            .resource
            .path(format!("{}/{}", period.year, period.month));
        self.resource.list_at(&path)
    }
}
