//! Expense service - `/Gastos`

use std::sync::Arc;

use super::resource::Resource;
use crate::api::envelope::PAGED_LIST;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{Expense, Period};

pub struct ExpenseService {
    resource: Resource,
}

impl ExpenseService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            resource: Resource::new(client, "/Gastos", PAGED_LIST),
        }
    }

    /// List expenses; `params` are passed through as query filters
    pub fn list(&self, params: Vec<(String, String)>) -> Result<Vec<Expense>> {
        self.resource.list(params)
    }

    pub fn get(&self, id: i64) -> Result<Expense> {
        self.resource.get(id)
    }

    pub fn create(&self, expense: &Expense) -> Result<Option<Expense>> {
        self.resource.create(expense)
    }

    pub fn update(&self, id: i64, expense: &Expense) -> Result<Option<Expense>> {
        self.resource.update(id, expense)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.resource.delete(id)
    }

    /// Expenses dated within one month
    pub fn by_period(&self, period: Period) -> Result<Vec<Expense>> {
        let path = self
            .resource
            .path(format!("periodo/{}/{}", period.year, period.month));
        self.resource.list_at(&path)
    }
}
