//! Income service - `/Ingresos`

use std::sync::Arc;

use super::resource::Resource;
use crate::api::envelope::PAGED_LIST;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{Income, Period};

pub struct IncomeService {
    resource: Resource,
}

impl IncomeService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            resource: Resource::new(client, "/Ingresos", PAGED_LIST),
        }
    }

    pub fn list(&self, params: Vec<(String, String)>) -> Result<Vec<Income>> {
        self.resource.list(params)
    }

    pub fn get(&self, id: i64) -> Result<Income> {
        self.resource.get(id)
    }

    pub fn create(&self, income: &Income) -> Result<Option<Income>> {
        self.resource.create(income)
    }

    pub fn update(&self, id: i64, income: &Income) -> Result<Option<Income>> {
        self.resource.update(id, income)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.resource.delete(id)
    }

    pub fn by_period(&self, period: Period) -> Result<Vec<Income>> {
        let path = self
            .resource
            .path(format!("periodo/{}/{}", period.year, period.month));
        self.resource.list_at(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{harness, logged_in, ok, url};
    use serde_json::json;

    #[test]
    fn test_list_direct_array() {
        let h = harness(
            logged_in(),
            vec![ok(json!([{ "id": 1, "monto": 1500, "descripcion": "Salario" }]))],
        );
        let service = IncomeService::new(h.client.clone());

        let incomes = service.list(vec![]).unwrap();
        assert_eq!(incomes[0].description.as_deref(), Some("Salario"));
        assert_eq!(h.transport.last().url, url("/Ingresos"));
    }

    #[test]
    fn test_by_period_path() {
        let h = harness(logged_in(), vec![ok(json!({ "data": [] }))]);
        let service = IncomeService::new(h.client.clone());

        assert!(service.by_period(Period::new(2023, 12).unwrap()).unwrap().is_empty());
        assert_eq!(h.transport.last().url, url("/Ingresos/periodo/2023/12"));
    }

    #[test]
    fn test_get_single_record() {
        let h = harness(logged_in(), vec![ok(json!({ "data": { "id": 4, "monto": 10 } }))]);
        let service = IncomeService::new(h.client.clone());

        let income = service.get(4).unwrap();
        assert_eq!(income.id, Some(4));
        assert_eq!(h.transport.last().url, url("/Ingresos/4"));
    }
}
