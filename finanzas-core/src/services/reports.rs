//! Report service - `/Reportes`
//!
//! Report payloads are rendered as-is by the front ends, so they stay untyped.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::api::envelope::extract_data;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::Period;

/// Months covered by the evolution report when none are given
pub const DEFAULT_EVOLUTION_MONTHS: u32 = 6;

pub struct ReportService {
    client: Arc<ApiClient>,
}

impl ReportService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Income, expense and balance totals for one month
    pub fn monthly_summary(&self, period: Period) -> Result<JsonValue> {
        self.fetch("/Reportes/resumen-mensual", period.query_params())
    }

    /// Month-by-month totals for the last `months` months
    pub fn monthly_evolution(&self, months: u32) -> Result<JsonValue> {
        self.fetch(
            "/Reportes/evolucion",
            vec![("meses".to_string(), months.to_string())],
        )
    }

    pub fn spending_by_category(&self, period: Period) -> Result<JsonValue> {
        self.fetch("/Reportes/por-categoria", period.query_params())
    }

    /// Budgeted versus actual spending
    pub fn budget_comparison(&self) -> Result<JsonValue> {
        self.fetch("/Reportes/comparativo", Vec::new())
    }

    fn fetch(&self, path: &str, params: Vec<(String, String)>) -> Result<JsonValue> {
        Ok(extract_data(self.client.get_with(path, params)?))
    }
}
