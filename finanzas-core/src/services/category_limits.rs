//! Category limit service - `/LimitesCategorias`
//!
//! These endpoints may wrap their payload in one more `data` layer than the
//! rest of the API, so every response goes through [`extract_data`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::api::envelope::{decode_list, decode_optional, decode_record, extract_data, ListShape};
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{CategoryLimit, Period};

const BASE: &str = "/LimitesCategorias";

const LIMIT_LIST: &[ListShape] = &[ListShape::Direct, ListShape::Items];

pub struct CategoryLimitService {
    client: Arc<ApiClient>,
}

impl CategoryLimitService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<CategoryLimit>> {
        self.fetch_list(BASE)
    }

    pub fn by_period(&self, period: Period) -> Result<Vec<CategoryLimit>> {
        self.fetch_list(&format!("{}/{}/{}", BASE, period.year, period.month))
    }

    pub fn get(&self, id: i64) -> Result<CategoryLimit> {
        decode_record(self.fetch(&format!("{}/detalle/{}", BASE, id))?)
    }

    /// The limit set for one category in one month, if any
    pub fn by_category_and_period(
        &self,
        category_id: i64,
        period: Period,
    ) -> Result<Option<CategoryLimit>> {
        let path = format!(
            "{}/categoria/{}/{}/{}",
            BASE, category_id, period.year, period.month
        );
        decode_optional(self.fetch(&path)?)
    }

    /// Every limit ever set for a category
    pub fn history_by_category(&self, category_id: i64) -> Result<Vec<CategoryLimit>> {
        self.fetch_list(&format!("{}/historico/{}", BASE, category_id))
    }

    /// Insert or replace the limit for the category and period in `limit`
    pub fn create_or_update(&self, limit: &CategoryLimit) -> Result<CategoryLimit> {
        decode_record(extract_data(self.client.post(BASE, limit)?))
    }

    /// Upsert several limits at once; the backend's summary is returned as-is
    pub fn create_batch(&self, limits: &[CategoryLimit]) -> Result<JsonValue> {
        let body = self.client.post(&format!("{}/lote", BASE), limits)?;
        Ok(extract_data(body))
    }

    pub fn update(&self, id: i64, limit: &CategoryLimit) -> Result<Option<CategoryLimit>> {
        let body = self.client.put(&format!("{}/{}", BASE, id), limit)?;
        decode_optional(extract_data(body))
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("{}/{}", BASE, id))?;
        Ok(())
    }

    /// Copy every limit of `from` into `to`
    pub fn copy_period(&self, from: Period, to: Period) -> Result<JsonValue> {
        let path = format!(
            "{}/copiar/{}/{}/a/{}/{}",
            BASE, from.year, from.month, to.year, to.month
        );
        Ok(extract_data(self.client.post_empty(&path)?))
    }

    fn fetch(&self, path: &str) -> Result<JsonValue> {
        Ok(extract_data(self.client.get(path)?))
    }

    fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        decode_list(&self.fetch(path)?, LIMIT_LIST)
    }
}
