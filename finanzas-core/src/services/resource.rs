//! CRUD plumbing shared by the REST resource services

use std::fmt::Display;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::envelope::{decode_list, decode_optional, decode_record, ListShape};
use crate::api::ApiClient;
use crate::domain::result::Result;

/// One REST collection (`/Gastos`, `/Presupuestos`, ...)
pub(crate) struct Resource {
    client: Arc<ApiClient>,
    base: &'static str,
    shapes: &'static [ListShape],
}

impl Resource {
    pub fn new(client: Arc<ApiClient>, base: &'static str, shapes: &'static [ListShape]) -> Self {
        Self {
            client,
            base,
            shapes,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `<base>/<suffix>`
    pub fn path(&self, suffix: impl Display) -> String {
        format!("{}/{}", self.base, suffix)
    }

    pub fn list<T: DeserializeOwned>(&self, params: Vec<(String, String)>) -> Result<Vec<T>> {
        let body = self.client.get_with(self.base, params)?;
        decode_list(&body, self.shapes)
    }

    /// List from a sub-path using this collection's accepted shapes
    pub fn list_at<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let body = self.client.get(path)?;
        decode_list(&body, self.shapes)
    }

    pub fn get<T: DeserializeOwned>(&self, id: i64) -> Result<T> {
        decode_record(self.client.get(&self.path(id))?)
    }

    /// Returns the created record when the backend echoes it back
    pub fn create<B, T>(&self, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode_optional(self.client.post(self.base, body)?)
    }

    /// Returns the updated record when the backend echoes it back
    pub fn update<B, T>(&self, id: i64, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode_optional(self.client.put(&self.path(id), body)?)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&self.path(id))?;
        Ok(())
    }
}
