//! Category service - `/Categorias`

use std::sync::Arc;

use super::resource::Resource;
use crate::api::envelope::SIMPLE_LIST;
use crate::api::ApiClient;
use crate::domain::result::Result;
use crate::domain::{Category, CategoryKind};

pub struct CategoryService {
    resource: Resource,
}

impl CategoryService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            resource: Resource::new(client, "/Categorias", SIMPLE_LIST),
        }
    }

    /// List categories, optionally filtered by kind (`?tipo=`)
    pub fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<Category>> {
        let params = kind
            .map(|k| vec![("tipo".to_string(), k.as_u8().to_string())])
            .unwrap_or_default();
        self.resource.list(params)
    }

    pub fn for_expenses(&self) -> Result<Vec<Category>> {
        self.list(Some(CategoryKind::Expense))
    }

    pub fn for_incomes(&self) -> Result<Vec<Category>> {
        self.list(Some(CategoryKind::Income))
    }

    pub fn get(&self, id: i64) -> Result<Category> {
        self.resource.get(id)
    }

    pub fn create(&self, category: &Category) -> Result<Option<Category>> {
        self.resource.create(category)
    }

    pub fn update(&self, id: i64, category: &Category) -> Result<Option<Category>> {
        self.resource.update(id, category)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.resource.delete(id)
    }
}
