//! Request description passed through the client pipeline

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::result::Result;
use crate::ports::Method;

/// Which pass of the request pipeline is running
///
/// A request starts as `Original`. After a 401 and a successful credential
/// refresh it is re-issued once as `Retry`; a `Retry` is never refreshed
/// again, which bounds every logical request to two round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Original,
    Retry,
}

impl Attempt {
    pub fn is_retry(&self) -> bool {
        matches!(self, Attempt::Retry)
    }
}

/// A request relative to the API base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<JsonValue>,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Append several query parameters
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = ApiRequest::post("/Categorias")
            .with_body(&json!({ "nombre": "Comida" }))
            .unwrap()
            .with_param("tipo", 1);

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/Categorias");
        assert_eq!(request.body, Some(json!({ "nombre": "Comida" })));
        assert_eq!(request.params, vec![("tipo".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_attempt() {
        assert!(!Attempt::Original.is_retry());
        assert!(Attempt::Retry.is_retry());
    }
}
