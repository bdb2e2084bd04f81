//! Blocking HTTP transport backed by reqwest

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method};

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// reqwest-based transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Transport(format!(
                "Connection timed out after {} seconds",
                self.timeout_secs
            ))
        } else if error.is_connect() {
            Error::Transport("Unable to connect to the Finanzas API".to_string())
        } else {
            Error::Transport(format!("Request failed: {}", error))
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|e| self.map_request_error(e))?;

        Ok(HttpResponse::new(status, parse_body(&text)))
    }
}

/// Parse a response body; plain-text bodies are kept as a JSON string
fn parse_body(text: &str) -> Option<JsonValue> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), None);
        assert_eq!(parse_body("  \n"), None);
        assert_eq!(parse_body(r#"{"a":1}"#), Some(json!({ "a": 1 })));
        assert_eq!(parse_body("Unauthorized"), Some(json!("Unauthorized")));
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::with_timeout(2).unwrap();
        let request = HttpRequest {
            method: Method::Get,
            // Port 9 (discard) is essentially never listening on loopback
            url: "http://127.0.0.1:9/api/Gastos".to_string(),
            headers: vec![],
            query: vec![],
            body: None,
        };

        let err = transport.execute(&request).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
