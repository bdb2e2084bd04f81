//! HTTP transport port
//!
//! The API client builds requests and interprets statuses; a transport only
//! moves bytes. Non-2xx statuses are returned as responses, never as errors.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// HTTP verbs used by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request, ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body; `None` when the body was empty
    pub body: Option<JsonValue>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Option<JsonValue>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests
pub trait HttpTransport: Send + Sync {
    /// Execute a request
    ///
    /// Errors only on transport failure (DNS, connect, timeout, unreadable body).
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
