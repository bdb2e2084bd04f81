//! Result and error types for the core library

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Core library error type
///
/// HTTP failures are split by class so callers can tell an expired session
/// apart from a rejected form or a backend outage.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or transport failure (no HTTP response was received)
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP 401
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("authentication required"))]
    Unauthorized { message: Option<String> },

    /// Any other 4xx, usually validation or business rule failures
    #[error("API error (HTTP {status}): {}", message.as_deref().unwrap_or("request rejected"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// 5xx
    #[error("Server error (HTTP {status}): {}", message.as_deref().unwrap_or("internal error"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build the error for a non-success HTTP status
    ///
    /// The backend reports failures as `{ success: false, message: "..." }`;
    /// the message is kept when present.
    pub fn from_status(status: u16, body: Option<&JsonValue>) -> Self {
        let message = body.and_then(extract_message);
        match status {
            401 => Self::Unauthorized { message },
            500..=599 => Self::Server { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Api { message, .. }
            | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Pull a human readable message out of a failure payload
fn extract_message(body: &JsonValue) -> Option<String> {
    body.get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_status_classifies() {
        assert!(Error::from_status(401, None).is_unauthorized());
        assert!(matches!(
            Error::from_status(422, None),
            Error::Api { status: 422, .. }
        ));
        assert!(matches!(
            Error::from_status(503, None),
            Error::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_message_extracted_from_body() {
        let body = json!({ "success": false, "message": "Credenciales inválidas" });
        let err = Error::from_status(400, Some(&body));
        assert_eq!(err.message(), Some("Credenciales inválidas"));
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Credenciales inválidas"));
    }

    #[test]
    fn test_blank_message_ignored() {
        let body = json!({ "message": "   " });
        let err = Error::from_status(400, Some(&body));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.message(), None);
    }
}
