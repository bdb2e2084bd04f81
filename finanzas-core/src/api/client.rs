//! HTTP client wrapper for the Finanzas backend
//!
//! Every request goes through the same pipeline:
//!
//! 1. attach `Authorization: Bearer <token>` when a token is stored
//! 2. send through the [`HttpTransport`]
//! 3. on success, strip the `{ success, data }` envelope
//! 4. on a first 401, refresh the credential pair and re-issue once
//! 5. if the refresh is impossible or fails, wipe the stored session and
//!    hard-redirect to the login page
//!
//! Any other failure is returned to the caller untouched.
//!
//! Two independent requests that hit a 401 at the same time each run their
//! own refresh; whichever write to storage lands last wins.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use super::envelope::{decode_record, unwrap_data};
use super::request::{ApiRequest, Attempt};
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{AuthResponse, CredentialPair};
use crate::ports::{
    HttpRequest, HttpResponse, HttpTransport, KeyValueStorage, Method, Navigator,
    REFRESH_TOKEN_KEY, SESSION_KEYS, TOKEN_KEY,
};
use crate::router::{Navigation, Route};
use crate::services::logging::{LogEvent, LoggingService};

/// Credential refresh endpoint
pub const REFRESH_PATH: &str = "/Auth/refresh-token";

/// API client with bearer auth and single-retry credential refresh
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn KeyValueStorage>,
    navigator: Arc<dyn Navigator>,
    logger: Option<Arc<LoggingService>>,
}

impl ApiClient {
    /// Create a client; the base URL is resolved once from `config`
    pub fn new(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url()?,
            transport,
            storage,
            navigator,
            logger: None,
        })
    }

    /// Record session events in the event log
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Durable storage shared with the session store
    pub fn storage(&self) -> &Arc<dyn KeyValueStorage> {
        &self.storage
    }

    /// Issue a request and return the unwrapped body
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
        params: Vec<(String, String)>,
    ) -> Result<JsonValue> {
        let mut request = ApiRequest::new(method, path).with_params(params);
        request.body = body;
        self.send(&request)
    }

    /// Issue a prepared request and return the unwrapped body
    pub fn send(&self, request: &ApiRequest) -> Result<JsonValue> {
        let token = self.storage.get(TOKEN_KEY)?;
        self.dispatch(request, Attempt::Original, token.as_deref())
    }

    pub fn get(&self, path: &str) -> Result<JsonValue> {
        self.send(&ApiRequest::get(path))
    }

    pub fn get_with(&self, path: &str, params: Vec<(String, String)>) -> Result<JsonValue> {
        self.send(&ApiRequest::get(path).with_params(params))
    }

    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<JsonValue> {
        self.send(&ApiRequest::post(path).with_body(body)?)
    }

    /// POST without a body
    pub fn post_empty(&self, path: &str) -> Result<JsonValue> {
        self.send(&ApiRequest::post(path))
    }

    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<JsonValue> {
        self.send(&ApiRequest::put(path).with_body(body)?)
    }

    pub fn delete(&self, path: &str) -> Result<JsonValue> {
        self.send(&ApiRequest::delete(path))
    }

    /// Exchange a credential pair for a new one
    ///
    /// Talks to the refresh endpoint directly: no bearer header and no 401
    /// recovery, so a rejected refresh can never trigger another refresh.
    pub fn refresh(&self, pair: &CredentialPair) -> Result<AuthResponse> {
        let request = HttpRequest {
            method: Method::Post,
            url: self.url_for(REFRESH_PATH)?,
            headers: json_headers(),
            query: Vec::new(),
            body: Some(serde_json::to_value(pair)?),
        };

        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            return Err(Error::from_status(response.status, response.body.as_ref()));
        }

        let body = response
            .body
            .map(unwrap_data)
            .ok_or_else(|| Error::decode("empty refresh-token response"))?;
        decode_record(body)
    }

    /// Run one pass of the pipeline
    fn dispatch(&self, request: &ApiRequest, attempt: Attempt, token: Option<&str>) -> Result<JsonValue> {
        let http_request = self.build(request, token)?;
        let response = self.transport.execute(&http_request)?;

        if response.is_success() {
            return Ok(response.body.map(unwrap_data).unwrap_or(JsonValue::Null));
        }

        if response.status == 401 && !attempt.is_retry() {
            return self.recover(request, response);
        }

        Err(Error::from_status(response.status, response.body.as_ref()))
    }

    /// Handle the first 401 of a request
    fn recover(&self, request: &ApiRequest, rejected: HttpResponse) -> Result<JsonValue> {
        let token = self.storage.get(TOKEN_KEY)?;
        let refresh_token = self.storage.get(REFRESH_TOKEN_KEY)?;

        let pair = match (token, refresh_token) {
            (Some(token), Some(refresh_token)) => CredentialPair::new(token, refresh_token),
            _ => {
                self.expire_session(None);
                return Err(Error::from_status(rejected.status, rejected.body.as_ref()));
            }
        };

        let refreshed = match self.refresh(&pair) {
            Ok(refreshed) => refreshed,
            Err(e) => {
                self.expire_session(Some(&e));
                return Err(e);
            }
        };

        self.storage.set(TOKEN_KEY, &refreshed.token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &refreshed.refresh_token)?;
        self.log(LogEvent::new("token_refreshed"));

        self.dispatch(request, Attempt::Retry, Some(&refreshed.token))
    }

    /// Forget the stored session and send the user back to login
    fn expire_session(&self, cause: Option<&Error>) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                self.log(LogEvent::new("storage_clear_failed").with_error(e.to_string()));
            }
        }

        let mut event = LogEvent::new("session_expired").with_route(Route::Login.name());
        if let Some(e) = cause {
            event = event.with_error(e.to_string());
            if let Some(status) = e.status() {
                event = event.with_status(status);
            }
        }
        self.log(event);

        self.navigator.navigate(Navigation::reload(Route::Login));
    }

    fn build(&self, request: &ApiRequest, token: Option<&str>) -> Result<HttpRequest> {
        let mut headers = json_headers();
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        Ok(HttpRequest {
            method: request.method,
            url: self.url_for(&request.path)?,
            headers,
            query: request.params.clone(),
            body: request.body.clone(),
        })
    }

    fn url_for(&self, path: &str) -> Result<String> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::invalid_input(format!("Invalid request path '{}': {}", path, e)))?;
        Ok(url.to_string())
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}
