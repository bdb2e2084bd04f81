//! Scripted transport shared by the client and service unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;

use super::ApiClient;
use crate::adapters::memory_storage::MemoryStorage;
use crate::adapters::navigator::RecordingNavigator;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, HttpTransport};

/// Replays canned responses in order and records every request sent
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.sent().pop().expect("no request sent")
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Transport("script exhausted".to_string()))
    }
}

pub struct Harness {
    pub client: Arc<ApiClient>,
    pub transport: Arc<ScriptedTransport>,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

pub const BASE: &str = "http://api.test/api";

pub fn harness(storage: MemoryStorage, responses: Vec<HttpResponse>) -> Harness {
    let transport = Arc::new(ScriptedTransport::new(responses));
    let storage = Arc::new(storage);
    let navigator = Arc::new(RecordingNavigator::new());
    let config = Config {
        api_url: BASE.to_string(),
        ..Config::default()
    };
    let client = ApiClient::new(&config, transport.clone(), storage.clone(), navigator.clone())
        .unwrap();

    Harness {
        client: Arc::new(client),
        transport,
        storage,
        navigator,
    }
}

/// Storage holding a full session for user 7
pub fn logged_in() -> MemoryStorage {
    MemoryStorage::with_entries([
        ("token", "t1"),
        ("refreshToken", "r1"),
        ("user", r#"{"id":7,"email":"a@b.com","nombre":"Ana"}"#),
    ])
}

pub fn ok(body: JsonValue) -> HttpResponse {
    HttpResponse::new(200, Some(body))
}

/// `{ success: true, data }`
pub fn enveloped(data: JsonValue) -> HttpResponse {
    ok(serde_json::json!({ "success": true, "data": data, "message": null }))
}

pub fn status(code: u16, body: Option<JsonValue>) -> HttpResponse {
    HttpResponse::new(code, body)
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}
