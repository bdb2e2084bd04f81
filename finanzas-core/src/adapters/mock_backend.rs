//! Mock Finanzas backend for testing
//!
//! A small HTTP server that speaks enough of the backend API to exercise the
//! real transport end to end:
//! - POST /api/Auth/login returns `{ success, data: { token, refreshToken, ... } }`
//! - POST /api/Auth/refresh-token rotates the credential pair
//! - GET /api/Auth/profile and GET /api/Gastos require the current access token
//!
//! Every response is wrapped in the `{ success, data, message }` envelope.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

pub const MOCK_EMAIL: &str = "a@b.com";
pub const MOCK_PASSWORD: &str = "secret";

/// Mock backend server for testing
pub struct MockFinanzasServer {
    port: u16,
    state: Arc<Mutex<MockState>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Behaviour switches for the mock
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Refuse every refresh-token call
    pub reject_refresh: bool,
    /// Number of expenses returned by GET /Gastos
    pub num_expenses: usize,
}

#[derive(Debug, Default)]
struct MockState {
    generation: u32,
    access_token: Option<String>,
    refresh_token: Option<String>,
    refresh_calls: usize,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    /// Issue a fresh credential pair, invalidating the previous one
    fn rotate(&mut self) -> (String, String) {
        self.generation += 1;
        let access = format!("access-{}", self.generation);
        let refresh = format!("refresh-{}", self.generation);
        self.access_token = Some(access.clone());
        self.refresh_token = Some(refresh.clone());
        (access, refresh)
    }
}

/// What the mock saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

struct ParsedRequest {
    method: String,
    path: String,
    bearer: Option<String>,
    body: Option<JsonValue>,
}

impl MockFinanzasServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let state = Arc::new(Mutex::new(MockState::default()));
        let state_clone = state.clone();

        // Non-blocking so stop() can end the accept loop
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = state_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &state);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            state,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// API base URL (includes the `/api` prefix)
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Invalidate the current access token; the refresh token stays valid
    pub fn expire_access_token(&self) {
        self.state.lock().unwrap().access_token = Some("revoked".to_string());
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().unwrap().refresh_calls
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockFinanzasServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Mutex<MockState>) {
    let request = match read_request(&mut stream) {
        Some(request) => request,
        None => {
            send_response(&mut stream, 400, &failure("Invalid request"));
            return;
        }
    };

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: request.method.clone(),
        path: request.path.clone(),
        bearer: request.bearer.clone(),
    });

    let path = request.path.split('?').next().unwrap_or("");
    let authorized = request.bearer.is_some() && request.bearer == state.access_token;

    match (request.method.as_str(), path) {
        ("POST", "/api/Auth/login") => {
            let body = request.body.unwrap_or(JsonValue::Null);
            if body["email"] == MOCK_EMAIL && body["password"] == MOCK_PASSWORD {
                let (access, refresh) = state.rotate();
                send_response(&mut stream, 200, &success(auth_payload(&access, &refresh)));
            } else {
                send_response(&mut stream, 400, &failure("Credenciales inválidas"));
            }
        }
        ("POST", "/api/Auth/refresh-token") => {
            state.refresh_calls += 1;
            let presented = request
                .body
                .as_ref()
                .and_then(|b| b["refreshToken"].as_str().map(str::to_string));
            if !config.reject_refresh && presented.is_some() && presented == state.refresh_token {
                let (access, refresh) = state.rotate();
                send_response(&mut stream, 200, &success(auth_payload(&access, &refresh)));
            } else {
                send_response(&mut stream, 400, &failure("Refresh token inválido"));
            }
        }
        _ if !authorized => {
            send_response(&mut stream, 401, "");
        }
        ("GET", "/api/Auth/profile") => {
            let profile = json!({ "id": 7, "email": MOCK_EMAIL, "nombre": "Ana" });
            send_response(&mut stream, 200, &success(profile));
        }
        ("GET", "/api/Gastos") => {
            let items: Vec<JsonValue> = (0..config.num_expenses)
                .map(|i| {
                    json!({
                        "id": i + 1,
                        "monto": 10.5 * (i + 1) as f64,
                        "descripcion": format!("Gasto #{}", i + 1),
                        "fecha": "2024-05-02T00:00:00",
                        "categoriaId": 1
                    })
                })
                .collect();
            let total = items.len();
            send_response(&mut stream, 200, &success(json!({ "items": items, "total": total })));
        }
        _ => {
            send_response(&mut stream, 404, &failure("Endpoint not found"));
        }
    }
}

/// Read headers, then as many body bytes as Content-Length announces
fn read_request(stream: &mut TcpStream) -> Option<ParsedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find(&data, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0;
    let mut bearer = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_lowercase().as_str() {
            "content-length" => content_length = value.parse().unwrap_or(0),
            "authorization" => {
                bearer = value.strip_prefix("Bearer ").map(str::to_string);
            }
            _ => {}
        }
    }

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = data.len().min(header_end + content_length);
    let body = serde_json::from_slice(&data[header_end..body_end]).ok();

    Some(ParsedRequest {
        method,
        path,
        bearer,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn auth_payload(access: &str, refresh: &str) -> JsonValue {
    json!({
        "token": access,
        "refreshToken": refresh,
        "userId": 7,
        "email": MOCK_EMAIL,
        "nombre": "Ana"
    })
}

fn success(data: JsonValue) -> String {
    json!({ "success": true, "data": data, "message": null }).to_string()
}

fn failure(message: &str) -> String {
    json!({ "success": false, "data": null, "message": message }).to_string()
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_storage::FileStorage;
    use crate::adapters::navigator::RecordingNavigator;
    use crate::adapters::reqwest_transport::ReqwestTransport;
    use crate::api::ApiClient;
    use crate::config::Config;
    use crate::domain::LoginRequest;
    use crate::ports::KeyValueStorage;
    use crate::services::{AuthService, ExpenseService, SessionStore};
    use tempfile::{tempdir, TempDir};

    struct Stack {
        _dir: TempDir,
        storage: Arc<FileStorage>,
        navigator: Arc<RecordingNavigator>,
        session: SessionStore,
        expenses: ExpenseService,
    }

    fn stack(server: &MockFinanzasServer) -> Stack {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
        let navigator = Arc::new(RecordingNavigator::new());
        let config = Config {
            api_url: server.base_url(),
            timeout_secs: 5,
            ..Config::default()
        };
        let client = Arc::new(
            ApiClient::new(
                &config,
                Arc::new(ReqwestTransport::with_timeout(5).unwrap()),
                storage.clone(),
                navigator.clone(),
            )
            .unwrap(),
        );
        let auth = Arc::new(AuthService::new(client.clone()));
        let session = SessionStore::new(auth, storage.clone(), navigator.clone()).unwrap();

        Stack {
            _dir: dir,
            storage,
            navigator,
            session,
            expenses: ExpenseService::new(client),
        }
    }

    #[test]
    fn test_mock_server_starts() {
        let server = MockFinanzasServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
        assert!(server.base_url().ends_with("/api"));
    }

    #[test]
    fn test_login_then_list() {
        let server = MockFinanzasServer::start(MockConfig {
            num_expenses: 4,
            ..Default::default()
        })
        .unwrap();
        let s = stack(&server);

        s.session
            .login(&LoginRequest::new(MOCK_EMAIL, MOCK_PASSWORD))
            .unwrap();
        assert!(s.session.is_authenticated());
        assert_eq!(s.storage.get("token").unwrap(), Some("access-1".to_string()));

        let expenses = s.expenses.list(vec![]).unwrap();
        assert_eq!(expenses.len(), 4);
        assert_eq!(expenses[3].description.as_deref(), Some("Gasto #4"));

        let last = server.requests().pop().unwrap();
        assert_eq!(last.bearer.as_deref(), Some("access-1"));
    }

    #[test]
    fn test_bad_password_reports_server_message() {
        let server = MockFinanzasServer::start(MockConfig::default()).unwrap();
        let s = stack(&server);

        assert!(s.session.login(&LoginRequest::new(MOCK_EMAIL, "wrong")).is_err());
        assert_eq!(s.session.error().as_deref(), Some("Credenciales inválidas"));
        assert!(!s.session.is_authenticated());
    }

    #[test]
    fn test_expired_token_is_refreshed_transparently() {
        let server = MockFinanzasServer::start(MockConfig {
            num_expenses: 2,
            ..Default::default()
        })
        .unwrap();
        let s = stack(&server);

        s.session
            .login(&LoginRequest::new(MOCK_EMAIL, MOCK_PASSWORD))
            .unwrap();
        server.expire_access_token();

        let expenses = s.expenses.list(vec![]).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(s.storage.get("token").unwrap(), Some("access-2".to_string()));
        assert_eq!(
            s.storage.get("refreshToken").unwrap(),
            Some("refresh-2".to_string())
        );

        // The store catches up with the rotated pair on reload
        s.session.reload().unwrap();
        assert_eq!(s.session.token(), Some("access-2".to_string()));
    }

    #[test]
    fn test_rejected_refresh_expires_session() {
        let server = MockFinanzasServer::start(MockConfig {
            reject_refresh: true,
            ..Default::default()
        })
        .unwrap();
        let s = stack(&server);

        s.session
            .login(&LoginRequest::new(MOCK_EMAIL, MOCK_PASSWORD))
            .unwrap();
        server.expire_access_token();

        let err = s.expenses.list(vec![]).unwrap_err();
        assert_eq!(err.message(), Some("Refresh token inválido"));
        assert_eq!(server.refresh_calls(), 1);
        assert_eq!(s.storage.get("token").unwrap(), None);
        assert_eq!(s.storage.get("user").unwrap(), None);
        assert!(s.navigator.session_expired());

        s.session.reload().unwrap();
        assert!(!s.session.is_authenticated());
    }
}
