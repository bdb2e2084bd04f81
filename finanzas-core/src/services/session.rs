//! Session store - authentication state machine
//!
//! Holds the in-memory view of the session (credential pair, user profile,
//! loading flag, last error) and mirrors it into durable storage under the
//! `token`, `refreshToken` and `user` keys.
//!
//! State is derived from durable storage at construction: the session is
//! `Authenticated` whenever an access token is stored. The token is not
//! re-validated against the backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::auth::AuthService;
use super::logging::{LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::{
    AuthResponse, ChangePasswordRequest, CredentialPair, LoginRequest, RegisterRequest,
    UserProfile,
};
use crate::ports::{KeyValueStorage, Navigator, REFRESH_TOKEN_KEY, SESSION_KEYS, TOKEN_KEY, USER_KEY};
use crate::router::{Navigation, Route};

/// Error recorded when a failed login carries no server message
pub const LOGIN_FAILED_MESSAGE: &str = "Error al iniciar sesión";

/// Error recorded when a failed registration carries no server message
pub const REGISTER_FAILED_MESSAGE: &str = "Error al registrarse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionData {
    token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
    error: Option<String>,
}

impl SessionData {
    /// Read the durable entries; the user is only restored alongside a token
    fn restore(storage: &dyn KeyValueStorage) -> Result<Self> {
        let token = storage.get(TOKEN_KEY)?;
        let refresh_token = storage.get(REFRESH_TOKEN_KEY)?;
        let user = match token {
            Some(_) => storage
                .get(USER_KEY)?
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            None => None,
        };

        Ok(Self {
            token,
            refresh_token,
            user,
            error: None,
        })
    }

    fn pair(&self) -> Option<CredentialPair> {
        match (&self.token, &self.refresh_token) {
            (Some(token), Some(refresh_token)) => {
                Some(CredentialPair::new(token.clone(), refresh_token.clone()))
            }
            _ => None,
        }
    }
}

/// Sets the loading flag for as long as it is alive
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Which auth endpoint a credential exchange goes to
#[derive(Clone, Copy)]
enum Exchange {
    Login,
    Register,
}

impl Exchange {
    fn event(&self, succeeded: bool) -> &'static str {
        match (self, succeeded) {
            (Exchange::Login, true) => "login_succeeded",
            (Exchange::Login, false) => "login_failed",
            (Exchange::Register, true) => "register_succeeded",
            (Exchange::Register, false) => "register_failed",
        }
    }

    fn fallback_message(&self) -> &'static str {
        match self {
            Exchange::Login => LOGIN_FAILED_MESSAGE,
            Exchange::Register => REGISTER_FAILED_MESSAGE,
        }
    }
}

pub struct SessionStore {
    auth: Arc<AuthService>,
    storage: Arc<dyn KeyValueStorage>,
    navigator: Arc<dyn Navigator>,
    logger: Option<Arc<LoggingService>>,
    data: Mutex<SessionData>,
    loading: AtomicBool,
}

impl SessionStore {
    /// Create the store, restoring any session left in durable storage
    pub fn new(
        auth: Arc<AuthService>,
        storage: Arc<dyn KeyValueStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let data = SessionData::restore(storage.as_ref())?;
        Ok(Self {
            auth,
            storage,
            navigator,
            logger: None,
            data: Mutex::new(data),
            loading: AtomicBool::new(false),
        })
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Log in and go to the dashboard
    ///
    /// On failure the server's message (or a generic one) is kept in
    /// [`error`](Self::error) and the error is returned.
    pub fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        self.exchange(Exchange::Login, || self.auth.login(credentials))
    }

    /// Create an account, log in and go to the dashboard
    pub fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse> {
        self.exchange(Exchange::Register, || self.auth.register(profile))
    }

    /// Rotate the credential pair; logs out if the backend refuses
    pub fn refresh_tokens(&self) -> Result<AuthResponse> {
        let pair = self.current_pair()?;

        let result = match pair {
            Some(pair) => self.auth.refresh_token(&pair),
            None => Err(Error::Unauthorized {
                message: Some("no session to refresh".to_string()),
            }),
        };

        match result.and_then(|response| {
            self.apply(&response, response.user_id != 0)?;
            Ok(response)
        }) {
            Ok(response) => {
                self.log(LogEvent::new("token_refreshed"));
                Ok(response)
            }
            Err(e) => {
                let mut event = LogEvent::new("token_refresh_failed").with_error(e.to_string());
                if let Some(status) = e.status() {
                    event = event.with_status(status);
                }
                self.log(event);
                self.logout();
                Err(e)
            }
        }
    }

    /// Forget the session and go to the login page
    ///
    /// Never fails: storage errors are logged and the in-memory state is
    /// cleared regardless.
    pub fn logout(&self) {
        {
            let mut data = self.lock();
            data.token = None;
            data.refresh_token = None;
            data.user = None;
        }

        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                self.log(LogEvent::new("storage_clear_failed").with_error(e.to_string()));
            }
        }

        self.log(LogEvent::new("logout").with_route(Route::Login.name()));
        self.navigator.navigate(Navigation::to(Route::Login));
    }

    /// Re-derive the session from durable storage
    ///
    /// Run after a full redirect, when the client may have rotated or wiped
    /// the stored credentials behind the store's back.
    pub fn reload(&self) -> Result<()> {
        let restored = SessionData::restore(self.storage.as_ref())?;
        let mut data = self.lock();
        data.token = restored.token;
        data.refresh_token = restored.refresh_token;
        data.user = restored.user;
        Ok(())
    }

    /// Fetch the profile from the backend and keep it as the session user
    pub fn fetch_profile(&self) -> Result<UserProfile> {
        let result = self.auth.profile();
        self.reload()?;

        let profile = result?;
        if self.is_authenticated() {
            self.storage.set(USER_KEY, &serde_json::to_string(&profile)?)?;
            self.lock().user = Some(profile.clone());
        }
        Ok(profile)
    }

    pub fn change_password(&self, request: &ChangePasswordRequest) -> Result<JsonValue> {
        let result = self.auth.change_password(request);
        self.reload()?;
        result
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Message of the last failed login or registration
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    fn exchange<F>(&self, kind: Exchange, call: F) -> Result<AuthResponse>
    where
        F: FnOnce() -> Result<AuthResponse>,
    {
        let _loading = LoadingGuard::start(&self.loading);
        self.lock().error = None;

        let result = call().and_then(|response| {
            self.apply(&response, true)?;
            Ok(response)
        });

        match result {
            Ok(response) => {
                self.log(LogEvent::new(kind.event(true)).with_route(Route::Dashboard.name()));
                self.navigator.navigate(Navigation::to(Route::Dashboard));
                Ok(response)
            }
            Err(e) => {
                let message = e.message().unwrap_or(kind.fallback_message()).to_string();
                let mut event = LogEvent::new(kind.event(false)).with_error(message.clone());
                if let Some(status) = e.status() {
                    event = event.with_status(status);
                }
                self.log(event);
                self.lock().error = Some(message);
                Err(e)
            }
        }
    }

    /// Persist a credential response, then adopt it in memory
    fn apply(&self, response: &AuthResponse, replace_user: bool) -> Result<()> {
        let user = response.user();

        self.storage.set(TOKEN_KEY, &response.token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &response.refresh_token)?;
        if replace_user {
            self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        }

        let mut data = self.lock();
        data.token = Some(response.token.clone());
        data.refresh_token = Some(response.refresh_token.clone());
        if replace_user {
            data.user = Some(user);
        }
        Ok(())
    }

    /// The stored pair when present, else the in-memory one
    fn current_pair(&self) -> Result<Option<CredentialPair>> {
        let stored = SessionData::restore(self.storage.as_ref())?.pair();
        Ok(stored.or_else(|| self.lock().pair()))
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_storage::MemoryStorage;
    use crate::api::test_support::{enveloped, harness, logged_in, status, url, Harness};
    use crate::api::REFRESH_PATH;
    use serde_json::json;

    fn store(h: &Harness) -> SessionStore {
        let auth = Arc::new(AuthService::new(h.client.clone()));
        SessionStore::new(auth, h.storage.clone(), h.navigator.clone()).unwrap()
    }

    fn auth_body() -> JsonValue {
        json!({ "token": "t1", "refreshToken": "r1", "userId": 7, "email": "a@b.com", "nombre": "Ana" })
    }

    #[test]
    fn test_starts_anonymous_without_token() {
        let storage = MemoryStorage::with_entries([("user", r#"{"id":1,"email":"x","nombre":"X"}"#)]);
        let h = harness(storage, vec![]);
        let session = store(&h);

        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.user().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_restores_stored_session() {
        let h = harness(logged_in(), vec![]);
        let session = store(&h);

        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t1".to_string()));
        assert_eq!(session.user(), Some(UserProfile::new(7, "a@b.com", "Ana")));
        assert!(h.transport.sent().is_empty());
    }

    #[test]
    fn test_login_success() {
        let h = harness(MemoryStorage::new(), vec![enveloped(auth_body())]);
        let session = store(&h);

        session.login(&LoginRequest::new("a@b.com", "secret")).unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.user(), Some(UserProfile::new(7, "a@b.com", "Ana")));
        assert_eq!(session.error(), None);
        assert!(!session.is_loading());
        assert_eq!(h.storage.get("token").unwrap(), Some("t1".to_string()));
        assert_eq!(h.storage.get("refreshToken").unwrap(), Some("r1".to_string()));
        let stored_user: UserProfile =
            serde_json::from_str(&h.storage.get("user").unwrap().unwrap()).unwrap();
        assert_eq!(stored_user.id, 7);
        assert_eq!(h.navigator.last(), Some(Navigation::to(Route::Dashboard)));
    }

    #[test]
    fn test_login_failure_keeps_server_message() {
        let h = harness(
            MemoryStorage::new(),
            vec![status(400, Some(json!({ "success": false, "message": "Credenciales inválidas" })))],
        );
        let session = store(&h);

        let err = session.login(&LoginRequest::new("a@b.com", "bad")).unwrap_err();
        assert!(matches!(err, Error::Api { status: 400, .. }));
        assert_eq!(session.error(), Some("Credenciales inválidas".to_string()));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(!session.is_loading());
        assert!(h.navigator.history().is_empty());
    }

    #[test]
    fn test_login_failure_fallback_message() {
        let h = harness(MemoryStorage::new(), vec![status(500, None)]);
        let session = store(&h);

        session.login(&LoginRequest::new("a@b.com", "x")).unwrap_err();
        assert_eq!(session.error(), Some(LOGIN_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn test_register_failure_fallback_message() {
        let h = harness(MemoryStorage::new(), vec![]);
        let session = store(&h);

        let profile = RegisterRequest {
            nombre: "Ana".to_string(),
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        };
        let err = session.register(&profile).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(session.error(), Some(REGISTER_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn test_new_attempt_clears_previous_error() {
        let h = harness(
            MemoryStorage::new(),
            vec![status(500, None), enveloped(auth_body())],
        );
        let session = store(&h);

        session.login(&LoginRequest::new("a@b.com", "x")).unwrap_err();
        assert!(session.error().is_some());
        session.login(&LoginRequest::new("a@b.com", "secret")).unwrap();
        assert!(session.error().is_none());
    }

    #[test]
    fn test_logout_clears_everything() {
        let h = harness(logged_in(), vec![]);
        let session = store(&h);

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(h.storage.is_empty());
        assert_eq!(h.navigator.last(), Some(Navigation::to(Route::Login)));

        // Idempotent
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_refresh_prefers_stored_pair() {
        let h = harness(
            logged_in(),
            vec![enveloped(json!({ "token": "t3", "refreshToken": "r3" }))],
        );
        let session = store(&h);
        h.storage.set("token", "t2").unwrap();
        h.storage.set("refreshToken", "r2").unwrap();

        session.refresh_tokens().unwrap();

        let sent = h.transport.last();
        assert_eq!(sent.url, url(REFRESH_PATH));
        assert_eq!(sent.body, Some(json!({ "token": "t2", "refreshToken": "r2" })));
        assert_eq!(session.token(), Some("t3".to_string()));
        assert_eq!(h.storage.get("refreshToken").unwrap(), Some("r3".to_string()));
        // Refresh responses without a user keep the current profile
        assert_eq!(session.user().map(|u| u.id), Some(7));
    }

    #[test]
    fn test_refresh_failure_logs_out() {
        let h = harness(logged_in(), vec![status(400, None)]);
        let session = store(&h);

        assert!(session.refresh_tokens().is_err());
        assert!(!session.is_authenticated());
        assert!(h.storage.is_empty());
        assert_eq!(h.navigator.current(), Some(Route::Login));
    }

    #[test]
    fn test_refresh_without_pair_logs_out() {
        let h = harness(MemoryStorage::with_entries([("token", "t1")]), vec![]);
        let session = store(&h);

        let err = session.refresh_tokens().unwrap_err();
        assert!(err.is_unauthorized());
        assert!(h.transport.sent().is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_reload_picks_up_expired_session() {
        let h = harness(logged_in(), vec![status(401, None), status(400, None)]);
        let session = store(&h);

        assert!(session.fetch_profile().is_err());
        // The client wiped storage; fetch_profile re-syncs the store
        assert!(!session.is_authenticated());
        assert!(h.navigator.session_expired());
    }

    #[test]
    fn test_fetch_profile_updates_user() {
        let h = harness(
            logged_in(),
            vec![enveloped(json!({ "id": 7, "email": "a@b.com", "nombre": "Ana María" }))],
        );
        let session = store(&h);

        let profile = session.fetch_profile().unwrap();
        assert_eq!(profile.nombre, "Ana María");
        assert_eq!(session.user().unwrap().nombre, "Ana María");
        assert!(h.storage.get("user").unwrap().unwrap().contains("Ana María"));
    }
}
