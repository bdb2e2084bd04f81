//! Finanzas Core - client library for the Finanzas personal finance API
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: records exchanged with the backend and session payloads
//! - **ports**: traits for HTTP transport, durable storage and navigation
//! - **api**: the HTTP client wrapper (bearer auth, envelope, refresh-and-retry)
//! - **services**: one service per backend resource plus the session store
//! - **router**: routes and the authentication guard
//! - **adapters**: concrete port implementations (reqwest, session file, ...)

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod router;
pub mod services;

use std::path::Path;
use std::sync::{Arc, OnceLock, Weak};

use anyhow::{Context, Result};

use adapters::file_storage::FileStorage;
use adapters::reqwest_transport::ReqwestTransport;
use api::ApiClient;
use config::Config;
use ports::{HttpTransport, KeyValueStorage, Navigator};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    AuthResponse, Budget, Category, CategoryKind, CategoryLimit, CredentialPair, Expense, Income,
    LoginRequest, Period, RegisterRequest, UserProfile,
};
pub use router::{GuardDecision, Navigation, Route};

/// Navigator handed to the HTTP client
///
/// A hard redirect rebuilds the session store from durable storage before
/// the embedder sees it, so the store never outlives a wiped session.
struct SessionReloader {
    inner: Arc<dyn Navigator>,
    session: OnceLock<Weak<SessionStore>>,
    logger: Option<Arc<LoggingService>>,
}

impl Navigator for SessionReloader {
    fn navigate(&self, navigation: Navigation) {
        if navigation.full_reload {
            if let Some(session) = self.session.get().and_then(Weak::upgrade) {
                if let Err(e) = session.reload() {
                    if let Some(logger) = &self.logger {
                        let _ = logger
                            .log(LogEvent::new("session_reload_failed").with_error(e.to_string()));
                    }
                }
            }
        }
        self.inner.navigate(navigation);
    }
}

/// Collaborators a context is assembled from
pub struct ContextParts {
    pub config: Config,
    pub transport: Arc<dyn HttpTransport>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub navigator: Arc<dyn Navigator>,
    pub logger: Option<Arc<LoggingService>>,
}

/// Main context for Finanzas operations
///
/// Owns the HTTP client, the session store and every resource service.
/// Front ends build exactly one at startup and pass it around explicitly.
pub struct FinanzasContext {
    pub config: Config,
    pub storage: Arc<dyn KeyValueStorage>,
    pub navigator: Arc<dyn Navigator>,
    pub logger: Option<Arc<LoggingService>>,
    pub client: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub auth_service: Arc<AuthService>,
    pub category_service: CategoryService,
    pub expense_service: ExpenseService,
    pub income_service: IncomeService,
    pub budget_service: BudgetService,
    pub category_limit_service: CategoryLimitService,
    pub report_service: ReportService,
}

impl FinanzasContext {
    /// Create a context backed by the application directory
    ///
    /// Settings come from `settings.json`, the session from `session.json`
    /// and events go to `logs.duckdb`. An event log that cannot be opened
    /// disables logging rather than failing startup.
    pub fn new(app_dir: &Path, entry_point: EntryPoint, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let config = Config::load(app_dir).context("Failed to load settings")?;
        let transport = ReqwestTransport::with_timeout(config.timeout_secs)?;
        let storage = FileStorage::new(app_dir).context("Failed to open session storage")?;
        let logger = LoggingService::new(app_dir, entry_point, env!("CARGO_PKG_VERSION"))
            .ok()
            .map(Arc::new);

        Self::from_parts(ContextParts {
            config,
            transport: Arc::new(transport),
            storage: Arc::new(storage),
            navigator,
            logger,
        })
    }

    /// Assemble a context from explicit collaborators
    pub fn from_parts(parts: ContextParts) -> Result<Self> {
        let ContextParts {
            config,
            transport,
            storage,
            navigator,
            logger,
        } = parts;

        let reloader = Arc::new(SessionReloader {
            inner: navigator.clone(),
            session: OnceLock::new(),
            logger: logger.clone(),
        });
        let mut client = ApiClient::new(&config, transport, storage.clone(), reloader.clone())?;
        if let Some(logger) = &logger {
            client = client.with_logger(logger.clone());
        }
        let client = Arc::new(client);

        let auth_service = Arc::new(AuthService::new(client.clone()));
        let mut session = SessionStore::new(auth_service.clone(), storage.clone(), navigator.clone())
            .context("Failed to restore session")?;
        if let Some(logger) = &logger {
            session = session.with_logger(logger.clone());
        }
        let session = Arc::new(session);
        let _ = reloader.session.set(Arc::downgrade(&session));

        Ok(Self {
            category_service: CategoryService::new(client.clone()),
            expense_service: ExpenseService::new(client.clone()),
            income_service: IncomeService::new(client.clone()),
            budget_service: BudgetService::new(client.clone()),
            category_limit_service: CategoryLimitService::new(client.clone()),
            report_service: ReportService::new(client.clone()),
            config,
            storage,
            navigator,
            logger,
            client,
            session,
            auth_service,
        })
    }

    /// Guard a navigation against the current session
    pub fn navigate(&self, path: &str) -> Route {
        router::navigate(path, self.session.is_authenticated())
    }

    /// Tear the context down
    ///
    /// The session stays in durable storage for the next start.
    pub fn shutdown(self) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event("context_shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_storage::MemoryStorage;
    use crate::adapters::navigator::RecordingNavigator;
    use crate::api::test_support::ScriptedTransport;
    use tempfile::tempdir;

    #[test]
    fn test_from_parts_restores_session() {
        let storage = Arc::new(MemoryStorage::with_entries([
            ("token", "t1"),
            ("refreshToken", "r1"),
            ("user", r#"{"id":7,"email":"a@b.com","nombre":"Ana"}"#),
        ]));
        let ctx = FinanzasContext::from_parts(ContextParts {
            config: Config::default(),
            transport: Arc::new(ScriptedTransport::new(vec![])),
            storage,
            navigator: Arc::new(RecordingNavigator::new()),
            logger: None,
        })
        .unwrap();

        assert!(ctx.session.is_authenticated());
        assert_eq!(ctx.navigate("/auth/login"), Route::Dashboard);
        assert_eq!(ctx.navigate("/gastos"), Route::Expenses);
        assert_eq!(ctx.client.base_url().as_str(), "http://localhost:5000/api/");
        ctx.shutdown();
    }

    #[test]
    fn test_new_uses_app_dir() {
        let dir = tempdir().unwrap();
        let ctx = FinanzasContext::new(
            dir.path(),
            EntryPoint::Embedded,
            Arc::new(RecordingNavigator::new()),
        )
        .unwrap();

        assert!(!ctx.session.is_authenticated());
        assert_eq!(ctx.navigate("/reportes"), Route::Login);
        assert!(dir.path().join("logs.duckdb").exists());
        ctx.shutdown();
    }
}
