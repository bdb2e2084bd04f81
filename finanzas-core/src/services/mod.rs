//! Service layer - business logic orchestration
//!
//! Each resource service wraps one backend collection; the session store
//! drives authentication on top of [`AuthService`].

mod auth;
mod budgets;
mod categories;
mod category_limits;
mod expenses;
mod incomes;
pub mod logging;
mod reports;
mod resource;
mod session;

pub use auth::AuthService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use category_limits::CategoryLimitService;
pub use expenses::ExpenseService;
pub use incomes::IncomeService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use reports::{ReportService, DEFAULT_EVOLUTION_MONTHS};
pub use session::{SessionState, SessionStore, LOGIN_FAILED_MESSAGE, REGISTER_FAILED_MESSAGE};
