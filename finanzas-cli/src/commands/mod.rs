//! CLI command implementations

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod limits;
pub mod logs;
pub mod movements;
pub mod open;
pub mod reports;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use finanzas_core::adapters::navigator::RecordingNavigator;
use finanzas_core::services::{EntryPoint, LogEvent, LoggingService};
use finanzas_core::FinanzasContext;

use crate::output;

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the application directory from environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINANZAS_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".finanzas"))
}

/// A context plus the navigator the CLI inspects after each command
pub struct App {
    pub ctx: FinanzasContext,
    pub navigator: Arc<RecordingNavigator>,
}

/// Build the context for this invocation
pub fn get_context() -> Result<App> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create finanzas directory: {:?}", app_dir))?;

    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = FinanzasContext::new(&app_dir, EntryPoint::Cli, navigator.clone())
        .context("Failed to initialize finanzas context")?;

    Ok(App { ctx, navigator })
}

/// Run `f` against a fresh context
///
/// Records the command in the event log and, if the client had to drop the
/// session along the way, tells the user to log in again.
pub fn with_context<T, F>(command: &str, f: F) -> Result<T>
where
    F: FnOnce(&App) -> Result<T>,
{
    let app = get_context()?;
    let was_authenticated = app.ctx.session.is_authenticated();
    let result = f(&app);

    let mut event = LogEvent::new("command_executed").with_command(command);
    if let Err(e) = &result {
        event = event.with_error(e.to_string());
    }
    log_event(app.ctx.logger.as_deref(), event);

    if session_dropped(was_authenticated, &app.navigator) {
        output::warning("Your session has expired. Run `fz login` to sign in again.");
    }

    app.ctx.shutdown();
    result
}

/// A session that existed before the command was dropped by the client
///
/// A rejected login from an anonymous state also ends in a hard redirect to
/// login; there was no session to lose, so nothing is reported.
fn session_dropped(was_authenticated: bool, navigator: &RecordingNavigator) -> bool {
    was_authenticated && navigator.session_expired()
}

#[cfg(test)]
mod tests {
    use super::*;
    use finanzas_core::ports::Navigator;
    use finanzas_core::{Navigation, Route};

    #[test]
    fn test_session_dropped_only_for_prior_session() {
        let navigator = RecordingNavigator::new();
        assert!(!session_dropped(true, &navigator));

        navigator.navigate(Navigation::reload(Route::Login));
        assert!(session_dropped(true, &navigator));
        assert!(!session_dropped(false, &navigator));
    }

    #[test]
    fn test_logout_is_not_a_dropped_session() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Navigation::to(Route::Login));
        assert!(!session_dropped(true, &navigator));
    }
}
