//! Navigator adapters

use std::sync::Mutex;

use crate::ports::Navigator;
use crate::router::{Navigation, Route};

/// Remembers every navigation request
///
/// Terminal front ends have no page to move to, so they inspect the history
/// after an operation (e.g. to tell the user their session expired).
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations so far, oldest first
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Most recent navigation
    pub fn last(&self) -> Option<Navigation> {
        self.history.lock().ok().and_then(|h| h.last().copied())
    }

    /// Current route, if any navigation happened
    pub fn current(&self) -> Option<Route> {
        self.last().map(|n| n.route)
    }

    /// True if a hard redirect to the login page was requested
    pub fn session_expired(&self) -> bool {
        self.history()
            .iter()
            .any(|n| n.full_reload && n.route == Route::Login)
    }

    pub fn clear(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: Navigation) {
        if let Ok(mut history) = self.history.lock() {
            history.push(navigation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let navigator = RecordingNavigator::new();
        assert_eq!(navigator.current(), None);

        navigator.navigate(Navigation::to(Route::Dashboard));
        navigator.navigate(Navigation::to(Route::Login));

        assert_eq!(navigator.history().len(), 2);
        assert_eq!(navigator.current(), Some(Route::Login));
        assert!(!navigator.session_expired());
    }

    #[test]
    fn test_session_expired_needs_full_reload() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Navigation::reload(Route::Login));
        assert!(navigator.session_expired());

        navigator.clear();
        assert!(navigator.history().is_empty());
    }
}
