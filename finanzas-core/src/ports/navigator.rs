//! Navigation port
//!
//! The core decides *when* to navigate (after login, on logout, when a
//! session cannot be refreshed); the embedding front end decides *how*.

use crate::router::Navigation;

/// Receives navigation requests from the core
pub trait Navigator: Send + Sync {
    fn navigate(&self, navigation: Navigation);
}
