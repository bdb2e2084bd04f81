//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core depends
//! only on these traits, not on concrete implementations.

mod navigator;
pub mod storage;
mod transport;

pub use navigator::Navigator;
pub use storage::{KeyValueStorage, REFRESH_TOKEN_KEY, SESSION_KEYS, TOKEN_KEY, USER_KEY};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
