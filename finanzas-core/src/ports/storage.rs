//! Durable key/value storage port
//!
//! The session mirror is three string entries; this port is the minimal
//! surface needed to keep them across restarts.

use crate::domain::result::Result;

/// Key holding the access token
pub const TOKEN_KEY: &str = "token";

/// Key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key holding the serialized user profile
pub const USER_KEY: &str = "user";

/// All keys that make up a persisted session
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Durable string storage
///
/// Writes to a single key must be atomic; there is no multi-key transaction.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
