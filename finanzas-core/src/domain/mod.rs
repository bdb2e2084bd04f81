//! Core domain entities
//!
//! Records exchanged with the backend plus the session payloads. These are
//! plain data structures with light validation - no I/O.

mod budget;
mod category;
mod period;
pub mod result;
mod session;
mod transaction;
mod user;

pub use budget::{Budget, CategoryLimit};
pub use category::{Category, CategoryKind};
pub use period::Period;
pub use session::{AuthResponse, ChangePasswordRequest, CredentialPair, LoginRequest, RegisterRequest};
pub use transaction::{Expense, Income, Movement};
pub use user::UserProfile;
