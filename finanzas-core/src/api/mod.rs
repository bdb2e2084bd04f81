//! HTTP client wrapper and response normalization
//!
//! [`ApiClient`] is the one place that talks to the backend; every domain
//! service goes through it.

mod client;
pub mod envelope;
mod request;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ApiClient, REFRESH_PATH};
pub use envelope::ListShape;
pub use request::{ApiRequest, Attempt};
