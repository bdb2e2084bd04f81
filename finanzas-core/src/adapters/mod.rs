//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest (blocking) for the HttpTransport port
//! - a locked JSON file, or memory, for the KeyValueStorage port
//! - a recording navigator for front ends without a page to move to

pub mod file_storage;
pub mod memory_storage;
pub mod navigator;
pub mod reqwest_transport;

#[cfg(test)]
pub mod mock_backend;
