//! # Taskboard Shared Library
//!
//! Domain types, storage and business operations for the Taskboard
//! task-assignment service. The HTTP server in `taskboard-api` is a thin
//! layer over [`services`].
//!
//! ## Module Organization
//!
//! - `models`: users and tasks, with their PostgreSQL queries
//! - `store`: storage traits with PostgreSQL and in-memory backends
//! - `services`: identity, task lifecycle and dashboard operations
//! - `auth`: session tokens, request authentication and the permission policy
//! - `db`: connection pool and migrations
//! - `error`: service error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{ServiceError, ServiceResult};

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
