//! # Taskboard API Server Library
//!
//! HTTP surface over the operations in `taskboard_shared::services`.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error handling and HTTP response mapping
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
