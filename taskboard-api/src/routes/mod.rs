/// API route handlers, one module per resource
///
/// - `health`: liveness and store connectivity
/// - `auth`: sign-in and token refresh
/// - `users`: caller profile and user lookups
/// - `employees`: employee listing and removal
/// - `tasks`: task lifecycle
/// - `dashboard`: status counts and per-employee summaries

pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod tasks;
pub mod users;
