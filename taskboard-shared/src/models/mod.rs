/// Database models for Taskboard
///
/// # Models
///
/// - `user`: Admins and employees, keyed by email
/// - `task`: Work items assigned to users
///
/// Each model carries its own PostgreSQL queries; the [`crate::store`]
/// traits decide which backend runs them.

pub mod task;
pub mod user;
