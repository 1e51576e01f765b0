/// Authentication and authorization
///
/// - [`jwt`]: signed session tokens carrying the caller's user id and email
/// - [`middleware`]: Axum bearer-token extraction into an [`middleware::AuthContext`]
/// - [`authorization`]: the permission policy every service operation consults

pub mod authorization;
pub mod jwt;
pub mod middleware;
