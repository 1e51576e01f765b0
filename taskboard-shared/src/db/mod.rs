/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Queries live on the models in [`crate::models`]; the store adapter in
/// [`crate::store::postgres`] wires them to the store traits.

pub mod migrations;
pub mod pool;
