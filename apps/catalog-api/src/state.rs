//! Application state management.
//!
//! The state is built once at startup and handed to the route builders and
//! the readiness check. It holds the configuration and whichever store the
//! `CATALOG_STORAGE` setting selected.

use database::postgres::DatabaseConnection;
use domain_catalog::InMemoryCatalog;

/// Backing store for categories and products.
#[derive(Clone)]
pub enum Storage {
    /// PostgreSQL connection pool
    Postgres(DatabaseConnection),
    /// Process-local store shared by both services
    Memory(InMemoryCatalog),
}

/// Shared application state.
///
/// Cloning is cheap: the connection pool and the in-memory tables are both
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    pub storage: Storage,
}
