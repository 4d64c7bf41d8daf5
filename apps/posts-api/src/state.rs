//! Shared application state.

use mongodb::{Client, Database};

/// Cloned into each router; both handles share the driver's connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
