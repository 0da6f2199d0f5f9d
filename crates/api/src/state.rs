use std::sync::Arc;

use altar_db::identity::PgIdentityDirectory;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: altar_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Identity directory used for the whole-base activity snapshot.
    pub identity: Arc<PgIdentityDirectory>,
}

impl AppState {
    pub fn new(pool: altar_db::DbPool, config: ServerConfig) -> Self {
        let identity = Arc::new(PgIdentityDirectory::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            identity,
        }
    }
}
