use std::sync::Arc;

use ott_db::Datastore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the datastore holds `Arc`ed repositories.
#[derive(Clone)]
pub struct AppState {
    /// Repositories for every entity, Postgres or in-memory.
    pub datastore: Datastore,
    pub config: Arc<ServerConfig>,
}
