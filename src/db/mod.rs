mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::gateway::GatewayRegistry;
use crate::payments::StatusSource;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and the injected
/// collaborators of the return flow.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Generic checkout URL, the redirect target of last resort.
    pub checkout_url: String,
    /// Provider status endpoint (real client in production, scripted double
    /// in tests).
    pub status_source: Arc<dyn StatusSource>,
    /// Read-only registry of payment gateways.
    pub gateways: Arc<GatewayRegistry>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
