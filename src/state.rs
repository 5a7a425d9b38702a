use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::FileStore;

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub store: FileStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        let store = FileStore::new(config.storage.upload_dir.clone());
        Self {
            pool,
            config: Arc::new(config),
            store,
        }
    }
}
