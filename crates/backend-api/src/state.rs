use std::path::{Path, PathBuf};
use std::sync::Arc;

use mercado_config::AppConfig;
use mercado_database::{
    CatalogStore, MessageRepository, MessageStore, ProductRepository, SqlitePool,
};

use crate::hub::BroadcastHub;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn CatalogStore>,
    messages: Arc<dyn MessageStore>,
    hub: BroadcastHub,
    replay_history_on_connect: bool,
    public_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        messages: Arc<dyn MessageStore>,
        config: &AppConfig,
    ) -> Self {
        let hub = BroadcastHub::new(Arc::clone(&messages), config.realtime.outbound_buffer);
        Self {
            catalog,
            messages,
            hub,
            replay_history_on_connect: config.realtime.replay_history_on_connect,
            public_dir: PathBuf::from(&config.uploads.public_dir),
            uploads_dir: PathBuf::from(&config.uploads.uploads_dir),
        }
    }

    /// State backed by the SQLite repositories.
    pub fn from_pool(pool: SqlitePool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ProductRepository::new(pool.clone())),
            Arc::new(MessageRepository::new(pool)),
            config,
        )
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn messages(&self) -> &dyn MessageStore {
        self.messages.as_ref()
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub fn replay_history_on_connect(&self) -> bool {
        self.replay_history_on_connect
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }
}
