use std::sync::Arc;

use anyhow::{Context, Result};
use mercado_config::AppConfig;
use mercado_database::{
    initialize_database, CatalogStore, MessageRepository, MessageStore, ProductRepository,
};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// `RUST_LOG` wins; otherwise `info`.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub catalog: Arc<dyn CatalogStore>,
    pub messages: Arc<dyn MessageStore>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let catalog: Arc<dyn CatalogStore> = Arc::new(ProductRepository::new(db_pool.clone()));
        let messages: Arc<dyn MessageStore> = Arc::new(MessageRepository::new(db_pool.clone()));

        info!(url = %config.database.url, "catalog and message stores ready");

        Ok(Self {
            db_pool,
            catalog,
            messages,
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
