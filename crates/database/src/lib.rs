//! Mercado Database Crate
//!
//! Connection management, migrations, and the SQLite implementations of the
//! catalog and message stores.

use mercado_config::DatabaseConfig;

pub use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod stores;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{MessageRepository, ProductRepository};
pub use stores::{CatalogStore, MessageStore};

pub use entities::{
    message::{ChatMessage, NewChatMessage},
    product::{NewProduct, Product},
};

pub use types::{
    errors::{CatalogError, DatabaseError, MessageError},
    CatalogResult, DatabaseResult, MessageResult,
};

/// Connect and bring the schema up to date
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
