//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Catalog store errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Corrupt product record {id}: {reason}")]
    CorruptRecord { id: i64, reason: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Message store errors
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(error: sqlx::Error) -> Self {
        CatalogError::DatabaseError(error.to_string())
    }
}

impl From<sqlx::Error> for MessageError {
    fn from(error: sqlx::Error) -> Self {
        MessageError::DatabaseError(error.to_string())
    }
}
