//! Narrow store contracts consumed by the HTTP surface and the broadcast hub.

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{ChatMessage, NewChatMessage, Product};
use crate::types::{CatalogResult, MessageResult};

/// Product persistence.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist caller-supplied fields and return the record with its assigned id.
    async fn create(&self, fields: Value) -> CatalogResult<Product>;

    /// Remove a product. `Ok(false)` when no record had that id.
    async fn delete(&self, id: i64) -> CatalogResult<bool>;

    async fn find(&self, id: i64) -> CatalogResult<Option<Product>>;

    async fn list(&self) -> CatalogResult<Vec<Product>>;
}

/// Append-only chat history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: NewChatMessage) -> MessageResult<ChatMessage>;

    /// Every stored message in insertion order.
    async fn list_all(&self) -> MessageResult<Vec<ChatMessage>>;
}
