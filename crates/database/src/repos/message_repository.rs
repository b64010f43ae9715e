//! SQLite-backed chat history.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::entities::{ChatMessage, NewChatMessage};
use crate::stores::MessageStore;
use crate::types::{MessageError, MessageResult};

/// Repository for chat message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn message_from_row(row: SqliteRow) -> MessageResult<ChatMessage> {
        Ok(ChatMessage {
            id: row.try_get("id")?,
            user: row.try_get("author")?,
            message: row.try_get("body")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(&self, message: NewChatMessage) -> MessageResult<ChatMessage> {
        let user = message.user.ok_or(MessageError::MissingField("user"))?;
        let body = message.message.ok_or(MessageError::MissingField("message"))?;
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (author, body, timestamp, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user)
        .bind(&body)
        .bind(message.timestamp)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(message_id = id, user = %user, "stored chat message");

        Ok(ChatMessage {
            id,
            user,
            message: body,
            timestamp: message.timestamp,
        })
    }

    async fn list_all(&self) -> MessageResult<Vec<ChatMessage>> {
        let rows = sqlx::query("SELECT id, author, body, timestamp FROM messages ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::message_from_row).collect()
    }
}
