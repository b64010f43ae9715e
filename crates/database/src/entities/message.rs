//! Chat message entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted chat message. `id` reflects insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user: String,
    pub message: String,
    /// Milliseconds since the Unix epoch; only set by the REST ingress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ChatMessage {
    /// The `{user, message}` shape chat clients send and receive.
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "user": self.user,
            "message": self.message,
        })
    }
}

/// A message about to be appended. Missing fields are rejected by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewChatMessage {
    pub user: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<i64>,
}

impl NewChatMessage {
    /// Read `user` and `message` out of an untyped chat payload.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            user: payload.get("user").and_then(scalar_text),
            message: payload.get("message").and_then(scalar_text),
            timestamp: None,
        }
    }

    pub fn stamped(user: Option<String>, message: Option<String>) -> Self {
        Self {
            user,
            message,
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
        }
    }
}

// Scalars are coerced to text; objects, arrays and null count as missing.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
