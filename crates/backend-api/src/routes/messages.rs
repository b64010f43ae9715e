use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use mercado_database::{ChatMessage, NewChatMessage};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::{routes::products::ConfirmationResponse, ApiError, AppState};

const SAVE_FAILED: &str = "Failed to save message";

/// Documented shape of `POST /api/messages`. The handler reads the body
/// loosely so that a bad field surfaces as a save failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateMessageRequest {
    pub user: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub user: String,
    pub message: String,
    /// Milliseconds since the Unix epoch, present for REST-created messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            user: message.user,
            message: message.message,
            timestamp: message.timestamp,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Every stored chat message in storage order", body = [MessageResponse]),
        (status = 500, description = "Message store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = state.messages().list_all().await.map_err(|error| {
        error!(error = ?error, "failed to fetch messages");
        ApiError::internal_server_error("Internal server error")
    })?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Stores a message with a server timestamp. Unlike the socket path this
/// never broadcasts.
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = ConfirmationResponse),
        (status = 500, description = "Message could not be stored", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ConfirmationResponse>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        error!(error = %rejection, "unreadable message body");
        ApiError::internal_server_error(SAVE_FAILED)
    })?;

    let draft = NewChatMessage::from_payload(&body);
    let message = NewChatMessage::stamped(draft.user, draft.message);

    state.messages().append(message).await.map_err(|error| {
        error!(error = ?error, "failed to save message");
        ApiError::internal_server_error(SAVE_FAILED)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ConfirmationResponse {
            message: "Message saved successfully".to_string(),
        }),
    ))
}
