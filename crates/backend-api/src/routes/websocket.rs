use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, error, warn};

use crate::hub::{InboundEvent, Subscription};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/ws",
    tag = "Realtime",
    responses(
        (status = 101, description = "Switching to the realtime event stream")
    )
)]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let Subscription { id, mut events } = if state.replay_history_on_connect() {
        state.hub().connect_with_history().await
    } else {
        state.hub().connect().await
    };

    let (mut ws_sender, mut receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let json = match serde_json::to_string(event.as_ref()) {
                Ok(json) => json,
                Err(e) => {
                    error!(connection_id = %id, error = %e, "failed to encode outbound event");
                    continue;
                }
            };

            if let Err(e) = ws_sender.send(Message::Text(json)).await {
                debug!(connection_id = %id, error = %e, "websocket send failed, stopping writer");
                break;
            }
        }
    });

    // Frames from one client are handled strictly in arrival order.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<InboundEvent>(&text) {
                Ok(InboundEvent::Message(payload)) => {
                    state.hub().on_chat_message(id, payload).await;
                }
                Err(e) => {
                    warn!(connection_id = %id, error = %e, "ignoring unrecognised client frame");
                }
            },
            Ok(Message::Close(_)) => {
                debug!(connection_id = %id, "client closed websocket");
                break;
            }
            Err(e) => {
                warn!(connection_id = %id, error = %e, "websocket transport error");
                break;
            }
            _ => {}
        }
    }

    state.hub().disconnect(id).await;
    writer.abort();
}
