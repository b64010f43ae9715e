//! Process-wide fan-out of realtime events to every live WebSocket connection.
//!
//! The hub is the single owner of the live set. Registration, removal and
//! fan-out all take the same lock, so a broadcast reaches exactly the
//! connections that were registered when it started. Each connection drains
//! its own bounded queue from a writer task; fan-out never waits on a socket.

use std::collections::HashMap;
use std::sync::Arc;

use mercado_database::{MessageStore, NewChatMessage, Product};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Server → client frames, encoded as `{"event": <name>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    /// Chat messages. A live chat message is always a one-element array
    /// holding the sender's payload verbatim.
    #[serde(rename = "message")]
    Message(Vec<Value>),
    #[serde(rename = "realtimeProductUpdate")]
    ProductUpdate(Product),
    #[serde(rename = "realtimeProductRemoval")]
    ProductRemoval(i64),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Message(_) => "message",
            OutboundEvent::ProductUpdate(_) => "realtimeProductUpdate",
            OutboundEvent::ProductRemoval(_) => "realtimeProductRemoval",
        }
    }
}

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    /// A chat message, `{user, message}` by convention but not enforced here.
    #[serde(rename = "message")]
    Message(Value),
}

/// Handle returned to a newly registered connection.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub events: mpsc::Receiver<Arc<OutboundEvent>>,
}

#[derive(Clone)]
pub struct BroadcastHub {
    connections: Arc<Mutex<HashMap<ConnectionId, mpsc::Sender<Arc<OutboundEvent>>>>>,
    messages: Arc<dyn MessageStore>,
    outbound_buffer: usize,
}

impl BroadcastHub {
    pub fn new(messages: Arc<dyn MessageStore>, outbound_buffer: usize) -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            messages,
            outbound_buffer: outbound_buffer.max(1),
        }
    }

    /// Register a new connection. It receives every broadcast issued from now on.
    pub async fn connect(&self) -> Subscription {
        self.register(None).await
    }

    /// Register a new connection whose queue starts with the stored chat
    /// history as one `message` event, ahead of any later broadcast. A
    /// history that cannot be loaded is logged and skipped.
    pub async fn connect_with_history(&self) -> Subscription {
        let backlog = match self.messages.list_all().await {
            Ok(history) => {
                let payloads = history.iter().map(|message| message.to_payload()).collect();
                Some(OutboundEvent::Message(payloads))
            }
            Err(error) => {
                error!(error = ?error, "failed to load chat history");
                None
            }
        };

        self.register(backlog).await
    }

    async fn register(&self, backlog: Option<OutboundEvent>) -> Subscription {
        let id = Uuid::new_v4();
        let (sender, events) = mpsc::channel(self.outbound_buffer);

        if let Some(event) = backlog {
            Self::enqueue(&id, &sender, Arc::new(event));
        }

        let mut connections = self.connections.lock().await;
        connections.insert(id, sender);
        info!(connection_id = %id, live = connections.len(), "realtime client connected");

        Subscription { id, events }
    }

    /// Remove a connection from the live set. Unknown ids are a no-op.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(&id).is_some();
        if removed {
            info!(connection_id = %id, live = connections.len(), "realtime client disconnected");
        } else {
            debug!(connection_id = %id, "disconnect for unknown connection ignored");
        }
        removed
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Persist an inbound chat message and echo it to every connection,
    /// the sender included. Persistence failures are logged and the message
    /// is dropped; the sender is not told either way.
    pub async fn on_chat_message(&self, from: ConnectionId, payload: Value) {
        let draft = NewChatMessage::from_payload(&payload);

        match self.messages.append(draft).await {
            Ok(stored) => {
                debug!(connection_id = %from, message_id = stored.id, "chat message stored");
                self.broadcast(OutboundEvent::Message(vec![payload])).await;
            }
            Err(error) => {
                error!(connection_id = %from, error = ?error, "failed to save chat message");
            }
        }
    }

    pub async fn broadcast_product_added(&self, product: &Product) -> usize {
        self.broadcast(OutboundEvent::ProductUpdate(product.clone())).await
    }

    pub async fn broadcast_product_removed(&self, product_id: i64) -> usize {
        self.broadcast(OutboundEvent::ProductRemoval(product_id)).await
    }

    /// Queue an event for every live connection. Returns how many accepted it.
    async fn broadcast(&self, event: OutboundEvent) -> usize {
        let name = event.name();
        let event = Arc::new(event);

        let connections = self.connections.lock().await;
        let delivered = connections
            .iter()
            .filter(|(id, sender)| Self::enqueue(id, sender, Arc::clone(&event)))
            .count();

        debug!(event = name, delivered, live = connections.len(), "broadcast event");
        delivered
    }

    fn enqueue(
        id: &ConnectionId,
        sender: &mpsc::Sender<Arc<OutboundEvent>>,
        event: Arc<OutboundEvent>,
    ) -> bool {
        match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(connection_id = %id, event = event.name(), "outbound queue full, dropping event");
                false
            }
            Err(TrySendError::Closed(event)) => {
                debug!(connection_id = %id, event = event.name(), "connection closing, event skipped");
                false
            }
        }
    }
}
