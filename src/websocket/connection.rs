use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::{ClientEvent, ConnectionState, EventRouter};
use crate::error::{AppError, WebSocketError};

/// Transport-side driver for one client connection. Owns the connection
/// identity and the per-connection lifecycle state checked by the router
/// before every mutation.
pub struct Connection {
    id: Uuid,
    state: ConnectionState,
    router: Arc<EventRouter>,
}

impl Connection {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ConnectionState::Connected,
            router,
        }
    }

    /// Process one frame off the socket. An `Err` tells the caller to stop
    /// reading and tear the connection down.
    pub async fn handle_message(&mut self, msg: Message) -> Result<(), AppError> {
        match msg {
            Message::Text(text) => {
                let event: ClientEvent = serde_json::from_str(&text).map_err(|e| {
                    WebSocketError::InvalidFormat(format!("Invalid event format: {}", e))
                })?;

                if let Err(e) = self.router.dispatch(self.id, &mut self.state, event).await {
                    // Hard rejection (empty username); the router already
                    // queued the error notice for the client.
                    info!("Closing connection {}: {}", self.id, e);
                    self.state = ConnectionState::Closed;
                    return Err(e.into());
                }
            }
            Message::Close(_) => {
                info!("Client initiated close for connection {}", self.id);
                self.state = ConnectionState::Closed;
                return Err(WebSocketError::ConnectionError(
                    "Connection closed by client".to_string(),
                )
                .into());
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Protocol-level keepalive is answered by tungstenite itself
            }
            _ => {
                warn!("Received unsupported message type on connection {}", self.id);
            }
        }
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }
}
