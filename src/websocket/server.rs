use std::sync::Arc;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info};

use crate::chat::EventRouter;
use crate::error::WebSocketError;
use crate::websocket::Connection;

/// Accepts WebSocket connections and pumps frames between each socket and
/// the event router.
pub struct ChatServer {
    router: Arc<EventRouter>,
}

impl ChatServer {
    pub fn new(router: Arc<EventRouter>) -> Self {
        Self { router }
    }

    /// Accept loop; one task per connection.
    pub async fn run(self: Arc<Self>, listener: TcpListener) {
        while let Ok((stream, addr)) = listener.accept().await {
            let server = self.clone();
            tokio::spawn(async move {
                server.handle_connection(stream, addr).await;
            });
        }
    }

    pub async fn handle_connection(
        self: Arc<Self>,
        raw_stream: tokio::net::TcpStream,
        addr: std::net::SocketAddr,
    ) {
        info!("New WebSocket connection from: {}", addr);

        let ws_stream = match tokio_tungstenite::accept_async(raw_stream).await {
            Ok(ws) => ws,
            Err(e) => {
                error!("Error during WebSocket handshake: {}", e);
                return;
            }
        };

        let (ws_sink, ws_stream) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut connection = Connection::new(self.router.clone());
        let connection_id = connection.id();

        // Attach the outbound queue before any event can be dispatched
        self.router.connect(connection_id, tx).await;
        let router = self.router.clone();

        // Serialize queued events onto the socket
        let send_task = tokio::spawn(async move {
            let mut ws_sink = ws_sink;
            let mut rx = rx;

            while let Some(event) = rx.recv().await {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("Failed to serialize server event: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sink.send(Message::Text(text)).await {
                    error!(
                        "Connection {}: {}",
                        connection_id,
                        WebSocketError::SendError(e.to_string())
                    );
                    break;
                }
            }

            if let Err(e) = ws_sink.close().await {
                error!("Error closing WebSocket connection: {}", e);
            }
        });

        // Feed incoming frames to the connection driver
        let receive_task = tokio::spawn(async move {
            let mut ws_stream = ws_stream;

            while let Some(message) = ws_stream.next().await {
                match message {
                    Ok(msg) => {
                        if let Err(e) = connection.handle_message(msg).await {
                            info!("Connection {} terminating: {}", connection_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error receiving WebSocket message: {}", e);
                        break;
                    }
                }
            }
        });

        // Wait for either task to complete
        tokio::select! {
            _ = send_task => {
                info!("Send task completed for connection {}", connection_id);
            }
            _ = receive_task => {
                info!("Receive task completed for connection {}", connection_id);
            }
        }

        // Announce the departure and drop the outbound queue
        router.disconnect(connection_id).await;
        info!("Connection {} closed", connection_id);
    }

    pub fn router(&self) -> Arc<EventRouter> {
        self.router.clone()
    }
}
