use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::events::{ClientEvent, ServerEvent};
use crate::chat::log::{Message, MessageLog};
use crate::chat::registry::{Session, SessionRegistry};
use crate::chat::room::{EventSender, Room};
use crate::error::ChatError;

/// Lifecycle of one connection as seen by the router. The transport-side
/// connection driver owns the field and hands it to `dispatch`, which
/// checks it before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Socket open, no session yet.
    #[default]
    Connected,
    /// A session exists in the registry.
    Registered,
    /// Terminal; the registry entry has been removed.
    Closed,
}

#[derive(Debug, Default)]
struct RouterState {
    registry: SessionRegistry,
    log: MessageLog,
    room: Room,
}

/// The behavioral core: consumes inbound client events, mutates the
/// registry and message log, and fans out the resulting notifications.
///
/// One instance exists per server process, shared via `Arc` by every
/// connection task. A single mutex guards registry, log, and room
/// together, so each event's "mutate then notify" is atomic with respect
/// to every other event; the enqueued notifications leave the process in
/// the room members' outbound queues, outside the lock.
#[derive(Debug, Default)]
pub struct EventRouter {
    state: Mutex<RouterState>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a freshly accepted connection's outbound queue to the room.
    /// The connection starts in `ConnectionState::Connected`.
    pub async fn connect(&self, id: Uuid, sender: EventSender) {
        let mut inner = self.state.lock().await;
        inner.room.attach(id, sender);
    }

    /// Process one inbound event for a connection.
    ///
    /// An `Err` means the connection must be closed by the caller; any
    /// error notice owed to the client has already been queued. Rejections
    /// that the connection survives (unauthenticated send) return `Ok`.
    pub async fn dispatch(
        &self,
        id: Uuid,
        state: &mut ConnectionState,
        event: ClientEvent,
    ) -> Result<(), ChatError> {
        if *state == ConnectionState::Closed {
            warn!("Dropping event from closed connection {}", id);
            return Ok(());
        }

        let mut inner = self.state.lock().await;
        // The driver-owned state cannot see a teardown that raced past it
        // on another task; the room membership is the authoritative check.
        // A frame arriving after disconnect must not revive any state.
        if !inner.room.contains(&id) {
            warn!("Dropping event from detached connection {}", id);
            return Ok(());
        }

        match event {
            ClientEvent::RegisterUser(username) => {
                // Re-registration on a live connection silently overwrites
                // the existing session and re-announces the join.
                let session = match inner.registry.register(id, &username) {
                    Ok(session) => session,
                    Err(e) => {
                        inner.room.send_to(&id, ServerEvent::SystemError(e.to_string()));
                        return Err(e);
                    }
                };
                *state = ConnectionState::Registered;

                let history = inner.log.all().to_vec();
                inner.room.send_to(
                    &id,
                    ServerEvent::UserRegistered {
                        user_id: id,
                        messages: history,
                    },
                );
                // The joiner is included so its UI confirms the join
                // through the same channel as everyone else.
                inner.room.broadcast(
                    &ServerEvent::UserJoined {
                        id,
                        username: session.username,
                    },
                    None,
                );
                let snapshot = inner.registry.snapshot();
                inner.room.broadcast(&ServerEvent::ActiveUsers(snapshot), None);
                Ok(())
            }
            ClientEvent::SendMessage { content } => {
                let sender = match self.session_if_registered(&inner, id, *state) {
                    Some(session) => session,
                    None => {
                        warn!("Unauthenticated send_message on connection {}", id);
                        inner.room.send_to(
                            &id,
                            ServerEvent::SystemError(ChatError::Unauthenticated.to_string()),
                        );
                        return Ok(());
                    }
                };

                let message = Message::new(&sender, content);
                inner.log.append(message.clone());
                inner.room.broadcast(&ServerEvent::NewMessage(message), None);
                // Sending a message implies the author stopped typing.
                inner.room.broadcast(
                    &ServerEvent::TypingStatus {
                        user_id: id,
                        username: None,
                        is_typing: false,
                    },
                    None,
                );
                Ok(())
            }
            ClientEvent::TypingStart | ClientEvent::TypingStop => {
                // Typing before registration is dropped without an error
                // notice, unlike send_message.
                let sender = match self.session_if_registered(&inner, id, *state) {
                    Some(session) => session,
                    None => return Ok(()),
                };

                inner.room.broadcast(
                    &ServerEvent::TypingStatus {
                        user_id: id,
                        username: Some(sender.username),
                        is_typing: matches!(event, ClientEvent::TypingStart),
                    },
                    Some(id),
                );
                Ok(())
            }
        }
    }

    /// React to the transport's connection-closed signal. Detaches the
    /// connection and, if it had registered, announces the departure.
    /// Idempotent, so a departure is never announced twice.
    pub async fn disconnect(&self, id: Uuid) {
        let mut inner = self.state.lock().await;
        inner.room.detach(&id);

        if let Some(session) = inner.registry.remove(&id) {
            info!("User {} left (connection {})", session.username, id);
            inner.room.broadcast(&ServerEvent::UserLeft(id), None);
            let snapshot = inner.registry.snapshot();
            inner.room.broadcast(&ServerEvent::ActiveUsers(snapshot), None);
        }
    }

    fn session_if_registered(
        &self,
        inner: &RouterState,
        id: Uuid,
        state: ConnectionState,
    ) -> Option<Session> {
        if state != ConnectionState::Registered {
            return None;
        }
        inner.registry.get(&id).cloned()
    }

    /// Registered sessions in registration order.
    pub async fn active_sessions(&self) -> Vec<Session> {
        self.state.lock().await.registry.snapshot()
    }

    pub async fn history_len(&self) -> usize {
        self.state.lock().await.log.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.room.member_count()
    }
}
