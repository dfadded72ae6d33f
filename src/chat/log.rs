use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::registry::Session;

/// Identifier of the single implicit room all messages belong to.
pub const ROOM_ID: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
}

/// A chat message as broadcast to clients. Immutable once appended to the
/// log; the sender's identity is copied in at send time, so later
/// disconnects do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: Uuid,
    pub chat_id: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub status: DeliveryStatus,
}

impl Message {
    /// Build a text message from the sender's current session. The content
    /// is taken as-is; no emptiness or size validation happens here.
    pub fn new(sender: &Session, content: String) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            chat_id: ROOM_ID.to_string(),
            sender_id: sender.id,
            sender_name: sender.username.clone(),
            content,
            kind: MessageKind::Text,
            timestamp: Utc::now(),
            status: DeliveryStatus::Delivered,
        }
    }
}

/// Append-only, in-memory message history for the room. Unbounded by
/// design; everything is lost on process restart.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Full history in append order. Replayed to each newly registered
    /// client.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
