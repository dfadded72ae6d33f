use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::log::Message;
use crate::chat::registry::Session;

/// Events a client may send over its connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEvent {
    /// Must be the first event on a connection; payload is the display name.
    #[serde(rename = "register_user")]
    RegisterUser(String),
    #[serde(rename = "send_message")]
    SendMessage { content: String },
    #[serde(rename = "typing_start")]
    TypingStart,
    #[serde(rename = "typing_stop")]
    TypingStop,
}

/// Events the server fans out to one or more clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    /// Sent to the registering client only, with the full room history.
    #[serde(rename = "user_registered", rename_all = "camelCase")]
    UserRegistered { user_id: Uuid, messages: Vec<Message> },
    #[serde(rename = "user_joined")]
    UserJoined { id: Uuid, username: String },
    /// Current sessions in registration order.
    #[serde(rename = "active_users")]
    ActiveUsers(Vec<Session>),
    #[serde(rename = "new_message")]
    NewMessage(Message),
    /// `username` is omitted from the auto-stop broadcast after a message.
    #[serde(rename = "typing_status", rename_all = "camelCase")]
    TypingStatus {
        user_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        is_typing: bool,
    },
    /// Bare connection identity of the departed user.
    #[serde(rename = "user_left")]
    UserLeft(Uuid),
    #[serde(rename = "system_error")]
    SystemError(String),
}
