use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ChatError;

/// Presence state of a registered user. Only `Online` is produced today;
/// the enum leaves room for away/busy states later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
}

/// The registered identity bound to a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub status: UserStatus,
}

impl Session {
    pub fn new(id: Uuid, username: String) -> Self {
        Self {
            id,
            username,
            status: UserStatus::Online,
        }
    }
}

/// Authoritative mapping of connection identity to registered user.
///
/// At most one session per connection; usernames are not required to be
/// unique. Snapshots come back in registration order so broadcasts of the
/// user list are reproducible.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
    order: Vec<Uuid>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user on a connection. An empty or whitespace-only
    /// username is rejected. Registering twice on the same connection
    /// overwrites the prior session.
    pub fn register(&mut self, id: Uuid, username: &str) -> Result<Session, ChatError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ChatError::InvalidInput("Username is required".to_string()));
        }

        let session = Session::new(id, username.to_string());
        if self.sessions.insert(id, session.clone()).is_none() {
            self.order.push(id);
        }
        info!("Registered user {} on connection {}", session.username, id);
        Ok(session)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Remove and return the session for a connection, if one exists.
    pub fn remove(&mut self, id: &Uuid) -> Option<Session> {
        let removed = self.sessions.remove(id);
        if removed.is_some() {
            self.order.retain(|other| other != id);
        }
        removed
    }

    /// All currently registered sessions, in registration order.
    pub fn snapshot(&self) -> Vec<Session> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
