use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::events::ServerEvent;

/// Outbound queue handle for one connection. The transport drains the
/// receiving end and owns serialization to the wire.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Fanout scope for broadcasts. The server runs exactly one room today,
/// but routing is written against this type so more rooms slot in without
/// touching the per-event logic.
///
/// Sends are fire-and-forget: a client with a closed channel is logged and
/// skipped, never waited on.
#[derive(Debug, Default)]
pub struct Room {
    members: HashMap<Uuid, EventSender>,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: Uuid, sender: EventSender) {
        self.members.insert(id, sender);
        info!("Attached connection {} to room", id);
    }

    pub fn detach(&mut self, id: &Uuid) -> bool {
        let detached = self.members.remove(id).is_some();
        if detached {
            info!("Detached connection {} from room", id);
        }
        detached
    }

    /// Deliver an event to every member, optionally excluding one
    /// connection (the typing-indicator case).
    pub fn broadcast(&self, event: &ServerEvent, exclude_id: Option<Uuid>) {
        for (id, sender) in self.members.iter() {
            if let Some(exclude) = exclude_id {
                if *id == exclude {
                    continue;
                }
            }

            if let Err(e) = sender.send(event.clone()) {
                warn!("Failed to broadcast to connection {}: {}", id, e);
            }
        }
    }

    /// Deliver an event to a single member.
    pub fn send_to(&self, id: &Uuid, event: ServerEvent) {
        match self.members.get(id) {
            Some(sender) => {
                if let Err(e) = sender.send(event) {
                    warn!("Failed to send to connection {}: {}", id, e);
                }
            }
            None => warn!("Dropping event for unknown connection {}", id),
        }
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.members.contains_key(id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_room_fanout() {
        let mut room = Room::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        let id1 = Uuid::new_v4();
        let id2 = Uuid::new_v4();

        room.attach(id1, tx1);
        room.attach(id2, tx2);
        assert_eq!(room.member_count(), 2);

        // Broadcast reaches everyone
        room.broadcast(&ServerEvent::SystemError("test".to_string()), None);
        assert_eq!(
            rx1.try_recv().unwrap(),
            ServerEvent::SystemError("test".to_string())
        );
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerEvent::SystemError("test".to_string())
        );

        // Excluded member is skipped
        room.broadcast(&ServerEvent::SystemError("again".to_string()), Some(id1));
        assert!(rx1.try_recv().is_err());
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerEvent::SystemError("again".to_string())
        );

        // Targeted send
        room.send_to(&id1, ServerEvent::UserLeft(id2));
        assert_eq!(rx1.try_recv().unwrap(), ServerEvent::UserLeft(id2));
        assert!(rx2.try_recv().is_err());

        // Detach removes the member
        assert!(room.contains(&id1));
        assert!(room.detach(&id1));
        assert!(!room.detach(&id1));
        assert!(!room.contains(&id1));
        assert_eq!(room.member_count(), 1);
    }

    #[test]
    fn test_broadcast_survives_closed_channel() {
        let mut room = Room::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        room.attach(Uuid::new_v4(), tx1);
        room.attach(Uuid::new_v4(), tx2);
        drop(rx1);

        room.broadcast(&ServerEvent::SystemError("still here".to_string()), None);
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerEvent::SystemError("still here".to_string())
        );
    }
}
