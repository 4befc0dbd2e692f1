//! Best-effort fanout of comment events to room subscribers.

use std::sync::Arc;

use ladle_common::{Comment, ServerMessage};

use super::registry::ConnectionRegistry;
use super::rooms::RoomRouter;

/// A comment mutation to announce to a room, before it has been stamped with
/// a room id and sequence number.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    Created(Comment),
    Updated(Comment),
    Deleted { comment_id: String },
}

impl RoomEvent {
    fn into_message(self, room_id: &str, seq: u64) -> ServerMessage {
        match self {
            RoomEvent::Created(comment) => ServerMessage::Created {
                room_id: room_id.to_string(),
                seq,
                comment,
            },
            RoomEvent::Updated(comment) => ServerMessage::Updated {
                room_id: room_id.to_string(),
                seq,
                comment,
            },
            RoomEvent::Deleted { comment_id } => ServerMessage::Deleted {
                room_id: room_id.to_string(),
                seq,
                comment_id,
            },
        }
    }
}

/// Pushes events to every current member of a room. Shared through `AppState`
/// by the gateway and the REST routes, so REST mutations reach realtime
/// subscribers too.
pub struct RealtimeBroadcaster {
    rooms: Arc<RoomRouter>,
    connections: Arc<ConnectionRegistry>,
}

impl RealtimeBroadcaster {
    pub fn new(rooms: Arc<RoomRouter>, connections: Arc<ConnectionRegistry>) -> Self {
        Self { rooms, connections }
    }

    /// Deliver `event` to every member of the room at the instant of publish.
    ///
    /// Delivery is non-blocking per member: enqueueing to a connection that
    /// has gone away fails for that member alone, is logged, and is never
    /// retried. The underlying mutation already succeeded, and a retry could
    /// double-deliver to the others. Publishes that complete before the next
    /// one starts are observed in order by every member (room-scoped FIFO).
    pub fn publish(&self, room_id: &str, event: RoomEvent) {
        let Some((seq, members)) = self.rooms.next_publish(room_id) else {
            tracing::debug!(room_id, "no subscribers for published event");
            return;
        };

        let msg = Arc::new(event.into_message(room_id, seq));
        for conn_id in members {
            if !self.connections.send_to(&conn_id, msg.clone()) {
                tracing::warn!(
                    %conn_id,
                    room_id,
                    seq,
                    "dropping event for unreachable connection"
                );
            }
        }
    }
}
