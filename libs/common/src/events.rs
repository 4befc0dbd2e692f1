//! Realtime wire contract shared by the server gateway and clients.
//!
//! Both directions are closed tagged-variant types: a payload whose `type`
//! field is not one of the known tags fails to deserialize, and the gateway
//! rejects it explicitly instead of silently dropping it.

use serde::{Deserialize, Serialize};

use crate::model::Comment;

/// A message received from a client over the realtime connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Subscribe to a recipe's room. No authentication required; reading
    /// comments is public.
    Join { room_id: String },
    /// Unsubscribe from a recipe's room.
    Leave { room_id: String },
    /// Post a comment. The bearer token travels with the event because the
    /// connection outlives the token; trust is re-derived per message.
    Post {
        room_id: String,
        token: String,
        body: String,
    },
}

/// A message pushed from the server to a client.
///
/// `seq` is a room-scoped counter assigned at publish time. It exists only so
/// a receiver can spot duplicate or out-of-order delivery within its current
/// session; there is no replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Created {
        room_id: String,
        seq: u64,
        comment: Comment,
    },
    Updated {
        room_id: String,
        seq: u64,
        comment: Comment,
    },
    Deleted {
        room_id: String,
        seq: u64,
        comment_id: String,
    },
    /// Credential rejected. Sent to the offending connection only, never
    /// broadcast.
    AuthError { reason: String },
    /// Any other per-connection failure (validation, unknown recipe,
    /// unrecognized message).
    Error { code: String, message: String },
}

impl ServerMessage {
    /// The room this message belongs to, if it is a room broadcast.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            ServerMessage::Created { room_id, .. }
            | ServerMessage::Updated { room_id, .. }
            | ServerMessage::Deleted { room_id, .. } => Some(room_id),
            ServerMessage::AuthError { .. } | ServerMessage::Error { .. } => None,
        }
    }

    /// The room sequence number, if it is a room broadcast.
    pub fn seq(&self) -> Option<u64> {
        match self {
            ServerMessage::Created { seq, .. }
            | ServerMessage::Updated { seq, .. }
            | ServerMessage::Deleted { seq, .. } => Some(*seq),
            ServerMessage::AuthError { .. } | ServerMessage::Error { .. } => None,
        }
    }
}
