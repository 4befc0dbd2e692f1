//! Registry of live connections and their outbound queues.

use std::sync::Arc;

use dashmap::DashMap;
use ladle_common::ServerMessage;
use tokio::sync::mpsc;

use super::ConnectionId;

/// Maps connection handles to the sending half of their outbound channel.
///
/// The connection task owns the receiving half and drains it onto the socket;
/// everything else (the broadcaster, inbound handlers replying to their own
/// connection) enqueues here without ever blocking.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Arc<ServerMessage>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn register(&self, conn_id: ConnectionId, tx: mpsc::UnboundedSender<Arc<ServerMessage>>) {
        self.connections.insert(conn_id, tx);
    }

    pub fn unregister(&self, conn_id: &str) {
        self.connections.remove(conn_id);
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Enqueue a message for one connection. Returns `false` when the handle
    /// is unknown or its task has already gone away; the caller decides
    /// whether that is worth logging.
    pub fn send_to(&self, conn_id: &str, msg: Arc<ServerMessage>) -> bool {
        match self.connections.get(conn_id) {
            Some(tx) => tx.send(msg).is_ok(),
            None => false,
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
