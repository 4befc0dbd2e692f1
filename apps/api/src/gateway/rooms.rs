//! Room membership routing.
//!
//! A room is the set of connections currently watching one recipe. Rooms are
//! pure in-memory routing state: created on first join, dropped when the last
//! member leaves, rebuildable from live connections. Dropping a room also
//! drops its sequence counter, so a recreated room restarts numbering at 1.

use std::collections::HashSet;

use dashmap::DashMap;
use parking_lot::Mutex;

use super::ConnectionId;

#[derive(Debug, Default)]
struct RoomEntry {
    members: HashSet<ConnectionId>,
    next_seq: u64,
}

/// Maps recipe ids to their current subscriber sets.
///
/// Uses `DashMap` for shard-level concurrency and a `parking_lot::Mutex` per
/// entry so sequence assignment and the membership snapshot happen under one
/// lock. Owned by `AppState` rather than being a process-wide singleton.
pub struct RoomRouter {
    rooms: DashMap<String, Mutex<RoomEntry>>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Add a connection to a room. Joining twice is a no-op.
    pub fn join(&self, room_id: &str, conn_id: &str) {
        let entry = self.rooms.entry(room_id.to_string()).or_default();
        entry.lock().members.insert(conn_id.to_string());
    }

    /// Remove a connection from a room. Leaving a room it never joined is a
    /// no-op.
    pub fn leave(&self, room_id: &str, conn_id: &str) {
        let emptied = match self.rooms.get(room_id) {
            Some(entry) => {
                let mut room = entry.lock();
                room.members.remove(conn_id);
                room.members.is_empty()
            }
            None => false,
        };
        if emptied {
            // Re-check under the map entry lock; a concurrent join may have
            // repopulated the room.
            self.rooms
                .remove_if(room_id, |_, entry| entry.lock().members.is_empty());
        }
    }

    /// Remove a connection from every room it joined. Called on disconnect.
    pub fn leave_all(&self, conn_id: &str) {
        self.rooms.retain(|_, entry| {
            let mut room = entry.lock();
            room.members.remove(conn_id);
            !room.members.is_empty()
        });
    }

    /// Current members of a room. Empty for never-joined or emptied rooms.
    pub fn members_of(&self, room_id: &str) -> HashSet<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.lock().members.clone())
            .unwrap_or_default()
    }

    /// Assign the next sequence number for a room and snapshot its membership,
    /// atomically with respect to join/leave. Returns `None` when the room has
    /// no members (nothing to deliver to).
    pub fn next_publish(&self, room_id: &str) -> Option<(u64, Vec<ConnectionId>)> {
        let entry = self.rooms.get(room_id)?;
        let mut room = entry.lock();
        room.next_seq += 1;
        Some((room.next_seq, room.members.iter().cloned().collect()))
    }
}

impl Default for RoomRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_idempotent() {
        let router = RoomRouter::new();
        router.join("rcp_1", "conn_a");
        router.join("rcp_1", "conn_a");
        assert_eq!(router.members_of("rcp_1").len(), 1);
    }

    #[test]
    fn leave_unknown_room_or_member_is_a_noop() {
        let router = RoomRouter::new();
        router.leave("rcp_1", "conn_a");
        router.join("rcp_1", "conn_a");
        router.leave("rcp_1", "conn_b");
        assert_eq!(router.members_of("rcp_1").len(), 1);
    }

    #[test]
    fn members_of_unknown_room_is_empty() {
        let router = RoomRouter::new();
        assert!(router.members_of("rcp_nope").is_empty());
    }

    #[test]
    fn leave_all_clears_every_membership() {
        let router = RoomRouter::new();
        router.join("rcp_1", "conn_a");
        router.join("rcp_2", "conn_a");
        router.join("rcp_2", "conn_b");

        router.leave_all("conn_a");

        assert!(router.members_of("rcp_1").is_empty());
        assert_eq!(router.members_of("rcp_2").len(), 1);
        assert!(router.members_of("rcp_2").contains("conn_b"));
    }

    #[test]
    fn sequence_numbers_are_room_scoped_and_monotonic() {
        let router = RoomRouter::new();
        router.join("rcp_1", "conn_a");
        router.join("rcp_2", "conn_a");

        let (seq, members) = router.next_publish("rcp_1").unwrap();
        assert_eq!(seq, 1);
        assert_eq!(members, vec!["conn_a".to_string()]);
        assert_eq!(router.next_publish("rcp_1").unwrap().0, 2);

        // Independent counter per room.
        assert_eq!(router.next_publish("rcp_2").unwrap().0, 1);
    }

    #[test]
    fn emptied_room_restarts_numbering() {
        let router = RoomRouter::new();
        router.join("rcp_1", "conn_a");
        assert_eq!(router.next_publish("rcp_1").unwrap().0, 1);
        assert_eq!(router.next_publish("rcp_1").unwrap().0, 2);

        router.leave("rcp_1", "conn_a");
        assert!(router.next_publish("rcp_1").is_none());

        router.join("rcp_1", "conn_b");
        assert_eq!(router.next_publish("rcp_1").unwrap().0, 1);
    }

    #[test]
    fn publish_to_memberless_room_yields_nothing() {
        let router = RoomRouter::new();
        assert!(router.next_publish("rcp_1").is_none());
    }
}
