pub mod broadcast;
pub mod registry;
pub mod rooms;
pub mod server;

/// Ephemeral handle identifying one realtime connection (`conn_` prefixed
/// ULID). Issued at accept time, forgotten at disconnect.
pub type ConnectionId = String;
