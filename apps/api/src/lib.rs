pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod store;

use std::sync::Arc;

use auth::verifier::TokenVerifier;
use config::Config;
use gateway::broadcast::RealtimeBroadcaster;
use gateway::registry::ConnectionRegistry;
use gateway::rooms::RoomRouter;
use store::memory::MemoryStore;
use store::{CommentStore, RecipeCatalog};

/// Shared application state available to all route handlers and the gateway.
///
/// The REST path and the realtime path hold the *same* store, verifier, and
/// broadcaster instances, so both paths authorize identically and both feed
/// the same subscriber set.
#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<dyn CommentStore>,
    pub recipes: Arc<dyn RecipeCatalog>,
    pub verifier: Arc<TokenVerifier>,
    pub rooms: Arc<RoomRouter>,
    pub connections: Arc<ConnectionRegistry>,
    pub broadcast: Arc<RealtimeBroadcaster>,
}

impl AppState {
    /// Build state backed by the in-memory store.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let rooms = Arc::new(RoomRouter::new());
        let connections = Arc::new(ConnectionRegistry::new());
        let broadcast = Arc::new(RealtimeBroadcaster::new(
            rooms.clone(),
            connections.clone(),
        ));
        let verifier = Arc::new(TokenVerifier::new(&config.jwt_secret));

        Self {
            comments: store.clone(),
            recipes: store,
            verifier,
            rooms,
            connections,
            broadcast,
        }
    }
}
