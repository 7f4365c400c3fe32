//! Shared state between API handlers and the scene
//!
//! API handlers and WebSocket connections all operate on one `SharedState`:
//! the authoritative scene, the persisted button store, and the broadcast
//! channel fanning events out to connected clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

use crate::protocol::ServerEvent;
use crate::scene::Scene;
use crate::store::ButtonStore;

/// Information about a connected WebSocket client
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client id assigned at upgrade time
    pub id: Uuid,
    /// Remote address
    pub addr: SocketAddr,
}

/// Shared state accessible by API handlers
pub struct SharedState {
    /// Authoritative scene
    pub scene: RwLock<Scene>,
    /// Persisted button configs
    pub store: Mutex<ButtonStore>,
    /// Broadcast channel for WebSocket events
    ws_tx: broadcast::Sender<ServerEvent>,
    /// Connected clients by id
    clients: RwLock<HashMap<Uuid, ClientInfo>>,
}

impl SharedState {
    /// Create shared state around a scene and its store
    pub fn new(scene: Scene, store: ButtonStore) -> Self {
        // Create broadcast channel with capacity for 64 events
        let (ws_tx, _) = broadcast::channel(64);
        Self {
            scene: RwLock::new(scene),
            store: Mutex::new(store),
            ws_tx,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to server events
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.ws_tx.subscribe()
    }

    /// Broadcast an event to all connected clients
    pub fn broadcast(&self, event: ServerEvent) {
        // Ignore send errors (no subscribers is fine)
        let _ = self.ws_tx.send(event);
    }

    /// Register a connected client
    pub async fn register_client(&self, info: ClientInfo) {
        self.clients.write().await.insert(info.id, info);
    }

    /// Remove a client after disconnect
    pub async fn unregister_client(&self, id: &Uuid) {
        self.clients.write().await.remove(id);
    }

    /// Get the number of connected clients
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

/// Type alias for the shared state handle used by API handlers
pub type SharedStateHandle = Arc<SharedState>;
