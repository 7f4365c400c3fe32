//! Axum server setup and startup

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::{Any, CorsLayer};

use super::routes::create_router;
use super::shared::{SharedState, SharedStateHandle};
use crate::protocol::ServerEvent;
use crate::scene::Scene;
use crate::store::{ButtonStore, StoreWatcher};

/// Run the API server on the specified port with shared state
///
/// This function is intended to be run on a tokio runtime.
/// It will block until the server is shut down or the shutdown signal is received.
pub async fn run_server(
    port: u16,
    shared_state: SharedStateHandle,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    // Enable CORS for cross-origin requests against /api
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(shared_state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        // Wait for shutdown signal
        let _ = shutdown_rx.changed().await;
        log::info!("API server shutting down gracefully");
    })
    .await
}

/// Create a new shared state around the scene and its store
pub fn create_shared_state(scene: Scene, store: ButtonStore) -> SharedStateHandle {
    Arc::new(SharedState::new(scene, store))
}

/// Drive the store watcher until shutdown.
///
/// External edits to the store file are reloaded, applied to the scene
/// (unknown ids stay ignored) and broadcast to connected clients.
pub async fn run_store_watcher(
    state: SharedStateHandle,
    mut watcher: StoreWatcher,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    let mut tick = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                if !watcher.poll() {
                    continue;
                }
                let changed = {
                    let mut store = state.store.lock().await;
                    match store.reload().await {
                        Ok(changed) => changed,
                        Err(e) => {
                            tracing::warn!("Failed to reload button store: {}", e);
                            continue;
                        }
                    }
                };
                if changed.is_empty() {
                    continue;
                }
                tracing::info!(count = changed.len(), "Button store changed on disk, rebroadcasting");
                let mut scene = state.scene.write().await;
                for config in changed {
                    scene.apply_update(&config.id, config.transform());
                    state.broadcast(ServerEvent::ButtonConfigUpdated(config));
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}
