//! Stagelink - Main Entry Point
//!
//! Starts the scene service: loads settings and the persisted button store,
//! seeds the scene, and serves the HTTP/WebSocket sync API.

use anyhow::Context;

use stagelink::api;
use stagelink::scene::{Button, Scene};
use stagelink::settings::ServerSettings;
use stagelink::store::{ButtonStore, StoreWatcher};
use stagelink::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = telemetry::init_logging_default()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let settings = ServerSettings::load_or_init();

    let store_path = settings.resolved_store_path();
    let store = ButtonStore::load(&store_path)
        .await
        .with_context(|| format!("Failed to load button store from {}", store_path.display()))?;
    tracing::info!(path = %store_path.display(), configs = store.len(), "Button store loaded");

    let mut scene = Scene::new();
    for seed in &settings.buttons {
        scene.spawn(Button::new(&seed.id, seed.transform()));
    }
    // Persisted configs win over seed defaults; unknown ids stay ignored.
    for config in store.configs().values() {
        scene.apply_update(&config.id, config.transform());
    }
    tracing::info!(buttons = scene.len(), "Scene initialized");

    let state = api::create_shared_state(scene, store);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    if settings.watch_store {
        match StoreWatcher::new(&store_path) {
            Ok(watcher) => {
                tokio::spawn(api::run_store_watcher(
                    state.clone(),
                    watcher,
                    shutdown_rx.clone(),
                ));
            }
            Err(e) => tracing::warn!("Store watcher disabled: {}", e),
        }
    }

    api::run_server(settings.api_port, state, shutdown_rx)
        .await
        .context("API server failed")?;

    Ok(())
}
