//! API route definitions

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};

use super::shared::SharedStateHandle;
use super::types::*;
use crate::protocol::ServerEvent;

/// Embedded browser viewer HTML
const VIEWER_HTML: &str = include_str!("viewer.html");

/// Create the API router with all endpoints
pub fn create_router(state: SharedStateHandle) -> Router {
    Router::new()
        // Viewer at root
        .route("/", get(|| async { Html(VIEWER_HTML) }))
        // Status endpoint
        .route("/api/status", get(status_handler))
        // Button configuration
        .route("/api/button/config", get(get_button_configs))
        .route("/api/button/config", post(update_button_config))
        // WebSocket endpoint for real-time updates
        .route("/ws", get(super::websocket::ws_handler))
        // JSON 404 for everything else
        .fallback(not_found_handler)
        // Add state to all routes
        .with_state(state)
}

// ============================================================================
// Status Handlers
// ============================================================================

async fn status_handler(State(state): State<SharedStateHandle>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        buttons: state.scene.read().await.len(),
        clients: state.client_count().await,
    })
}

// ============================================================================
// Button Config Handlers
// ============================================================================

async fn get_button_configs(State(state): State<SharedStateHandle>) -> Json<ConfigListResponse> {
    let store = state.store.lock().await;
    Json(ConfigListResponse {
        status: "success",
        data: store.configs().clone(),
    })
}

async fn update_button_config(
    State(state): State<SharedStateHandle>,
    Json(req): Json<ButtonConfigRequest>,
) -> Result<Json<ConfigResponse>, (StatusCode, Json<ApiError>)> {
    if req.id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(
                "Invalid button configuration: missing id",
            )),
        ));
    }

    if req.position.is_none() {
        tracing::warn!(id = %req.id, "Missing position in button config, using default");
    }
    if req.rotation.is_none() {
        tracing::warn!(id = %req.id, "Missing rotation in button config, using default");
    }
    if req.scale.is_none() {
        tracing::warn!(id = %req.id, "Missing scale in button config, using default");
    }
    let config = req.into_config();

    {
        let mut store = state.store.lock().await;
        store.upsert(config.clone());
        if let Err(e) = store.save().await {
            tracing::error!("Error persisting button configuration: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal(e.to_string())),
            ));
        }
    }

    // Unknown ids stay out of the scene; the config is still persisted and
    // broadcast, and clients apply the same rule on their side.
    {
        let mut scene = state.scene.write().await;
        scene.apply_update(&config.id, config.transform());
    }

    tracing::info!(id = %config.id, "Received button config update");
    state.broadcast(ServerEvent::ButtonConfigUpdated(config.clone()));

    Ok(Json(ConfigResponse {
        status: "success",
        data: config,
    }))
}

// ============================================================================
// Fallback
// ============================================================================

async fn not_found_handler() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found(
            "The requested resource does not exist",
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::create_shared_state;
    use crate::protocol::Vec3Data;
    use crate::scene::{Button, Scene};
    use crate::store::ButtonStore;

    async fn test_state(dir: &tempfile::TempDir) -> SharedStateHandle {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));
        let store = ButtonStore::load(dir.path().join("button_config.json"))
            .await
            .unwrap();
        create_shared_state(scene, store)
    }

    fn request(json: &str) -> ButtonConfigRequest {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_update_rejects_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let result =
            update_button_config(State(state), Json(request(r#"{"scale":2.0}"#))).await;
        let (status, Json(err)) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, 400);
    }

    #[tokio::test]
    async fn test_update_persists_applies_and_broadcasts() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        let mut rx = state.subscribe();

        let req = request(
            r#"{"id":"exampleButton","position":{"x":1.0,"y":2.0,"z":3.0},"rotation":{"x":0.0,"y":0.0,"z":0.0},"scale":2.0}"#,
        );
        let Json(response) = update_button_config(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(response.status, "success");

        // Scene mutated in place
        let scene = state.scene.read().await;
        let button = scene.button("exampleButton").unwrap();
        assert_eq!(button.transform.position, glam::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(button.transform.scale, 2.0);
        drop(scene);

        // Persisted
        let store = state.store.lock().await;
        assert_eq!(store.get("exampleButton").unwrap().scale, 2.0);
        drop(store);

        // Exactly one broadcast
        match rx.try_recv().unwrap() {
            ServerEvent::ButtonConfigUpdated(config) => {
                assert_eq!(config.id, "exampleButton");
                assert_eq!(
                    config.position,
                    Vec3Data {
                        x: 1.0,
                        y: 2.0,
                        z: 3.0
                    }
                );
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_for_unknown_id_creates_no_button() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;

        let req = request(r#"{"id":"ghostButton","scale":2.0}"#);
        update_button_config(State(state.clone()), Json(req))
            .await
            .unwrap();

        let scene = state.scene.read().await;
        assert!(scene.button("ghostButton").is_none());
        assert_eq!(scene.len(), 1);
        drop(scene);

        // The config is still persisted for later retrieval.
        let store = state.store.lock().await;
        assert!(store.get("ghostButton").is_some());
    }
}
