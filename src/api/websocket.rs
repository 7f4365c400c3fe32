//! WebSocket relay for real-time scene sync
//!
//! Provides the `/ws` endpoint. Each connection is a stateless pass-through:
//! inbound interaction events become broadcasts, broadcast config updates
//! stream straight out. Nothing is acknowledged and nothing is retried.

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::shared::{ClientInfo, SharedStateHandle};
use crate::protocol::{ClientEvent, SceneSnapshot, ServerEvent};

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<SharedStateHandle>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, addr, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: SharedStateHandle) {
    let client_id = Uuid::new_v4();
    state
        .register_client(ClientInfo {
            id: client_id,
            addr,
        })
        .await;
    tracing::info!(%client_id, %addr, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    // Subscribe before greeting so no broadcast slips through the gap
    let mut rx = state.subscribe();

    let greeting = ServerEvent::ConnectionResponse {
        status: "connected".to_string(),
    };
    if send_event(&mut sender, &greeting).await.is_err() {
        state.unregister_client(&client_id).await;
        return; // Client disconnected
    }

    loop {
        tokio::select! {
            // Handle incoming messages
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_text(&state, &text).await {
                            if send_event(&mut sender, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(%client_id, "WebSocket client requested close");
                        break;
                    }
                    Some(Ok(Message::Ping(_))) => {
                        // Pong is handled automatically by axum
                        tracing::trace!(%client_id, "WebSocket ping received");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%client_id, "WebSocket receive error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            // Forward broadcast events
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut sender, &event).await.is_err() {
                            break; // Client disconnected
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%client_id, skipped = n, "WebSocket client lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    state.unregister_client(&client_id).await;
    tracing::info!(%client_id, "WebSocket client disconnected");
}

/// Process one inbound text frame.
///
/// The returned event, if any, goes straight back to the sending client;
/// anything meant for everyone goes through the broadcast channel instead.
async fn handle_client_text(state: &SharedStateHandle, text: &str) -> Option<ServerEvent> {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => handle_client_event(state, event).await,
        Err(e) => {
            tracing::warn!("Unparseable WebSocket message: {}", e);
            Some(ServerEvent::Error {
                message: format!("Invalid message: {}", e),
            })
        }
    }
}

/// Dispatch one parsed client event.
pub(crate) async fn handle_client_event(
    state: &SharedStateHandle,
    event: ClientEvent,
) -> Option<ServerEvent> {
    match event {
        ClientEvent::ButtonInteraction { button_id, kind } => {
            if button_id.is_empty() || kind.is_empty() {
                return Some(ServerEvent::Error {
                    message: "Invalid button interaction data".to_string(),
                });
            }
            tracing::info!(button = %button_id, interaction = %kind, "Button interaction");
            // Relayed as-is; interactions are not checked against the scene
            state.broadcast(ServerEvent::ButtonStateChanged {
                id: button_id,
                state: kind,
            });
            None
        }
        ClientEvent::RequestScene => {
            let scene = state.scene.read().await;
            Some(ServerEvent::SceneState(SceneSnapshot::from_scene(&scene)))
        }
        ClientEvent::Ping => Some(ServerEvent::Pong),
    }
}

/// Encode and send one event, reporting transport errors to the caller.
async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to encode server event: {}", e);
            Ok(())
        }
    }
}
