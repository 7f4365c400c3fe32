//! WebSocket relay for a local scene replica.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::protocol::{ClientEvent, ServerEvent};
use crate::scene::Scene;

/// Relay errors
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Client half of the sync relay.
///
/// Bridges local interaction events to the server and applies server-pushed
/// config updates to the local scene. Stateless pass-through: every outbound
/// message is independent and every inbound message causes at most one scene
/// mutation. There is no reconnection; when the connection drops the relay
/// goes quiet.
pub struct SceneRelay {
    /// Scene kept in sync by the connection task
    scene: Arc<RwLock<Scene>>,
    /// Outbound events, drained by the connection task
    outgoing: mpsc::UnboundedSender<ClientEvent>,
}

impl SceneRelay {
    /// Connect to a stagelink server and start applying its updates to `scene`.
    pub async fn connect(url: &str, scene: Arc<RwLock<Scene>>) -> Result<Self, RelayError> {
        let (ws, _) = connect_async(url).await?;
        log::info!("Connected to {}", url);

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(ws, scene.clone(), outgoing_rx));

        Ok(Self { scene, outgoing })
    }

    /// Send one interaction event to the server.
    ///
    /// Fire-and-forget: no acknowledgment is awaited and nothing is retried.
    /// A relay whose connection is gone drops the event.
    pub fn emit_interaction(&self, button_id: impl Into<String>, kind: impl Into<String>) {
        let _ = self.outgoing.send(ClientEvent::ButtonInteraction {
            button_id: button_id.into(),
            kind: kind.into(),
        });
    }

    /// Ask the server for a full scene snapshot.
    pub fn request_scene(&self) {
        let _ = self.outgoing.send(ClientEvent::RequestScene);
    }

    /// Handle to the scene this relay keeps in sync.
    pub fn scene(&self) -> Arc<RwLock<Scene>> {
        self.scene.clone()
    }
}

/// Pump the socket: outbound events from the channel, inbound events into
/// the scene. Ends when either side closes.
async fn run_connection(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    scene: Arc<RwLock<Scene>>,
    mut outgoing_rx: mpsc::UnboundedReceiver<ClientEvent>,
) {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                let mut scene = scene.write().await;
                                apply_server_event(&mut scene, &event);
                            }
                            Err(e) => log::warn!("Unparseable server event: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        log::info!("Server closed the sync channel");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::error!("Sync channel error: {}", e);
                        break;
                    }
                }
            }
            event = outgoing_rx.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(json) => {
                        if write.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => log::error!("Failed to encode client event: {}", e),
                }
            }
        }
    }
}

/// Apply one server event to the local scene.
///
/// Only config updates (and the snapshot they are batched into) mutate
/// anything; unknown button ids are ignored without creating a button.
pub fn apply_server_event(scene: &mut Scene, event: &ServerEvent) {
    match event {
        ServerEvent::ButtonConfigUpdated(config) => {
            scene.apply_update(&config.id, config.transform());
        }
        ServerEvent::SceneState(snapshot) => {
            for config in &snapshot.buttons {
                scene.apply_update(&config.id, config.transform());
            }
        }
        ServerEvent::ButtonStateChanged { id, state } => {
            log::debug!("Button {} state changed: {}", id, state);
        }
        ServerEvent::ConnectionResponse { status } => {
            log::info!("Sync channel established: {}", status);
        }
        ServerEvent::Pong => log::trace!("Pong received"),
        ServerEvent::Error { message } => log::warn!("Server error: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ButtonConfig, SceneSnapshot, Vec3Data};
    use crate::scene::Button;
    use glam::Vec3;

    fn example_config() -> ButtonConfig {
        ButtonConfig {
            id: "exampleButton".to_string(),
            position: Vec3Data {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            rotation: Vec3Data::default(),
            scale: 2.0,
        }
    }

    fn relay_with_channel() -> (SceneRelay, mpsc::UnboundedReceiver<ClientEvent>) {
        let (outgoing, rx) = mpsc::unbounded_channel();
        let relay = SceneRelay {
            scene: Arc::new(RwLock::new(Scene::new())),
            outgoing,
        };
        (relay, rx)
    }

    #[test]
    fn test_config_update_applies_to_local_scene() {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));

        apply_server_event(
            &mut scene,
            &ServerEvent::ButtonConfigUpdated(example_config()),
        );

        let button = scene.button("exampleButton").unwrap();
        assert_eq!(button.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(button.transform.rotation, Vec3::ZERO);
        assert_eq!(button.transform.scale, 2.0);
    }

    #[test]
    fn test_config_update_for_ghost_button_is_noop() {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));

        let mut config = example_config();
        config.id = "ghostButton".to_string();
        apply_server_event(&mut scene, &ServerEvent::ButtonConfigUpdated(config));

        assert!(scene.button("ghostButton").is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_duplicate_updates_are_idempotent() {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));
        let event = ServerEvent::ButtonConfigUpdated(example_config());

        apply_server_event(&mut scene, &event);
        let once = scene.button("exampleButton").unwrap().clone();
        apply_server_event(&mut scene, &event);

        assert_eq!(scene.button("exampleButton").unwrap(), &once);
    }

    #[test]
    fn test_snapshot_updates_known_buttons_only() {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));

        let mut ghost = example_config();
        ghost.id = "ghostButton".to_string();
        let snapshot = SceneSnapshot {
            buttons: vec![example_config(), ghost],
        };
        apply_server_event(&mut scene, &ServerEvent::SceneState(snapshot));

        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.button("exampleButton").unwrap().transform.scale,
            2.0
        );
    }

    #[test]
    fn test_non_config_events_do_not_mutate() {
        let mut scene = Scene::new();
        scene.spawn(Button::at_origin("exampleButton"));
        let before = scene.button("exampleButton").unwrap().clone();

        apply_server_event(
            &mut scene,
            &ServerEvent::ButtonStateChanged {
                id: "exampleButton".to_string(),
                state: "click".to_string(),
            },
        );
        apply_server_event(&mut scene, &ServerEvent::Pong);

        assert_eq!(scene.button("exampleButton").unwrap(), &before);
    }

    #[test]
    fn test_emit_interaction_sends_exactly_one_message() {
        let (relay, mut rx) = relay_with_channel();

        relay.emit_interaction("exampleButton", "click");

        match rx.try_recv().unwrap() {
            ClientEvent::ButtonInteraction { button_id, kind } => {
                assert_eq!(button_id, "exampleButton");
                assert_eq!(kind, "click");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_interaction_without_connection_is_silent() {
        let (relay, rx) = relay_with_channel();
        drop(rx);

        // Channel closed: the event is dropped, nothing panics.
        relay.emit_interaction("exampleButton", "click");
    }
}
