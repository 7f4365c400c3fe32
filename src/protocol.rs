//! Wire protocol for the scene sync channel.
//!
//! JSON messages tagged by event name, matching the browser viewer:
//! `{"type": "<event>", "data": {...}}`. Vectors travel as `{x, y, z}`
//! objects.

use serde::{Deserialize, Serialize};

use crate::scene::{Button, Scene, Transform};

/// Wire form of a 3-component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<glam::Vec3> for Vec3Data {
    fn from(v: glam::Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(v: Vec3Data) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

/// Full transform for one button, as carried by `button_config_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub id: String,
    pub position: Vec3Data,
    pub rotation: Vec3Data,
    pub scale: f32,
}

impl ButtonConfig {
    /// Scene-side transform carried by this config.
    pub fn transform(&self) -> Transform {
        Transform::new(self.position.into(), self.rotation.into(), self.scale)
    }

    /// Snapshot a button into its wire form.
    pub fn from_button(button: &Button) -> Self {
        Self {
            id: button.id.clone(),
            position: button.transform.position.into(),
            rotation: button.transform.rotation.into(),
            scale: button.transform.scale,
        }
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// User interacted with a button (click, hover, ...)
    ButtonInteraction {
        button_id: String,
        #[serde(rename = "type")]
        kind: String,
    },
    /// Request a full scene snapshot
    RequestScene,
    /// Keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Greeting sent once per connection
    ConnectionResponse { status: String },
    /// A button's transform changed
    ButtonConfigUpdated(ButtonConfig),
    /// A button interaction, relayed to all clients
    ButtonStateChanged { id: String, state: String },
    /// Full scene snapshot
    SceneState(SceneSnapshot),
    /// Keepalive response
    Pong,
    /// The peer sent something that could not be handled
    Error { message: String },
}

/// All button configs of a scene, for full-state sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub buttons: Vec<ButtonConfig>,
}

impl SceneSnapshot {
    /// Snapshot every button of a scene.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            buttons: scene.buttons().map(ButtonConfig::from_button).collect(),
        }
    }
}
