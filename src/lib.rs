//! Stagelink Library
//!
//! A real-time interactive 3D scene service. Owns a scene of named button
//! objects, serves a browser viewer, and synchronizes button transforms and
//! interaction events with clients over a WebSocket channel.

pub mod api;
pub mod client;
pub mod protocol;
pub mod scene;
pub mod settings;
pub mod store;
pub mod telemetry;

pub use client::SceneRelay;
pub use protocol::{ButtonConfig, ClientEvent, SceneSnapshot, ServerEvent, Vec3Data};
pub use scene::{Button, Scene, Transform};
pub use settings::ServerSettings;
pub use store::{ButtonStore, StoreWatcher};
