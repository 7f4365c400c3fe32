//! REST API server for stagelink
//!
//! Provides HTTP endpoints and a WebSocket for scene sync and remote control.

pub mod routes;
pub mod server;
pub mod shared;
pub mod types;
pub mod websocket;

pub use server::{create_shared_state, run_server, run_store_watcher};
pub use shared::{ClientInfo, SharedState, SharedStateHandle};
pub use types::*;
