//! Client-side scene synchronization
//!
//! `SceneRelay` is the native counterpart of the browser viewer: it keeps a
//! local `Scene` in step with a stagelink server and forwards user
//! interactions, fire-and-forget.

pub mod relay;

pub use relay::{apply_server_event, RelayError, SceneRelay};
