//! Scene state for interactive buttons.
//!
//! The `Scene` is an explicit state object owned by whoever drives it (the
//! server's shared state or a client relay) and passed to handlers, so update
//! application can be tested without a live transport.
//!
//! # Architecture
//!
//! - `Button`: an interactive object with a unique id and a transform
//! - `Transform`: position, Euler rotation (radians), uniform scale
//! - `Scene`: the id -> button map plus config-update application

pub mod button;

pub use button::{Button, Transform};

use std::collections::HashMap;

/// Container for the interactive buttons of one 3D scene.
///
/// Buttons are created at scene initialization and mutated only through
/// [`Scene::apply_update`]; the set of ids is fixed for the scene's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Buttons by id
    buttons: HashMap<String, Button>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a button at scene initialization.
    ///
    /// Replaces any existing button with the same id.
    pub fn spawn(&mut self, button: Button) {
        self.buttons.insert(button.id.clone(), button);
    }

    /// Apply a config update to the matching button.
    ///
    /// Overwrites the full transform in place and returns true if the id is
    /// known. Unknown ids are ignored: no button is created and no error is
    /// raised. Absolute overwrites make repeated application idempotent.
    pub fn apply_update(&mut self, id: &str, transform: Transform) -> bool {
        match self.buttons.get_mut(id) {
            Some(button) => {
                button.transform = transform;
                true
            }
            None => {
                tracing::debug!(id, "Config update for unknown button ignored");
                false
            }
        }
    }

    /// Look up a button by id.
    pub fn button(&self, id: &str) -> Option<&Button> {
        self.buttons.get(id)
    }

    /// Iterate over all buttons (unspecified order).
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.values()
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
