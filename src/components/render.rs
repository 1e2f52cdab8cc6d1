//! Sprite to draw for an entity.
//!
//! Template fields: `sprite`, `frame`, `flip_x`, `shadow`.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Render {
    pub sprite: String,
    pub frame: String,
    /// Mirror horizontally.
    pub flip_x: bool,
    /// Shadow sprite drawn on the ground under the entity.
    pub shadow: Option<String>,
}

impl Default for Render {
    fn default() -> Self {
        Self {
            sprite: String::new(),
            frame: "default".to_string(),
            flip_x: false,
            shadow: None,
        }
    }
}
