//! Sprite animation playback state.
//!
//! The component only tracks where playback is; the frames themselves live in
//! the [`AnimationStore`](crate::resources::animationstore::AnimationStore)
//! keyed by the sprite of the entity's [`Render`](super::render::Render)
//! component. Use [`AnimationSystem::play`](crate::systems::animation::AnimationSystem::play)
//! and friends to switch animations instead of editing the fields directly.
//!
//! Template fields: `animation`, `running`, `speed`.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Animation {
    /// Name of the animation being played.
    pub animation: String,
    #[serde(skip)]
    pub frame_index: usize,
    /// Duration of the current frame; zero stops advancing.
    #[serde(skip)]
    pub next_frame_time: f32,
    /// Time accumulated in the current frame.
    #[serde(skip)]
    pub time: f32,
    pub running: bool,
    /// Playback speed multiplier.
    pub speed: f32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            animation: String::new(),
            frame_index: 0,
            next_frame_time: 0.0,
            time: 0.0,
            running: false,
            speed: 1.0,
        }
    }
}
