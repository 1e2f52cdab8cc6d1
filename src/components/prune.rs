//! Automatic entity removal rules.
//!
//! A [`Prune`] component combines up to three independent rules; whichever
//! fires first removes the entity:
//!
//! - **time**: counts down by the tick delta; the entity is removed once it
//!   reaches zero. Zero disables the rule.
//! - **distance**: removed once its distance to `distance_from` reaches
//!   `distance` along either axis, or once that entity is gone. Zero or no
//!   reference disables the rule.
//! - **camera**: removed during rendering when the entity, grown by
//!   `camera_border` on every side, lies completely outside the view.
//!
//! Template fields: `time`, `distance`, `camera`, `camera_border`. The
//! reference entity can only be set at runtime.
//!
//! # Related
//!
//! - [`crate::systems::prune::PruneSystem`] – evaluates the rules

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Prune {
    /// Remaining lifetime in seconds.
    pub time: f32,
    pub distance: f32,
    #[serde(skip)]
    pub distance_from: Option<Entity>,
    pub camera: bool,
    pub camera_border: f32,
}

impl Default for Prune {
    fn default() -> Self {
        Self {
            time: 0.0,
            distance: 0.0,
            distance_from: None,
            camera: false,
            camera_border: 48.0,
        }
    }
}

impl Prune {
    /// Prune after `seconds`.
    pub fn after(seconds: f32) -> Self {
        Self {
            time: seconds,
            ..Default::default()
        }
    }

    /// Prune once farther than `distance` from `entity`.
    pub fn away_from(entity: Entity, distance: f32) -> Self {
        Self {
            distance,
            distance_from: Some(entity),
            ..Default::default()
        }
    }
}
