//! World position and velocity.
//!
//! `x`/`y` are ground-plane coordinates (y grows downhill) and `z` is the
//! height above the snow. The position system integrates the velocity once
//! per tick and keeps the previous tick's coordinates in `last_*` so that
//! rendering can interpolate into `lerp_*`.
//!
//! Template fields: `x`, `y`, `z`, `vel_x`, `vel_y`, `vel_z`, `static`,
//! `gravity`, `friction`, `mass`.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,

    #[serde(skip)]
    pub last_x: f32,
    #[serde(skip)]
    pub last_y: f32,
    #[serde(skip)]
    pub last_z: f32,

    #[serde(skip)]
    pub lerp_x: f32,
    #[serde(skip)]
    pub lerp_y: f32,
    #[serde(skip)]
    pub lerp_z: f32,

    pub vel_x: f32,
    pub vel_y: f32,
    pub vel_z: f32,

    /// Static entities are never integrated.
    #[serde(rename = "static")]
    pub is_static: bool,
    /// Multiplier on the global gravity.
    pub gravity: f32,
    /// 1 applies the full ground friction, 0 none.
    pub friction: f32,
    pub mass: f32,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            last_z: 0.0,
            lerp_x: 0.0,
            lerp_y: 0.0,
            lerp_z: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            vel_z: 0.0,
            is_static: false,
            gravity: 1.0,
            friction: 1.0,
            mass: 1.0,
        }
    }
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        let mut position = Self {
            x,
            y,
            z,
            ..Default::default()
        };
        position.settle();
        position
    }

    pub fn with_velocity(mut self, vel_x: f32, vel_y: f32, vel_z: f32) -> Self {
        self.vel_x = vel_x;
        self.vel_y = vel_y;
        self.vel_z = vel_z;
        self
    }

    /// Copy the current coordinates into the previous and interpolated ones.
    pub fn settle(&mut self) {
        self.last_x = self.x;
        self.last_y = self.y;
        self.last_z = self.z;
        self.lerp_x = self.x;
        self.lerp_y = self.y;
        self.lerp_z = self.z;
    }

    pub fn on_ground(&self) -> bool {
        self.z <= 0.0
    }

    /// Whether the entity moved on the ground plane during the last tick.
    pub fn moved(&self) -> bool {
        self.x != self.last_x || self.y != self.last_y
    }

    /// Planar speed.
    pub fn speed(&self) -> f32 {
        (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt()
    }

    /// Travel direction on the ground plane, in radians.
    pub fn heading(&self) -> f32 {
        self.vel_y.atan2(self.vel_x)
    }
}
