//! Global physics constants used by the position system.

use bevy_ecs::prelude::Resource;

pub const DEFAULT_GRAVITY: f32 = 0.84;
pub const DEFAULT_FRICTION: f32 = 0.825;
pub const DEFAULT_VELOCITY_MIN: f32 = 0.075;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    /// Downward acceleration per tick, scaled by each entity's gravity and mass.
    pub gravity: f32,
    /// Base ground friction; entity friction blends towards it.
    pub friction: f32,
    /// Velocity components smaller than this are snapped to zero.
    pub velocity_min: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            friction: DEFAULT_FRICTION,
            velocity_min: DEFAULT_VELOCITY_MIN,
        }
    }
}
