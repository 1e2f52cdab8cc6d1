//! Time update.
//!
//! Advances the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource at the start of every registry tick.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Add `dt` seconds to the clock and count the tick.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    wt.elapsed += dt;
    wt.delta = dt;
    wt.frame_count += 1;
}
