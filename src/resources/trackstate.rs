//! State of the tracks system that outlives individual entities.

use bevy_ecs::prelude::Resource;

use crate::components::tracks::Tracks;

#[derive(Resource, Debug, Clone, Default)]
pub struct TrackState {
    /// Seconds accumulated by the tracks system; part timestamps use this clock.
    pub time: f32,
    /// Trails whose owners were removed, kept until they have faded.
    pub orphans: Vec<Tracks>,
}
