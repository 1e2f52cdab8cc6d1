//! Debug toggle resource.
//!
//! The mere presence of this resource in the registry world enables debug
//! overlays such as collision box outlines. Remove it to disable them.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, systems may draw overlays or log extra detail.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DebugMode;
