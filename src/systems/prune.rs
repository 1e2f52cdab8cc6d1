//! Prune system: removes entities whose [`Prune`] rules fire.
//!
//! Time and distance rules are evaluated every tick. The camera rule depends
//! on where the camera is when a frame is drawn, so it is evaluated during
//! rendering; the removal itself is still deferred to the end of the next
//! tick like any other.

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::position::Position;
use crate::components::prune::Prune;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;

pub struct PruneSystem;

impl System for PruneSystem {
    fn id(&self) -> SystemId {
        SystemId::Prune
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Prune>(registry, entity, self.id(), layers)
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Prune>(entity).is_some()
    }

    fn update(&self, registry: &mut Registry, delta: f32) {
        for entity in registry.entities_with::<Prune>() {
            if expired(registry, entity, delta) {
                registry.remove_entity(entity);
            }
        }
    }

    fn render(&self, registry: &mut Registry, _renderer: &mut dyn Renderer, camera: &Camera, _lerp: f32) {
        for entity in registry.entities_with::<Prune>() {
            let (Some(prune), Some(pos)) = (registry.get::<Prune>(entity), registry.get::<Position>(entity)) else {
                continue;
            };
            if prune.camera && outside_view(pos, prune.camera_border, camera) {
                registry.remove_entity(entity);
            }
        }
    }
}

fn expired(registry: &mut Registry, entity: Entity, delta: f32) -> bool {
    let Some(mut prune) = registry.get_mut::<Prune>(entity) else {
        return false;
    };
    if prune.time > 0.0 {
        prune.time -= delta;
        if prune.time <= 0.0 {
            return true;
        }
    }
    let prune = *prune;

    match prune.distance_from {
        Some(reference) if prune.distance > 0.0 => {
            let Some(other) = registry.get::<Position>(reference) else {
                return true;
            };
            let Some(pos) = registry.get::<Position>(entity) else {
                return false;
            };
            (other.x - pos.x).abs() >= prune.distance || (other.y - pos.y).abs() >= prune.distance
        }
        _ => false,
    }
}

/// Whether `pos`, grown by `border` on each side, misses the camera view.
pub fn outside_view(pos: &Position, border: f32, camera: &Camera) -> bool {
    pos.x + border < camera.x()
        || pos.y + border < camera.y()
        || pos.x - border >= camera.x() + camera.scaled_width()
        || pos.y - border >= camera.y() + camera.scaled_height()
}
