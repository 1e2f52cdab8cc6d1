//! Ski trail recording.
//!
//! Every tick an entity with [`Tracks`] moves along the ground, the trail is
//! extended. If the movement continues the last part (starts where it ended
//! and bends by less than [`MAX_SIMPLIFY_ANGLE`]) that part is stretched and
//! its timestamp refreshed; otherwise a new part starts. Parts fade over the
//! trail's `duration` and are trimmed from the front once fully faded.
//!
//! When an entity is removed its trail is moved to the orphan pool of the
//! [`TrackState`] resource so it can finish fading; empty orphans are dropped.

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::position::Position;
use crate::components::tracks::{TrackPart, Tracks};
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::{Coords, Renderer};
use crate::resources::camera::Camera;
use crate::resources::trackstate::TrackState;

/// Largest bend, in radians, that still extends the previous part.
pub const MAX_SIMPLIFY_ANGLE: f32 = 2.5 * std::f32::consts::PI / 180.0;

pub struct TracksSystem;

impl System for TracksSystem {
    fn id(&self) -> SystemId {
        SystemId::Tracks
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Tracks>(registry, entity, self.id(), layers)
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Tracks>(entity).is_some()
    }

    fn remove(&self, registry: &mut Registry, entity: Entity) {
        let Some(mut tracks) = registry.get_mut::<Tracks>(entity) else {
            return;
        };
        if tracks.parts.is_empty() {
            return;
        }
        let orphan = Tracks {
            decal: tracks.decal.clone(),
            duration: tracks.duration,
            parts: std::mem::take(&mut tracks.parts),
        };
        registry
            .world_mut()
            .resource_mut::<TrackState>()
            .orphans
            .push(orphan);
    }

    fn update(&self, registry: &mut Registry, delta: f32) {
        let now = {
            let mut state = registry.world_mut().resource_mut::<TrackState>();
            state.time += delta;
            let now = state.time;
            state.orphans.retain_mut(|orphan| {
                orphan.prune(now);
                !orphan.parts.is_empty()
            });
            now
        };

        for entity in registry.entities_with::<Tracks>() {
            let Some(pos) = registry.get::<Position>(entity).copied() else {
                continue;
            };
            if let Some(mut tracks) = registry.get_mut::<Tracks>(entity) {
                tracks.prune(now);
                if pos.moved() && pos.on_ground() {
                    extend(&mut tracks, &pos, now);
                }
            }
        }
    }

    fn render(&self, registry: &mut Registry, renderer: &mut dyn Renderer, _camera: &Camera, _lerp: f32) {
        let state = registry.resource::<TrackState>();
        let now = state.time;
        for orphan in &state.orphans {
            draw(orphan, renderer, now);
        }

        for entity in registry.entities_with::<Tracks>() {
            if let Some(tracks) = registry.get::<Tracks>(entity) {
                draw(tracks, renderer, now);
            }
        }
    }
}

/// Add the movement from `pos.last_*` to `pos` to the trail.
pub fn extend(tracks: &mut Tracks, pos: &Position, now: f32) {
    if let Some(last) = tracks.parts.last_mut() {
        if pos.last_x == last.x2 && pos.last_y == last.y2 {
            let angle = (pos.y - pos.last_y).atan2(pos.x - pos.last_x);
            if heading_delta(angle, last.angle()).abs() < MAX_SIMPLIFY_ANGLE {
                last.x2 = pos.x;
                last.y2 = pos.y;
                last.time = now;
                return;
            }
        }
    }
    tracks.parts.push(TrackPart {
        x1: pos.last_x,
        y1: pos.last_y,
        x2: pos.x,
        y2: pos.y,
        time: now,
    });
}

/// Difference between two headings, wrapped into `[-PI, PI]`.
fn heading_delta(a: f32, b: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (a - b + PI).rem_euclid(TAU) - PI
}

fn draw(tracks: &Tracks, renderer: &mut dyn Renderer, now: f32) {
    for part in &tracks.parts {
        renderer.draw_decal(
            Coords::World,
            &tracks.decal,
            part.x1,
            part.y1,
            part.x2,
            part.y2,
            tracks.alpha(part, now),
        );
    }
}
