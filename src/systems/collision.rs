//! Swept collision detection.
//!
//! For every entity `A` whose `with` mask is non-empty, and every other entity
//! `B` whose `type` matches that mask and which is close enough, the system
//! checks whether `A` ran into `B` during this tick:
//!
//! 1. `B`'s box is grown by half of `A`'s box, so `A` can be treated as a point.
//! 2. `A`'s movement is made relative to `B` by subtracting `B`'s movement.
//! 3. The movement segment is intersected with the four edges of the grown
//!    box; the smallest parameter `t` in `[0, 1]` is the moment of contact.
//! 4. `A`'s height at `t` must lie within `B`'s vertical extent, so skiers
//!    can jump over rocks.
//!
//! A hit fires `collision:source` on `A` and `collision:target` on `B`, both
//! sharing one [`CollisionEvent`] seeded with `B.blocks`. If it still blocks
//! after both dispatches, `A` is moved back to the point of contact and its
//! movement for the remaining tests is shortened accordingly. `B` is never
//! moved.
//!
//! With the [`DebugMode`] resource present the boxes are drawn as outlines.

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::collision::Collision;
use crate::components::position::Position;
use crate::events::bus::EventPayload;
use crate::events::collision::CollisionEvent;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::{Color, Coords, Renderer};
use crate::resources::camera::Camera;
use crate::resources::debugmode::DebugMode;

/// Entities farther apart than this on either axis are not tested.
pub const MIN_DISTANCE: f32 = 112.0;

pub const COLLISION_SOURCE_EVENT: &str = "collision:source";
pub const COLLISION_TARGET_EVENT: &str = "collision:target";

const DEBUG_COLOR: Color = Color::rgba(255, 0, 0, 255);

pub struct CollisionSystem;

impl System for CollisionSystem {
    fn id(&self) -> SystemId {
        SystemId::Collision
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Collision>(registry, entity, self.id(), layers)
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Collision>(entity).is_some()
    }

    fn update(&self, registry: &mut Registry, _delta: f32) {
        let entities = registry.entities_with::<Collision>();

        for &a in &entities {
            let Some(coll_a) = registry.get::<Collision>(a).copied() else {
                continue;
            };
            if coll_a.with.is_empty() {
                continue;
            }
            let Some(mut pos_a) = registry.get::<Position>(a).copied() else {
                continue;
            };
            let mut diff_x = pos_a.x - pos_a.last_x;
            let mut diff_y = pos_a.y - pos_a.last_y;

            for &b in &entities {
                if a == b {
                    continue;
                }
                let Some(coll_b) = registry.get::<Collision>(b).copied() else {
                    continue;
                };
                if !coll_a.tests_against(&coll_b) {
                    continue;
                }
                let Some(pos_b) = registry.get::<Position>(b).copied() else {
                    continue;
                };

                let Some(t) = sweep(&pos_a, &coll_a, diff_x, diff_y, &pos_b, &coll_b) else {
                    continue;
                };

                let mut payload = EventPayload::Collision(CollisionEvent::new(coll_b.blocks));
                registry.trigger_event(a, b, COLLISION_SOURCE_EVENT, &mut payload);
                registry.trigger_event(b, a, COLLISION_TARGET_EVENT, &mut payload);
                let blocked = payload.collision().is_some_and(|c| c.block_movement);

                let Some(mut pos) = registry.get_mut::<Position>(a) else {
                    break;
                };
                if blocked {
                    pos.x = pos.last_x + diff_x * t;
                    pos.y = pos.last_y + diff_y * t;
                    pos.z = pos.last_z + (pos.z - pos.last_z) * t;
                }
                // listeners may have moved A as well
                pos_a = *pos;
                diff_x = pos_a.x - pos_a.last_x;
                diff_y = pos_a.y - pos_a.last_y;
            }
        }
    }

    fn render(&self, registry: &mut Registry, renderer: &mut dyn Renderer, _camera: &Camera, _lerp: f32) {
        if registry.world().get_resource::<DebugMode>().is_none() {
            return;
        }
        for entity in registry.entities_with::<Collision>() {
            let (Some(coll), Some(pos)) = (registry.get::<Collision>(entity), registry.get::<Position>(entity))
            else {
                continue;
            };
            renderer.draw_rect_outline(
                Coords::World,
                pos.lerp_x - coll.width / 2.0,
                pos.lerp_y - coll.height,
                pos.lerp_z,
                coll.width,
                coll.height,
                DEBUG_COLOR,
            );
        }
    }
}

/// Contact time of mover `a` (moving by `diff_x`/`diff_y` this tick) with
/// `b`, or `None` if they did not touch.
fn sweep(
    pos_a: &Position,
    coll_a: &Collision,
    diff_x: f32,
    diff_y: f32,
    pos_b: &Position,
    coll_b: &Collision,
) -> Option<f32> {
    if (pos_b.x - pos_a.x).abs() > MIN_DISTANCE || (pos_b.y - pos_a.y).abs() > MIN_DISTANCE {
        return None;
    }

    let half_w = coll_b.width / 2.0 + coll_a.width / 2.0;
    let half_d = coll_b.depth / 2.0 + coll_a.depth / 2.0;
    let (x1, y1) = (pos_b.x - half_w, pos_b.y - half_d);
    let (x2, y2) = (pos_b.x + half_w, pos_b.y + half_d);

    let (sx, sy) = (pos_a.last_x, pos_a.last_y);
    let ex = sx + (diff_x - (pos_b.x - pos_b.last_x));
    let ey = sy + (diff_y - (pos_b.y - pos_b.last_y));

    let t = [
        (x1, y1, x2, y1),
        (x2, y1, x2, y2),
        (x1, y2, x2, y2),
        (x1, y1, x1, y2),
    ]
    .into_iter()
    .map(|(ax, ay, bx, by)| ray_intersection(sx, sy, ex, ey, ax, ay, bx, by))
    .fold(f32::INFINITY, f32::min);

    if t == f32::INFINITY {
        return None;
    }

    let z = pos_a.last_z + (pos_a.z - pos_a.last_z) * t;
    if z < pos_b.z || z >= pos_b.z + coll_b.height {
        return None;
    }
    Some(t)
}

/// Parametric intersection of segment `(x11, y11)-(x12, y12)` with segment
/// `(x21, y21)-(x22, y22)`.
///
/// Returns the parameter along the first segment, or `f32::INFINITY` if the
/// segments are parallel or do not cross within both their extents.
#[allow(clippy::too_many_arguments)]
pub fn ray_intersection(x11: f32, y11: f32, x12: f32, y12: f32, x21: f32, y21: f32, x22: f32, y22: f32) -> f32 {
    let (xr, yr) = (x12 - x11, y12 - y11);
    let (xs, ys) = (x22 - x21, y22 - y21);

    let denominator = xr * ys - yr * xs;
    if denominator == 0.0 {
        return f32::INFINITY;
    }

    let u = ((x21 - x11) * yr - (y21 - y11) * xr) / denominator;
    let t = ((x21 - x11) * ys - (y21 - y11) * xs) / denominator;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        t
    } else {
        f32::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collision::CollisionType;

    #[test]
    fn ray_hits_crossing_segment_halfway() {
        let t = ray_intersection(0.0, 0.0, 10.0, 0.0, 5.0, -1.0, 5.0, 1.0);
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn parallel_segments_never_intersect() {
        assert_eq!(ray_intersection(0.0, 0.0, 10.0, 0.0, 0.0, 1.0, 10.0, 1.0), f32::INFINITY);
        assert_eq!(ray_intersection(0.0, 0.0, 10.0, 0.0, 2.0, 0.0, 8.0, 0.0), f32::INFINITY);
    }

    #[test]
    fn ray_stopping_short_misses() {
        assert_eq!(ray_intersection(0.0, 0.0, 4.0, 0.0, 5.0, -1.0, 5.0, 1.0), f32::INFINITY);
    }

    fn mover(last_y: f32, y: f32, z: f32) -> Position {
        let mut pos = Position::new(0.0, last_y, z);
        pos.y = y;
        pos
    }

    #[test]
    fn sweep_finds_entry_time() {
        let a = mover(-20.0, 0.0, 0.0);
        let coll_a = Collision {
            width: 10.0,
            depth: 2.0,
            with: CollisionType::OBSTACLE,
            ..Default::default()
        };
        let b = Position::new(0.0, 0.0, 0.0);
        let coll_b = Collision {
            width: 10.0,
            depth: 2.0,
            height: 20.0,
            kind: CollisionType::OBSTACLE,
            ..Default::default()
        };
        // grown box spans y in [-2, 2]; entry at y = -2 is 18/20 of the way
        let t = sweep(&a, &coll_a, a.x - a.last_x, a.y - a.last_y, &b, &coll_b).unwrap();
        assert!((t - 0.9).abs() < 1e-5);
    }

    #[test]
    fn sweep_passes_over_low_obstacle() {
        let a = mover(-20.0, 0.0, 30.0);
        let coll_a = Collision::default();
        let b = Position::new(0.0, 0.0, 0.0);
        let coll_b = Collision {
            height: 20.0,
            ..Default::default()
        };
        assert!(sweep(&a, &coll_a, 0.0, 20.0, &b, &coll_b).is_none());
    }

    #[test]
    fn sweep_ignores_far_entities() {
        let a = mover(-20.0, 0.0, 0.0);
        let b = Position::new(200.0, 0.0, 0.0);
        assert!(sweep(&a, &Collision::default(), 0.0, 20.0, &b, &Collision::default()).is_none());
    }
}
