//! Position integration.
//!
//! Once per tick every non-static [`Position`] moves by its velocity divided
//! by its mass. Entities then either slide on the snow, losing speed to
//! friction, or fall under gravity. Landing fires `position:touchGround` on
//! the entity exactly once per descent; the event is sent before the landing
//! is resolved, so listeners still see the impact velocity in `vel_z`.
//!
//! Rendering interpolates between the previous and current tick.

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::position::Position;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;
use crate::resources::physics::PhysicsSettings;

pub const TOUCH_GROUND_EVENT: &str = "position:touchGround";

pub struct PositionSystem;

impl System for PositionSystem {
    fn id(&self) -> SystemId {
        SystemId::Position
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Position>(registry, entity, self.id(), layers)
    }

    fn finalize(&self, registry: &mut Registry, entity: Entity) -> Result<(), ContentError> {
        if let Some(mut pos) = registry.get_mut::<Position>(entity) {
            pos.settle();
        }
        Ok(())
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Position>(entity).is_some()
    }

    fn update(&self, registry: &mut Registry, _delta: f32) {
        let physics = *registry.resource::<PhysicsSettings>();

        for entity in registry.entities_with::<Position>() {
            let landed = match registry.get_mut::<Position>(entity) {
                Some(mut pos) => integrate(&mut pos),
                None => continue,
            };
            if landed {
                registry.trigger(entity, entity, TOUCH_GROUND_EVENT);
            }
            if let Some(mut pos) = registry.get_mut::<Position>(entity) {
                apply_forces(&mut pos, &physics);
            }
        }
    }

    fn render(&self, registry: &mut Registry, _renderer: &mut dyn Renderer, _camera: &Camera, lerp: f32) {
        for entity in registry.entities_with::<Position>() {
            if let Some(mut pos) = registry.get_mut::<Position>(entity) {
                interpolate(&mut pos, lerp);
            }
        }
    }
}

/// Snapshot the previous position and move by the velocity.
///
/// Returns true if the entity went from airborne to touching the ground.
pub fn integrate(pos: &mut Position) -> bool {
    pos.last_x = pos.x;
    pos.last_y = pos.y;
    pos.last_z = pos.z;

    if pos.is_static {
        return false;
    }

    let was_grounded = pos.on_ground();
    // a massless entity moves as if it weighed 1
    let inv_mass = if pos.mass > 0.0 { 1.0 / pos.mass } else { 1.0 };
    pos.x += pos.vel_x * inv_mass;
    pos.y += pos.vel_y * inv_mass;
    pos.z += pos.vel_z * inv_mass;

    pos.on_ground() && !was_grounded
}

/// Ground clamping and friction, or gravity while airborne, then snap tiny
/// velocities to zero.
pub fn apply_forces(pos: &mut Position, physics: &PhysicsSettings) {
    if pos.is_static {
        return;
    }

    if pos.on_ground() {
        pos.z = 0.0;
        pos.vel_z = 0.0;

        let damping = physics.friction + (1.0 - physics.friction) * (1.0 - pos.friction);
        pos.vel_x *= damping;
        pos.vel_y *= damping;
    } else {
        pos.vel_z -= physics.gravity * pos.gravity * pos.mass;
    }

    for vel in [&mut pos.vel_x, &mut pos.vel_y, &mut pos.vel_z] {
        if vel.abs() < physics.velocity_min {
            *vel = 0.0;
        }
    }
}

/// Render-time interpolation. Static entities are drawn where they are.
pub fn interpolate(pos: &mut Position, lerp: f32) {
    if pos.is_static {
        pos.lerp_x = pos.x;
        pos.lerp_y = pos.y;
        pos.lerp_z = pos.z;
    } else {
        pos.lerp_x = pos.last_x + (pos.x - pos.last_x) * lerp;
        pos.lerp_y = pos.last_y + (pos.y - pos.last_y) * lerp;
        pos.lerp_z = pos.last_z + (pos.z - pos.last_z) * lerp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn step(pos: &mut Position) -> bool {
        let landed = integrate(pos);
        apply_forces(pos, &PhysicsSettings::default());
        landed
    }

    #[test]
    fn falling_entity_stays_airborne_above_ground() {
        let mut pos = Position::new(0.0, 0.0, 5.0).with_velocity(0.0, 0.0, -1.0);
        assert!(!step(&mut pos));
        assert!(approx_eq(pos.z, 4.0));
        assert!(approx_eq(pos.vel_z, -1.84));
    }

    #[test]
    fn landing_clamps_and_applies_friction() {
        let mut pos = Position::new(0.0, 0.0, 0.5).with_velocity(2.0, 4.0, -0.6);
        assert!(step(&mut pos));
        assert_eq!(pos.z, 0.0);
        assert_eq!(pos.vel_z, 0.0);
        assert!(approx_eq(pos.vel_x, 2.0 * 0.825));
        assert!(approx_eq(pos.vel_y, 4.0 * 0.825));
    }

    #[test]
    fn zero_friction_keeps_ground_speed() {
        let mut pos = Position::new(0.0, 0.0, 0.0).with_velocity(2.0, 0.0, 0.0);
        pos.friction = 0.0;
        step(&mut pos);
        assert!(approx_eq(pos.vel_x, 2.0));
    }

    #[test]
    fn no_touch_ground_while_grounded() {
        let mut pos = Position::new(0.0, 0.0, 0.0).with_velocity(1.0, 1.0, 0.0);
        for _ in 0..5 {
            assert!(!step(&mut pos));
        }
    }

    #[test]
    fn mass_scales_displacement_and_gravity() {
        let mut pos = Position::new(0.0, 0.0, 10.0).with_velocity(4.0, 0.0, 0.0);
        pos.mass = 2.0;
        step(&mut pos);
        assert!(approx_eq(pos.x, 2.0));
        assert!(approx_eq(pos.vel_z, -0.84 * 2.0));
    }

    #[test]
    fn tiny_velocities_snap_to_zero() {
        let mut pos = Position::new(0.0, 0.0, 0.0).with_velocity(0.05, -0.07, 0.0);
        step(&mut pos);
        assert_eq!(pos.vel_x, 0.0);
        assert_eq!(pos.vel_y, 0.0);
    }

    #[test]
    fn static_entity_never_moves() {
        let mut pos = Position::new(3.0, 4.0, 5.0).with_velocity(1.0, 1.0, 1.0);
        pos.is_static = true;
        for _ in 0..10 {
            assert!(!step(&mut pos));
        }
        assert_eq!((pos.x, pos.y, pos.z), (3.0, 4.0, 5.0));
        interpolate(&mut pos, 0.5);
        assert_eq!((pos.lerp_x, pos.lerp_y, pos.lerp_z), (3.0, 4.0, 5.0));
    }

    #[test]
    fn interpolation_blends_last_and_current() {
        let mut pos = Position::new(0.0, 0.0, 0.0).with_velocity(10.0, 0.0, 0.0);
        pos.friction = 0.0;
        step(&mut pos);
        interpolate(&mut pos, 0.25);
        assert!(approx_eq(pos.lerp_x, 2.5));
    }
}
