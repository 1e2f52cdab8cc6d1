//! Snowboarder carving left and right down the slope.
//!
//! Hitting anything makes it hop and flip over the obstacle instead of being
//! stopped.

use bevy_ecs::prelude::Entity;

use super::{random_range, with_data};
use crate::components::position::Position;
use crate::components::script::ScriptFunctions;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::systems::animation::AnimationSystem;
use crate::systems::collision::COLLISION_SOURCE_EVENT;

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: None,
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    with_data(registry, entity, |data| {
        data.set_scalar("wait", 0.0);
        data.set_integer("direction", 1);
        data.clear_flag("flipping");
    });
    registry.add_event_listener(entity, COLLISION_SOURCE_EVENT, EventHandler::Function(collide));
}

fn collide(event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
    let Some(collision) = payload.collision_mut() else {
        return;
    };
    if collision.block_movement {
        let entity = event.target;
        if let Some(mut pos) = event.registry.get_mut::<Position>(entity) {
            pos.vel_x *= 0.5;
            pos.vel_y *= 0.5;
            pos.vel_z += 3.5;
        }
        AnimationSystem::play(event.registry, entity, "flip", 1.0);
        with_data(event.registry, entity, |data| {
            data.set_scalar("wait", 0.3);
            data.set_flag("flipping");
        });
    }
    collision.block_movement = false;
}

fn update(entity: Entity, registry: &mut Registry, delta: f32) {
    let Some(direction) = with_data(registry, entity, |data| data.integer("direction")) else {
        return;
    };
    if let Some(mut pos) = registry.get_mut::<Position>(entity) {
        if pos.on_ground() {
            pos.vel_y += 4.5;
            pos.vel_x += direction as f32 * 3.25;
        }
    }

    let Some((wait, flipping)) = with_data(registry, entity, |data| {
        let wait = data.scalar("wait") - delta;
        data.set_scalar("wait", wait);
        (wait, data.has_flag("flipping"))
    }) else {
        return;
    };
    if wait > 0.0 {
        return;
    }

    if flipping {
        with_data(registry, entity, |data| data.clear_flag("flipping"));
        return;
    }

    let next_wait = random_range(registry, 0.3, 1.5);
    let direction = if direction < 0 { 1 } else { -1 };
    with_data(registry, entity, |data| {
        data.set_scalar("wait", next_wait);
        data.set_integer("direction", direction);
    });
    let animation = if direction < 0 { "right" } else { "left" };
    AnimationSystem::play(registry, entity, animation, 1.0);
}
