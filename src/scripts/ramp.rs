//! Ramps launch whatever slides over them.
//!
//! A mover arriving at the ramp's own height is thrown into the air with an
//! upward velocity proportional to its ground speed, capped per ramp size.
//! Anything arriving at a different height is blocked instead.

use bevy_ecs::prelude::Entity;

use crate::components::position::Position;
use crate::components::script::ScriptFunctions;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::systems::collision::COLLISION_TARGET_EVENT;

pub const SMALL: ScriptFunctions = ScriptFunctions {
    create: Some(create_small),
    update: None,
    destroy: None,
    render: None,
    input: None,
};

pub const LARGE: ScriptFunctions = ScriptFunctions {
    create: Some(create_large),
    update: None,
    destroy: None,
    render: None,
    input: None,
};

fn create_small(entity: Entity, registry: &mut Registry) {
    registry.add_event_listener(entity, COLLISION_TARGET_EVENT, EventHandler::Function(collide_small));
}

fn create_large(entity: Entity, registry: &mut Registry) {
    registry.add_event_listener(entity, COLLISION_TARGET_EVENT, EventHandler::Function(collide_large));
}

fn collide_small(event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
    launch(event, payload, 10.0, 0.8);
}

fn collide_large(event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
    launch(event, payload, 14.0, 1.3);
}

fn launch(event: &mut EntityEvent<'_>, payload: &mut EventPayload, max: f32, factor: f32) {
    let Some(ramp_z) = event.registry.get::<Position>(event.target).map(|p| p.z) else {
        return;
    };
    let Some(mut mover) = event.registry.get_mut::<Position>(event.source) else {
        return;
    };

    if mover.z != ramp_z {
        if let Some(collision) = payload.collision_mut() {
            collision.block_movement = true;
        }
        return;
    }
    mover.vel_z = max.min(factor * mover.speed());
}
