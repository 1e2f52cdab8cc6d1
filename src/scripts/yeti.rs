//! The yeti.
//!
//! Chases the entity stored under `entities["target"]` and eats it on
//! contact. After eating it picks its teeth and then hops around in place
//! for ever; the animation frame events `eatdone`, `pickdone` and `jump`
//! chain those animations together.

use bevy_ecs::prelude::Entity;

use super::{random_range, with_data};
use crate::components::position::Position;
use crate::components::render::Render;
use crate::components::script::ScriptFunctions;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::systems::animation::AnimationSystem;
use crate::systems::collision::COLLISION_SOURCE_EVENT;

/// Script data key of the chased entity.
pub const TARGET: &str = "target";

const CHASE_X: f32 = 3.0;
const CHASE_Y: f32 = 6.0;

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: None,
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    with_data(registry, entity, |data| data.clear_flag("done"));
    registry.add_event_listener(entity, COLLISION_SOURCE_EVENT, EventHandler::Function(collide));
    registry.add_event_listener(entity, "animation:eatdone", EventHandler::Function(eat_done));
    registry.add_event_listener(entity, "animation:pickdone", EventHandler::Function(pick_done));
    registry.add_event_listener(entity, "animation:jump", EventHandler::Function(jump));
}

fn eat_done(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    AnimationSystem::play(event.registry, event.target, "pick", 1.0);
}

fn pick_done(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    AnimationSystem::play(event.registry, event.target, "jump", 0.85);
}

fn jump(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    if let Some(mut pos) = event.registry.get_mut::<Position>(event.target) {
        pos.vel_z = 4.0;
    }
    let speed = random_range(event.registry, 0.2, 1.0);
    AnimationSystem::set(event.registry, event.target, "jump", speed);
}

fn collide(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    let entity = event.target;
    let target = with_data(event.registry, entity, |data| data.get_entity(TARGET)).flatten();
    if target != Some(event.source) {
        return;
    }

    with_data(event.registry, entity, |data| data.set_flag("done"));
    AnimationSystem::play(event.registry, entity, "eat", 1.0);
    event
        .registry
        .remove_event_listener(entity, COLLISION_SOURCE_EVENT, &EventHandler::Function(collide));
    event.registry.remove_entity(event.source);

    if let Some(mut pos) = event.registry.get_mut::<Position>(entity) {
        pos.vel_x = 0.0;
        pos.vel_y = 0.0;
    }
}

fn update(entity: Entity, registry: &mut Registry, _delta: f32) {
    let Some((Some(target), false)) =
        with_data(registry, entity, |data| (data.get_entity(TARGET), data.has_flag("done")))
    else {
        return;
    };
    let Some(prey) = registry.get::<Position>(target).copied() else {
        return;
    };

    let vel_x = {
        let Some(mut pos) = registry.get_mut::<Position>(entity) else {
            return;
        };
        let dx = if prey.x - pos.x < 0.0 { -1.0 } else { 1.0 };
        let dy = if prey.y - pos.y < 0.0 { -1.0 } else { 1.0 };
        pos.vel_x += dx * CHASE_X;
        pos.vel_y += dy * CHASE_Y;
        pos.vel_x
    };
    AnimationSystem::play(registry, entity, "run", 1.0);
    if let Some(mut render) = registry.get_mut::<Render>(entity) {
        render.flip_x = vel_x < 0.0;
    }
}
