//! Dog trotting across the slope.
//!
//! It walks sideways (leftwards when its data carries the `flip` flag) and
//! sits down for a few seconds when it bumps into someone. Sometimes it
//! leaves a little something behind when it gets up again; that mark is
//! pruned once whoever the dog met is far enough away.

use bevy_ecs::prelude::Entity;
use serde_json::json;

use super::{random_range, with_data};
use crate::components::position::Position;
use crate::components::prune::Prune;
use crate::components::render::Render;
use crate::components::script::ScriptFunctions;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::systems::animation::AnimationSystem;
use crate::systems::collision::COLLISION_SOURCE_EVENT;

const WALK_SPEED: f32 = 2.1;
const PEE_CHANCE: f32 = 0.15;

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: None,
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    let flip = with_data(registry, entity, |data| {
        data.set_scalar("wait", 0.0);
        data.has_flag("flip")
    })
    .unwrap_or(false);
    if let Some(mut render) = registry.get_mut::<Render>(entity) {
        render.flip_x = flip;
    }
    AnimationSystem::start(registry, entity);
    registry.add_event_listener(entity, COLLISION_SOURCE_EVENT, EventHandler::Function(collide));
}

fn update(entity: Entity, registry: &mut Registry, delta: f32) {
    let Some((wait, flip, met)) = with_data(registry, entity, |data| {
        (data.scalar("wait"), data.has_flag("flip"), data.get_entity("met"))
    }) else {
        return;
    };

    if wait == 0.0 {
        let wobble = random_range(registry, -0.5, 0.5);
        if let Some(mut pos) = registry.get_mut::<Position>(entity) {
            pos.vel_x = if flip { -WALK_SPEED } else { WALK_SPEED };
            pos.vel_y += wobble;
        }
        return;
    }

    let wait = wait - delta;
    if wait > 0.0 {
        with_data(registry, entity, |data| data.set_scalar("wait", wait));
        return;
    }

    AnimationSystem::play(registry, entity, "walk", 1.0);
    with_data(registry, entity, |data| data.set_scalar("wait", 0.0));

    if registry.rng().f32() < PEE_CHANCE {
        leave_mark(registry, entity, met);
    }
}

fn leave_mark(registry: &mut Registry, entity: Entity, met: Option<Entity>) {
    let Some(pos) = registry.get::<Position>(entity).copied() else {
        return;
    };
    let overrides = json!({ "position": { "x": pos.x, "y": pos.y - 4.0 } });
    let Some(mark) = registry.spawn("pee", Some(&overrides)) else {
        return;
    };
    if let Some(mut prune) = registry.get_mut::<Prune>(mark) {
        prune.distance_from = met;
    }
}

fn collide(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    let entity = event.target;
    let wait = random_range(event.registry, 2.0, 4.0);
    let met = event.source;
    with_data(event.registry, entity, |data| {
        data.set_scalar("wait", wait);
        data.set_entity("met", met);
    });
    AnimationSystem::play(event.registry, entity, "sit", 1.0);
    if let Some(mut pos) = event.registry.get_mut::<Position>(entity) {
        pos.vel_x = 0.0;
        pos.vel_y = 0.0;
    }
}
