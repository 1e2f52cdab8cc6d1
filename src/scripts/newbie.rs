//! Beginner skier wobbling downhill until the first thing it touches.

use bevy_ecs::prelude::Entity;

use super::{random_range, with_data};
use crate::components::position::Position;
use crate::components::render::Render;
use crate::components::script::ScriptFunctions;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::systems::collision::COLLISION_SOURCE_EVENT;

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: None,
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    registry.add_event_listener(entity, COLLISION_SOURCE_EVENT, EventHandler::Function(collide));
}

fn update(entity: Entity, registry: &mut Registry, delta: f32) {
    let ready = with_data(registry, entity, |data| {
        if data.has_flag("failed") {
            return false;
        }
        let wait = data.scalar("wait") - delta;
        data.set_scalar("wait", wait);
        wait <= 0.0
    });
    if ready != Some(true) {
        return;
    }

    let push = random_range(registry, -1.5, 1.5);
    let frame = if registry.rng().f32() > 0.5 { "ski1" } else { "ski2" };
    let wait = random_range(registry, 0.35, 0.95);

    if let Some(mut pos) = registry.get_mut::<Position>(entity) {
        pos.vel_x += push;
        pos.vel_y = 4.0;
    }
    if let Some(mut render) = registry.get_mut::<Render>(entity) {
        render.frame = frame.to_string();
    }
    with_data(registry, entity, |data| data.set_scalar("wait", wait));
}

fn collide(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    let entity = event.target;
    with_data(event.registry, entity, |data| data.set_flag("failed"));
    if let Some(mut pos) = event.registry.get_mut::<Position>(entity) {
        pos.vel_x = 0.0;
        pos.vel_y = 0.0;
    }
    if let Some(mut render) = event.registry.get_mut::<Render>(entity) {
        render.frame = "failed".to_string();
    }
}
