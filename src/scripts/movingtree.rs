//! A tree that shuffles sideways when nobody is looking.
//!
//! It waits a few seconds, then moves in short bursts in one direction until
//! a 20% roll sends it back to waiting.

use bevy_ecs::prelude::Entity;

use super::{random_range, with_data};
use crate::components::position::Position;
use crate::components::render::Render;
use crate::components::script::ScriptFunctions;
use crate::registry::Registry;

const SPEED: f32 = 2.25;
const BURST: f32 = 0.16;

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: None,
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    with_data(registry, entity, |data| {
        data.set_scalar("wait", 1.0);
        data.set_integer("direction", -1);
        data.clear_flag("moving");
    });
}

fn update(entity: Entity, registry: &mut Registry, delta: f32) {
    let Some((wait, moving, direction)) = with_data(registry, entity, |data| {
        let wait = data.scalar("wait") - delta;
        data.set_scalar("wait", wait);
        (wait, data.has_flag("moving"), data.integer("direction"))
    }) else {
        return;
    };

    if wait > 0.0 {
        set_frame(registry, entity, "default");
        return;
    }

    if !moving {
        let direction = if registry.rng().f32() < 0.5 { -1 } else { 1 };
        with_data(registry, entity, |data| {
            data.set_flag("moving");
            data.set_scalar("wait", 0.5);
            data.set_integer("direction", direction);
        });
        return;
    }

    if let Some(mut pos) = registry.get_mut::<Position>(entity) {
        pos.vel_x = SPEED * direction as f32;
    }
    set_frame(registry, entity, "move");

    let stop = registry.rng().f32() < 0.2;
    let next_wait = if stop { random_range(registry, 2.0, 4.0) } else { BURST };
    with_data(registry, entity, |data| {
        data.set_flag_to("moving", !stop);
        data.set_scalar("wait", next_wait);
    });
}

fn set_frame(registry: &mut Registry, entity: Entity, frame: &str) {
    if let Some(mut render) = registry.get_mut::<Render>(entity) {
        if render.frame != frame {
            render.frame = frame.to_string();
        }
    }
}
