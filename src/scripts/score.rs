//! Floating score popup.
//!
//! Spawned with the awarded points in `integers["score"]`; drifts with its
//! spawn velocity, fades out and removes itself after [`AGE_MAX`] seconds.

use bevy_ecs::prelude::Entity;

use super::with_data;
use crate::components::position::Position;
use crate::components::script::{Script, ScriptFunctions};
use crate::registry::Registry;
use crate::renderer::{Coords, Renderer};
use crate::resources::camera::Camera;

pub const AGE_MAX: f32 = 1.5;

const FONT: &str = "small";

pub const FUNCTIONS: ScriptFunctions = ScriptFunctions {
    create: Some(create),
    update: Some(update),
    destroy: None,
    render: Some(render),
    input: None,
};

fn create(entity: Entity, registry: &mut Registry) {
    with_data(registry, entity, |data| data.set_scalar("age", 0.0));
}

fn update(entity: Entity, registry: &mut Registry, delta: f32) {
    let age = with_data(registry, entity, |data| {
        let age = data.scalar("age") + delta;
        data.set_scalar("age", age);
        age
    });
    if age.is_some_and(|age| age >= AGE_MAX) {
        registry.remove_entity(entity);
    }
}

fn render(entity: Entity, registry: &mut Registry, renderer: &mut dyn Renderer, _camera: &Camera, _lerp: f32) {
    let (Some(pos), Some(script)) = (registry.get::<Position>(entity), registry.get::<Script>(entity)) else {
        return;
    };
    let text = script.data.integer("score").to_string();
    let width = renderer.text_width(&text, FONT);
    let alpha = 1.0 - script.data.scalar("age") / AGE_MAX;
    renderer.draw_text(
        Coords::World,
        &text,
        FONT,
        pos.lerp_x - width / 4.0,
        pos.lerp_y,
        pos.lerp_z,
        alpha.max(0.0),
    );
}
