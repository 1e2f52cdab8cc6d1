//! Sprite submission.
//!
//! Draws each entity's shadow and sprite frame at its interpolated position.
//! Entities without a [`Position`] are skipped; depth sorting is up to the
//! [`Renderer`].

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::position::Position;
use crate::components::render::Render;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::{Coords, Renderer};
use crate::resources::camera::Camera;

pub struct RenderSystem;

impl System for RenderSystem {
    fn id(&self) -> SystemId {
        SystemId::Render
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Render>(registry, entity, self.id(), layers)
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Render>(entity).is_some()
    }

    fn render(&self, registry: &mut Registry, renderer: &mut dyn Renderer, _camera: &Camera, _lerp: f32) {
        for entity in registry.entities_with::<Render>() {
            let (Some(render), Some(pos)) = (registry.get::<Render>(entity), registry.get::<Position>(entity)) else {
                continue;
            };
            if let Some(shadow) = &render.shadow {
                renderer.draw_shadow(Coords::World, shadow, pos.lerp_x, pos.lerp_y);
            }
            renderer.draw_sprite(
                Coords::World,
                &render.sprite,
                &render.frame,
                pos.lerp_x,
                pos.lerp_y,
                pos.lerp_z,
                render.flip_x,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::template::Template;
    use crate::renderer::{DrawCommand, DrawList};
    use crate::systems::position::PositionSystem;

    #[test]
    fn draws_shadow_then_sprite_at_interpolated_position() {
        let mut registry = Registry::with_seed(3);
        registry.add_system(Box::new(PositionSystem));
        registry.add_system(Box::new(RenderSystem));
        registry.add_template(
            "thing",
            Template::new()
                .with("position", json!({ "x": 0.0, "y": 0.0, "vel_y": 4.0, "friction": 0.0 }))
                .with("render", json!({ "sprite": "tree", "shadow": "tree-shadow" })),
        );
        registry.create_from_template("thing", None).unwrap();
        registry.update(0.05).unwrap();

        let mut draws = DrawList::default();
        registry.render(&mut draws, &Camera::new(1.0, 64.0, 64.0), 0.5);

        assert_eq!(draws.len(), 2);
        assert!(matches!(&draws.commands[0], DrawCommand::Shadow { sprite, .. } if sprite == "tree-shadow"));
        match &draws.commands[1] {
            DrawCommand::Sprite { sprite, frame, y, .. } => {
                assert_eq!(sprite, "tree");
                assert_eq!(frame, "default");
                assert!((y - 2.0).abs() < 1e-5);
            }
            other => panic!("unexpected draw {other:?}"),
        }
    }
}
