//! Systems driving the simulation.
//!
//! Every system owns one component kind. The registry calls the systems in
//! [`SystemId`] order, which is part of the game's behaviour:
//! positions are integrated before anything is pruned, collisions are
//! resolved on the integrated positions, and scripts react to all of that
//! before tracks record where everyone ended up. [`default_systems`] returns
//! them in that order.
//!
//! Systems are stateless; whatever they need to keep between ticks lives in
//! a resource of the registry world.

use bevy_ecs::prelude::{Component, Entity};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::registry::template::build_component;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;
use crate::resources::input::InputState;

pub mod animation;
pub mod collision;
pub mod position;
pub mod prune;
pub mod render;
pub mod script;
pub mod time;
pub mod tracks;

/// Identifies a system and, through [`SystemId::name`], the template key of
/// its component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemId {
    Position,
    Prune,
    Collision,
    Animation,
    Script,
    Tracks,
    Render,
}

impl SystemId {
    pub const ALL: [SystemId; 7] = [
        SystemId::Position,
        SystemId::Prune,
        SystemId::Collision,
        SystemId::Animation,
        SystemId::Script,
        SystemId::Tracks,
        SystemId::Render,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SystemId::Position => "position",
            SystemId::Prune => "prune",
            SystemId::Collision => "collision",
            SystemId::Animation => "animation",
            SystemId::Script => "script",
            SystemId::Tracks => "tracks",
            SystemId::Render => "render",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

pub trait System {
    fn id(&self) -> SystemId;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Build this system's component for `entity` from layered template
    /// fields and insert it.
    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError>;

    /// Cross-component wiring, run once every component of a new entity exists.
    fn finalize(&self, _registry: &mut Registry, _entity: Entity) -> Result<(), ContentError> {
        Ok(())
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool;

    /// Last look at an entity's component before it is despawned.
    fn remove(&self, _registry: &mut Registry, _entity: Entity) {}

    fn update(&self, _registry: &mut Registry, _delta: f32) {}

    /// Submit draws. Must not change simulation state other than render-only
    /// fields and deferred removals.
    fn render(&self, _registry: &mut Registry, _renderer: &mut dyn Renderer, _camera: &Camera, _lerp: f32) {}

    fn input(&self, _registry: &mut Registry, _entity: Entity, _input: &InputState) {}
}

/// Deserialize a component from `layers` and insert it on `entity`.
pub fn insert_component<C>(
    registry: &mut Registry,
    entity: Entity,
    id: SystemId,
    layers: &[&Value],
) -> Result<(), ContentError>
where
    C: Component + DeserializeOwned,
{
    let component: C = build_component(id.name(), layers)?;
    registry.world_mut().entity_mut(entity).insert(component);
    Ok(())
}

/// All systems in their canonical order.
pub fn default_systems() -> Vec<Box<dyn System>> {
    vec![
        Box::new(position::PositionSystem),
        Box::new(prune::PruneSystem),
        Box::new(collision::CollisionSystem),
        Box::new(animation::AnimationSystem),
        Box::new(script::ScriptSystem),
        Box::new(tracks::TracksSystem),
        Box::new(render::RenderSystem),
    ]
}
