//! Scripted behaviour attached to an entity.
//!
//! A script is bound in one of two ways, picked by the name it is registered
//! under in the [`ScriptLibrary`](crate::resources::scriptlibrary::ScriptLibrary):
//!
//! - [`ScriptMode::Functions`]: plain functions called with the entity and
//!   the registry. Their state lives in the component's [`ScriptData`].
//! - [`ScriptMode::Handler`]: a boxed [`ScriptHandler`] built when the entity
//!   is finalized. The handler keeps its own state in its fields.
//!
//! Template fields: `name` (library key) and `data` (seed values for
//! [`ScriptData`]).
//!
//! # Related
//!
//! - [`crate::systems::script::ScriptSystem`] – dispatches the callbacks
//! - [`crate::scripts`] – the game's scripts

use std::fmt;

use bevy_ecs::prelude::{Component, Entity};

use super::scriptdata::ScriptData;
use crate::events::bus::{EntityEvent, EventPayload};
use crate::registry::Registry;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;
use crate::resources::input::InputState;

pub type ScriptFn = fn(Entity, &mut Registry);
pub type ScriptUpdateFn = fn(Entity, &mut Registry, f32);
pub type ScriptRenderFn = fn(Entity, &mut Registry, &mut dyn Renderer, &Camera, f32);
pub type ScriptInputFn = fn(Entity, &mut Registry, &InputState);

/// Function table of a function-bound script. Missing entries are skipped.
#[derive(Clone, Copy, Default)]
pub struct ScriptFunctions {
    pub create: Option<ScriptFn>,
    pub update: Option<ScriptUpdateFn>,
    pub destroy: Option<ScriptFn>,
    pub render: Option<ScriptRenderFn>,
    pub input: Option<ScriptInputFn>,
}

/// Stateful script object.
///
/// While one of these methods runs, the handler is detached from its
/// component; events sent to the same entity during that time do not reach
/// it.
pub trait ScriptHandler: Send + Sync {
    fn create(&mut self, _entity: Entity, _registry: &mut Registry) {}
    fn update(&mut self, _entity: Entity, _registry: &mut Registry, _delta: f32) {}
    fn destroy(&mut self, _entity: Entity, _registry: &mut Registry) {}
    fn render(
        &mut self,
        _entity: Entity,
        _registry: &mut Registry,
        _renderer: &mut dyn Renderer,
        _camera: &Camera,
        _lerp: f32,
    ) {
    }
    fn input(&mut self, _entity: Entity, _registry: &mut Registry, _input: &InputState) {}
    /// Entity events subscribed through
    /// [`ScriptSystem::forward_event`](crate::systems::script::ScriptSystem::forward_event).
    fn on_event(&mut self, _event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {}
}

pub type HandlerFactory = fn() -> Box<dyn ScriptHandler>;

/// What a script name resolves to in the library.
#[derive(Clone, Copy)]
pub enum ScriptBinding {
    Functions(ScriptFunctions),
    Handler(HandlerFactory),
}

pub enum ScriptMode {
    Functions(ScriptFunctions),
    Handler {
        factory: HandlerFactory,
        /// Built at finalize; `None` before that and while running.
        instance: Option<Box<dyn ScriptHandler>>,
    },
}

impl From<ScriptBinding> for ScriptMode {
    fn from(binding: ScriptBinding) -> Self {
        match binding {
            ScriptBinding::Functions(functions) => ScriptMode::Functions(functions),
            ScriptBinding::Handler(factory) => ScriptMode::Handler {
                factory,
                instance: None,
            },
        }
    }
}

#[derive(Component)]
pub struct Script {
    pub name: String,
    pub mode: ScriptMode,
    pub data: ScriptData,
}

impl Script {
    pub fn functions(&self) -> Option<ScriptFunctions> {
        match &self.mode {
            ScriptMode::Functions(functions) => Some(*functions),
            ScriptMode::Handler { .. } => None,
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self.mode, ScriptMode::Handler { .. })
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &self.mode {
            ScriptMode::Functions(_) => "functions",
            ScriptMode::Handler {
                instance: Some(_), ..
            } => "handler",
            ScriptMode::Handler { instance: None, .. } => "handler (detached)",
        };
        f.debug_struct("Script")
            .field("name", &self.name)
            .field("mode", &mode)
            .field("data", &self.data)
            .finish()
    }
}
