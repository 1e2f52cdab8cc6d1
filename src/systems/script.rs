//! Script dispatch.
//!
//! The script system binds a [`Script`] to its entity's lifecycle:
//!
//! - `create` and `destroy` events are subscribed at finalize and forwarded
//!   to the script's create/destroy callbacks,
//! - every tick each script's update callback runs,
//! - every frame each script's render callback runs,
//! - input snapshots reach only the script of the entity they are sent to.
//!
//! Handler-bound scripts are detached from their component while one of
//! their methods runs, so the handler gets `&mut self` alongside
//! `&mut Registry`; it is put back afterwards. A handler that wants to react
//! to other entity events subscribes [`ScriptSystem::forward_event`].
//!
//! # Related
//!
//! - [`crate::components::script`] – the component and handler trait
//! - [`crate::resources::scriptlibrary::ScriptLibrary`] – name lookup

use bevy_ecs::prelude::Entity;
use log::trace;
use serde::Deserialize;
use serde_json::Value;

use super::{System, SystemId};
use crate::components::script::{Script, ScriptFunctions, ScriptHandler, ScriptMode};
use crate::components::scriptdata::ScriptData;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::registry::template::build_component;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;
use crate::resources::input::InputState;
use crate::resources::scriptlibrary::ScriptLibrary;

/// Template fields of the script component.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptFields {
    name: String,
    #[serde(default)]
    data: ScriptData,
}

pub struct ScriptSystem;

impl System for ScriptSystem {
    fn id(&self) -> SystemId {
        SystemId::Script
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        let fields: ScriptFields = build_component(self.name(), layers)?;
        let binding = registry.resource::<ScriptLibrary>().resolve(&fields.name)?;
        registry.world_mut().entity_mut(entity).insert(Script {
            name: fields.name,
            mode: binding.into(),
            data: fields.data,
        });
        Ok(())
    }

    fn finalize(&self, registry: &mut Registry, entity: Entity) -> Result<(), ContentError> {
        registry.add_event_listener(entity, "create", EventHandler::Function(on_create));
        registry.add_event_listener(entity, "destroy", EventHandler::Function(on_destroy));

        if let Some(mut script) = registry.get_mut::<Script>(entity) {
            if let ScriptMode::Handler { factory, instance } = &mut script.mode {
                *instance = Some((*factory)());
            }
        }
        Ok(())
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Script>(entity).is_some()
    }

    fn update(&self, registry: &mut Registry, delta: f32) {
        for entity in registry.entities_with::<Script>() {
            run(registry, entity, |registry, target| match target {
                Target::Functions(functions) => {
                    if let Some(update) = functions.update {
                        update(entity, registry, delta);
                    }
                }
                Target::Handler(handler) => handler.update(entity, registry, delta),
            });
        }
    }

    fn render(&self, registry: &mut Registry, renderer: &mut dyn Renderer, camera: &Camera, lerp: f32) {
        for entity in registry.entities_with::<Script>() {
            run(registry, entity, |registry, target| match target {
                Target::Functions(functions) => {
                    if let Some(render) = functions.render {
                        render(entity, registry, renderer, camera, lerp);
                    }
                }
                Target::Handler(handler) => handler.render(entity, registry, renderer, camera, lerp),
            });
        }
    }

    fn input(&self, registry: &mut Registry, entity: Entity, input: &InputState) {
        run(registry, entity, |registry, target| match target {
            Target::Functions(functions) => {
                if let Some(handle) = functions.input {
                    handle(entity, registry, input);
                }
            }
            Target::Handler(handler) => handler.input(entity, registry, input),
        });
    }
}

impl ScriptSystem {
    /// Event handler passing the event on to the target's [`ScriptHandler`].
    ///
    /// Subscribe it for the events a handler-bound script wants to see in
    /// [`ScriptHandler::on_event`]. Events arriving while the handler is busy
    /// with another callback are dropped.
    pub fn forward_event(event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
        let entity = event.target;
        let Some(mut handler) = detach_handler(event.registry, entity) else {
            trace!("{} for {entity:?} dropped, script handler busy", event.name);
            return;
        };
        handler.on_event(event, payload);
        attach_handler(event.registry, entity, handler);
    }

    /// The data store of `entity`'s script.
    pub fn data(registry: &Registry, entity: Entity) -> Option<&ScriptData> {
        registry.get::<Script>(entity).map(|script| &script.data)
    }
}

fn on_create(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    let entity = event.target;
    run(event.registry, entity, |registry, target| match target {
        Target::Functions(functions) => {
            if let Some(create) = functions.create {
                create(entity, registry);
            }
        }
        Target::Handler(handler) => handler.create(entity, registry),
    });
}

fn on_destroy(event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
    let entity = event.target;
    run(event.registry, entity, |registry, target| match target {
        Target::Functions(functions) => {
            if let Some(destroy) = functions.destroy {
                destroy(entity, registry);
            }
        }
        Target::Handler(handler) => handler.destroy(entity, registry),
    });
}

enum Target<'a> {
    Functions(ScriptFunctions),
    Handler(&'a mut dyn ScriptHandler),
}

enum Detached {
    Functions(ScriptFunctions),
    Handler(Box<dyn ScriptHandler>),
}

/// Call `f` with the script of `entity`, if it has one that is not busy.
fn run(registry: &mut Registry, entity: Entity, f: impl FnOnce(&mut Registry, Target<'_>)) {
    let detached = {
        let Some(mut script) = registry.get_mut::<Script>(entity) else {
            return;
        };
        match &mut script.mode {
            ScriptMode::Functions(functions) => Detached::Functions(*functions),
            ScriptMode::Handler { instance, .. } => match instance.take() {
                Some(handler) => Detached::Handler(handler),
                None => return,
            },
        }
    };

    match detached {
        Detached::Functions(functions) => f(registry, Target::Functions(functions)),
        Detached::Handler(mut handler) => {
            f(registry, Target::Handler(handler.as_mut()));
            attach_handler(registry, entity, handler);
        }
    }
}

fn detach_handler(registry: &mut Registry, entity: Entity) -> Option<Box<dyn ScriptHandler>> {
    let mut script = registry.get_mut::<Script>(entity)?;
    match &mut script.mode {
        ScriptMode::Handler { instance, .. } => instance.take(),
        ScriptMode::Functions(_) => None,
    }
}

fn attach_handler(registry: &mut Registry, entity: Entity, handler: Box<dyn ScriptHandler>) {
    if let Some(mut script) = registry.get_mut::<Script>(entity) {
        if let ScriptMode::Handler { instance, .. } = &mut script.mode {
            instance.get_or_insert(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::json;

    use super::*;
    use crate::registry::template::Template;

    static CREATED: AtomicU32 = AtomicU32::new(0);
    static DESTROYED: AtomicU32 = AtomicU32::new(0);
    static EVENTS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn count_create(entity: Entity, registry: &mut Registry) {
        CREATED.fetch_add(1, Ordering::SeqCst);
        if let Some(mut script) = registry.get_mut::<Script>(entity) {
            script.data.set_integer("ticks", 0);
        }
    }

    fn count_update(entity: Entity, registry: &mut Registry, _delta: f32) {
        if let Some(mut script) = registry.get_mut::<Script>(entity) {
            let ticks = script.data.integer("ticks");
            script.data.set_integer("ticks", ticks + 1);
        }
    }

    fn count_destroy(_entity: Entity, _registry: &mut Registry) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    #[derive(Default)]
    struct Listener {
        updates: u32,
    }

    impl ScriptHandler for Listener {
        fn create(&mut self, entity: Entity, registry: &mut Registry) {
            registry.add_event_listener(entity, "ping", EventHandler::Function(ScriptSystem::forward_event));
        }

        fn update(&mut self, _entity: Entity, _registry: &mut Registry, _delta: f32) {
            self.updates += 1;
        }

        fn on_event(&mut self, event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {
            if let Ok(mut events) = EVENTS.lock() {
                events.push(format!("{}:{}", event.name, self.updates));
            }
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::with_seed(1);
        registry.add_system(Box::new(ScriptSystem));
        {
            let mut library = registry.world_mut().resource_mut::<ScriptLibrary>();
            library.register_functions(
                "counter",
                ScriptFunctions {
                    create: Some(count_create),
                    update: Some(count_update),
                    destroy: Some(count_destroy),
                    ..Default::default()
                },
            );
            library.register_handler("listener", || Box::new(Listener::default()));
        }
        registry.add_template("counter", Template::new().with("script", json!({ "name": "counter" })));
        registry.add_template("listener", Template::new().with("script", json!({ "name": "listener" })));
        registry
    }

    #[test]
    fn function_script_lifecycle() {
        let mut registry = registry();
        let entity = registry.create_from_template("counter", None).unwrap();
        assert!(CREATED.load(Ordering::SeqCst) >= 1);

        registry.update(0.05).unwrap();
        registry.update(0.05).unwrap();
        assert_eq!(ScriptSystem::data(&registry, entity).unwrap().integer("ticks"), 2);

        let destroyed = DESTROYED.load(Ordering::SeqCst);
        registry.remove_entity(entity);
        registry.update(0.05).unwrap();
        assert!(DESTROYED.load(Ordering::SeqCst) > destroyed);
        assert!(!registry.contains(entity));
    }

    #[test]
    fn handler_receives_forwarded_events() {
        let mut registry = registry();
        let entity = registry.create_from_template("listener", None).unwrap();
        registry.update(0.05).unwrap();
        registry.trigger(entity, entity, "ping");
        let events = EVENTS.lock().unwrap();
        assert!(events.iter().any(|e| e == "ping:1"));
    }

    #[test]
    fn unknown_script_name_fails_creation() {
        let mut registry = registry();
        registry.add_template("broken", Template::new().with("script", json!({ "name": "nope" })));
        assert!(matches!(
            registry.create_from_template("broken", None),
            Err(ContentError::UnknownScript(name)) if name == "nope"
        ));
    }

    #[test]
    fn data_override_seeds_script_data() {
        let mut registry = registry();
        let overrides = json!({ "script": { "data": { "scalars": { "speed": 2.5 } } } });
        let entity = registry.create_from_template("counter", Some(&overrides)).unwrap();
        assert_eq!(ScriptSystem::data(&registry, entity).unwrap().scalar("speed"), 2.5);
    }
}
