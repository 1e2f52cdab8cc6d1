//! Entity registry.
//!
//! The [`Registry`] is the single owner of simulation state:
//!
//! - component storage, backed by a `bevy_ecs` [`World`] (entities are
//!   generational, so a handle to a removed entity never resolves again),
//! - shared resources (clock, physics constants, animation tables, script
//!   library, track clock) stored as world resources,
//! - the ordered list of [`System`]s,
//! - entity templates,
//! - per-entity event subscriptions ([`EventBus`]),
//! - the deferred removal queue,
//! - the random number generator used by gameplay code.
//!
//! # Tick
//!
//! [`Registry::update`] advances the clock, runs every system's update in
//! [`SystemId`](crate::systems::SystemId) order and then sweeps the
//! entities removed during the tick: each gets a `destroy` event, every
//! system gets a last look at it, its subscriptions are dropped and it is
//! despawned. Until the sweep, removed entities stay fully visible.
//!
//! # Errors
//!
//! Content mistakes (unknown template, system, script or animation names,
//! malformed fields) are [`ContentError`]s. Instantiation returns them
//! directly. Gameplay callbacks cannot return errors, so they report them with
//! [`Registry::fail`] and the next [`Registry::update`] returns the first one.

pub mod error;
pub mod template;

use std::rc::Rc;

use bevy_ecs::component::Mutable;
use bevy_ecs::prelude::*;
use log::{debug, error, trace};
use rustc_hash::FxHashMap;
use serde_json::Value;
use smallvec::SmallVec;

use crate::events::bus::{EntityEvent, EventBus, EventHandler, EventPayload};
use crate::renderer::Renderer;
use crate::resources::animationstore::AnimationStore;
use crate::resources::camera::Camera;
use crate::resources::input::InputState;
use crate::resources::physics::PhysicsSettings;
use crate::resources::scriptlibrary::ScriptLibrary;
use crate::resources::trackstate::TrackState;
use crate::resources::worldtime::WorldTime;
use crate::systems::time::update_world_time;
use crate::systems::{System, SystemId};
use error::ContentError;
use template::Template;

pub struct Registry {
    world: World,
    systems: Vec<Rc<dyn System>>,
    templates: FxHashMap<String, Rc<Template>>,
    events: EventBus,
    pending_removal: Vec<Entity>,
    faults: Vec<ContentError>,
    rng: fastrand::Rng,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry with default resources and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Empty registry with a deterministic RNG.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(PhysicsSettings::default());
        world.insert_resource(AnimationStore::default());
        world.insert_resource(ScriptLibrary::default());
        world.insert_resource(TrackState::default());
        Self {
            world,
            systems: Vec::new(),
            templates: FxHashMap::default(),
            events: EventBus::default(),
            pending_removal: Vec::new(),
            faults: Vec::new(),
            rng,
        }
    }

    // --------------- systems ---------------

    /// Add a system. Systems run sorted by [`SystemId`] whatever order they
    /// were added in; adding a second system with the same id is ignored.
    pub fn add_system(&mut self, system: Box<dyn System>) {
        let id = system.id();
        if self.system(id).is_some() {
            log::warn!("system '{}' is already registered", system.name());
            return;
        }
        let at = self.systems.partition_point(|s| s.id() < id);
        self.systems.insert(at, Rc::from(system));
    }

    pub fn add_systems(&mut self, systems: impl IntoIterator<Item = Box<dyn System>>) {
        for system in systems {
            self.add_system(system);
        }
    }

    pub fn system(&self, id: SystemId) -> Option<Rc<dyn System>> {
        self.systems.iter().find(|s| s.id() == id).cloned()
    }

    fn system_by_name(&self, name: &str) -> Option<&Rc<dyn System>> {
        self.systems.iter().find(|s| s.name() == name)
    }

    /// Whether `entity` has a component in the given system.
    pub fn has(&self, id: SystemId, entity: Entity) -> bool {
        self.system(id).is_some_and(|s| s.has(self, entity))
    }

    // --------------- templates ---------------

    pub fn add_template(&mut self, name: &str, template: Template) {
        self.templates.insert(name.to_string(), Rc::new(template));
    }

    pub fn add_templates(&mut self, templates: impl IntoIterator<Item = (String, Template)>) {
        for (name, template) in templates {
            self.templates.insert(name, Rc::new(template));
        }
    }

    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name).map(|t| t.as_ref())
    }

    /// Instantiate a template.
    ///
    /// `overrides` is an object keyed by system name whose field values
    /// replace the template's. Nothing is allocated if a name is unknown; an
    /// entity that fails while its components are built or finalized is
    /// despawned again before the error is returned.
    pub fn create_from_template(&mut self, name: &str, overrides: Option<&Value>) -> Result<Entity, ContentError> {
        let template = self
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| ContentError::UnknownTemplate(name.to_string()))?;

        for system in template.systems() {
            if self.system_by_name(system).is_none() {
                return Err(ContentError::UnknownSystem {
                    template: name.to_string(),
                    system: system.to_string(),
                });
            }
        }
        match overrides {
            None | Some(Value::Null) => {}
            Some(Value::Object(fields)) => {
                if let Some(system) = fields.keys().find(|system| !template.uses(system)) {
                    return Err(ContentError::OverrideWithoutComponent {
                        template: name.to_string(),
                        system: system.clone(),
                    });
                }
            }
            Some(_) => return Err(ContentError::NotAnObject(format!("overrides of {name}"))),
        }

        let involved: SmallVec<[Rc<dyn System>; 8]> = self
            .systems
            .iter()
            .filter(|s| template.uses(s.name()))
            .cloned()
            .collect();

        let entity = self.world.spawn_empty().id();
        if let Err(err) = self.populate(entity, &template, overrides, &involved) {
            self.events.clear(entity);
            self.world.despawn(entity);
            return Err(err);
        }
        debug!("created '{name}' as {entity:?}");

        self.trigger(entity, entity, "create");
        Ok(entity)
    }

    fn populate(
        &mut self,
        entity: Entity,
        template: &Template,
        overrides: Option<&Value>,
        involved: &[Rc<dyn System>],
    ) -> Result<(), ContentError> {
        for system in involved {
            let mut layers: SmallVec<[&Value; 2]> = SmallVec::new();
            if let Some(fields) = template.fields(system.name()) {
                layers.push(fields);
            }
            if let Some(fields) = overrides.and_then(|o| o.get(system.name())) {
                layers.push(fields);
            }
            system.add(self, entity, &layers)?;
        }
        for system in involved {
            system.finalize(self, entity)?;
        }
        Ok(())
    }

    /// Instantiate a template from inside a gameplay callback.
    ///
    /// Errors are recorded with [`fail`](Self::fail) instead of returned.
    pub fn spawn(&mut self, name: &str, overrides: Option<&Value>) -> Option<Entity> {
        let result = self.create_from_template(name, overrides);
        self.check(result)
    }

    // --------------- removal ---------------

    /// Queue `entity` for removal at the end of the current tick.
    pub fn remove_entity(&mut self, entity: Entity) {
        if !self.contains(entity) || self.pending_removal.contains(&entity) {
            return;
        }
        self.pending_removal.push(entity);
    }

    pub fn is_removal_pending(&self, entity: Entity) -> bool {
        self.pending_removal.contains(&entity)
    }

    /// Whether `entity` still exists (pending removals included).
    pub fn contains(&self, entity: Entity) -> bool {
        self.world.get_entity(entity).is_ok()
    }

    /// Remove every queued entity. Destroy handlers may queue more; the sweep
    /// runs until the queue is empty.
    fn sweep_removals(&mut self) {
        while !self.pending_removal.is_empty() {
            let batch = std::mem::take(&mut self.pending_removal);
            for entity in batch {
                self.destroy(entity);
            }
        }
    }

    fn destroy(&mut self, entity: Entity) {
        if !self.contains(entity) {
            return;
        }
        self.trigger(entity, entity, "destroy");

        let systems = self.systems.clone();
        for system in &systems {
            if system.has(self, entity) {
                system.remove(self, entity);
            }
        }
        self.events.clear(entity);
        self.world.despawn(entity);
        debug!("removed {entity:?}");
    }

    // --------------- tick ---------------

    /// Run one fixed tick.
    pub fn update(&mut self, delta: f32) -> Result<(), ContentError> {
        update_world_time(&mut self.world, delta);

        let systems = self.systems.clone();
        for system in &systems {
            system.update(self, delta);
        }
        self.sweep_removals();

        self.take_fault()
    }

    /// Forward an input snapshot for `entity` to every system.
    pub fn input(&mut self, entity: Entity, input: &InputState) {
        let systems = self.systems.clone();
        for system in &systems {
            system.input(self, entity, input);
        }
    }

    /// Submit draws for the current state, interpolated by `lerp`.
    pub fn render(&mut self, renderer: &mut dyn Renderer, camera: &Camera, lerp: f32) {
        let systems = self.systems.clone();
        for system in &systems {
            system.render(self, renderer, camera, lerp);
        }
    }

    // --------------- events ---------------

    pub fn add_event_listener(&mut self, entity: Entity, name: &str, handler: EventHandler) {
        self.events.add(entity, name, handler);
    }

    /// Remove the first listener equal to `handler`.
    pub fn remove_event_listener(&mut self, entity: Entity, name: &str, handler: &EventHandler) -> bool {
        self.events.remove(entity, name, handler)
    }

    pub fn listener_count(&self, entity: Entity, name: &str) -> usize {
        self.events.count(entity, name)
    }

    /// Dispatch `name` to the listeners of `target`, synchronously and in
    /// subscription order. The listener list is copied first, so listeners
    /// added or removed during dispatch only take effect for the next one.
    pub fn trigger_event(&mut self, target: Entity, source: Entity, name: &str, payload: &mut EventPayload) {
        let Some(handlers) = self.events.snapshot(target, name) else {
            return;
        };
        trace!("{name} -> {target:?} ({} listeners)", handlers.len());
        let mut event = EntityEvent {
            source,
            target,
            name,
            registry: self,
        };
        for handler in &handlers {
            handler.call(&mut event, payload);
        }
    }

    /// [`trigger_event`](Self::trigger_event) without a payload.
    pub fn trigger(&mut self, target: Entity, source: Entity, name: &str) {
        self.trigger_event(target, source, name, &mut EventPayload::None);
    }

    // --------------- components and resources ---------------

    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.world.get::<C>(entity)
    }

    pub fn get_mut<C: Component<Mutability = Mutable>>(&mut self, entity: Entity) -> Option<Mut<'_, C>> {
        self.world.get_mut::<C>(entity)
    }

    /// Entities holding a `C` component, collected up front so the caller may
    /// create and remove entities while walking the list. Entities created
    /// afterwards are not part of it.
    pub fn entities_with<C: Component>(&mut self) -> Vec<Entity> {
        let mut query = self.world.query_filtered::<Entity, With<C>>();
        query.iter(&self.world).collect()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.world.resource::<R>()
    }

    pub fn insert_resource<R: Resource>(&mut self, resource: R) {
        self.world.insert_resource(resource);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn rng(&mut self) -> &mut fastrand::Rng {
        &mut self.rng
    }

    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }

    // --------------- faults ---------------

    /// Record a content error raised where it cannot be returned.
    pub fn fail(&mut self, err: ContentError) {
        error!("{err}");
        self.faults.push(err);
    }

    /// Unwrap `result`, recording the error with [`fail`](Self::fail).
    pub fn check<T>(&mut self, result: Result<T, ContentError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }

    fn take_fault(&mut self) -> Result<(), ContentError> {
        if self.faults.is_empty() {
            return Ok(());
        }
        let mut faults = std::mem::take(&mut self.faults);
        Err(faults.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::position::PositionSystem;
    use crate::systems::prune::PruneSystem;
    use crate::systems::render::RenderSystem;

    #[test]
    fn systems_run_in_id_order_whatever_the_registration_order() {
        let mut registry = Registry::with_seed(2);
        registry.add_system(Box::new(RenderSystem));
        registry.add_system(Box::new(PositionSystem));
        registry.add_system(Box::new(PruneSystem));
        registry.add_system(Box::new(RenderSystem));

        let ids: Vec<SystemId> = registry.systems.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![SystemId::Position, SystemId::Prune, SystemId::Render]);
    }
}
