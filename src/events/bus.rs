//! Per-entity publish/subscribe tables.
//!
//! Every entity can have any number of named events, each with an ordered list
//! of handlers. Dispatch is synchronous: [`Registry::trigger_event`] snapshots
//! the handler list and calls each handler in registration order with an
//! [`EntityEvent`] that carries the registry itself, so handlers may freely
//! create or remove entities, add or remove listeners and trigger further
//! events while being dispatched.
//!
//! # Event names used by the engine
//!
//! | Name | Fired by | Payload |
//! |------|----------|---------|
//! | `create` | registry, after finalize | none |
//! | `destroy` | registry, during the removal sweep | none |
//! | `position:touchGround` | position system | none |
//! | `collision:source` / `collision:target` | collision system | [`CollisionEvent`] |
//! | `animation:<event>` | animation system | none |
//!
//! [`Registry::trigger_event`]: crate::registry::Registry::trigger_event

use std::fmt;
use std::rc::Rc;

use bevy_ecs::prelude::Entity;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::collision::CollisionEvent;
use crate::registry::Registry;

/// Context handed to every event handler.
pub struct EntityEvent<'a> {
    /// Entity that caused the event.
    pub source: Entity,
    /// Entity the event was dispatched to.
    pub target: Entity,
    /// Event name.
    pub name: &'a str,
    /// Back-reference to the registry the event was triggered on.
    pub registry: &'a mut Registry,
}

/// Optional data carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EventPayload {
    #[default]
    None,
    Collision(CollisionEvent),
}

impl EventPayload {
    pub fn collision(&self) -> Option<&CollisionEvent> {
        match self {
            EventPayload::Collision(collision) => Some(collision),
            EventPayload::None => None,
        }
    }

    pub fn collision_mut(&mut self) -> Option<&mut CollisionEvent> {
        match self {
            EventPayload::Collision(collision) => Some(collision),
            EventPayload::None => None,
        }
    }
}

pub type HandlerFn = fn(&mut EntityEvent<'_>, &mut EventPayload);

/// A registered event handler.
///
/// Plain functions are what scripts normally register since they can be
/// named again later to unsubscribe. Closures are handy for one-off wiring
/// and tests; unsubscribing one needs a clone of the same `Rc`.
#[derive(Clone)]
pub enum EventHandler {
    Function(HandlerFn),
    Closure(Rc<dyn Fn(&mut EntityEvent<'_>, &mut EventPayload)>),
}

impl EventHandler {
    pub fn closure(handler: impl Fn(&mut EntityEvent<'_>, &mut EventPayload) + 'static) -> Self {
        EventHandler::Closure(Rc::new(handler))
    }

    pub fn call(&self, event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
        match self {
            EventHandler::Function(function) => function(event, payload),
            EventHandler::Closure(closure) => closure(event, payload),
        }
    }

    /// Reference equality: same function pointer or same closure allocation.
    pub fn same_as(&self, other: &EventHandler) -> bool {
        match (self, other) {
            (EventHandler::Function(a), EventHandler::Function(b)) => *a as usize == *b as usize,
            (EventHandler::Closure(a), EventHandler::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventHandler::Function(function) => {
                write!(f, "EventHandler::Function({:#x})", *function as usize)
            }
            EventHandler::Closure(_) => write!(f, "EventHandler::Closure(..)"),
        }
    }
}

/// Snapshot of the handlers registered for one (entity, event) pair.
pub type HandlerList = SmallVec<[EventHandler; 4]>;

/// Subscription tables, keyed by entity and then by event name.
#[derive(Default)]
pub struct EventBus {
    listeners: FxHashMap<Entity, FxHashMap<String, Vec<EventHandler>>>,
}

impl EventBus {
    pub fn add(&mut self, entity: Entity, name: &str, handler: EventHandler) {
        self.listeners
            .entry(entity)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove the first handler equal to `handler`. Returns whether one was found.
    pub fn remove(&mut self, entity: Entity, name: &str, handler: &EventHandler) -> bool {
        let Some(handlers) = self
            .listeners
            .get_mut(&entity)
            .and_then(|events| events.get_mut(name))
        else {
            return false;
        };
        match handlers.iter().position(|h| h.same_as(handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the current handler list, or `None` if nobody listens.
    pub fn snapshot(&self, entity: Entity, name: &str) -> Option<HandlerList> {
        let handlers = self.listeners.get(&entity)?.get(name)?;
        if handlers.is_empty() {
            return None;
        }
        Some(handlers.iter().cloned().collect())
    }

    /// Drop every subscription of `entity`.
    pub fn clear(&mut self, entity: Entity) {
        self.listeners.remove(&entity);
    }

    pub fn count(&self, entity: Entity, name: &str) -> usize {
        self.listeners
            .get(&entity)
            .and_then(|events| events.get(name))
            .map_or(0, Vec::len)
    }

    pub fn has_entity(&self, entity: Entity) -> bool {
        self.listeners.contains_key(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    fn noop(_event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {}
    fn other(_event: &mut EntityEvent<'_>, _payload: &mut EventPayload) {}

    fn entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn remove_only_drops_first_match() {
        let e = entity();
        let mut bus = EventBus::default();
        bus.add(e, "create", EventHandler::Function(noop));
        bus.add(e, "create", EventHandler::Function(other));
        bus.add(e, "create", EventHandler::Function(noop));

        assert!(bus.remove(e, "create", &EventHandler::Function(noop)));
        assert_eq!(bus.count(e, "create"), 2);

        let remaining = bus.snapshot(e, "create").unwrap();
        assert!(remaining[0].same_as(&EventHandler::Function(other)));
        assert!(remaining[1].same_as(&EventHandler::Function(noop)));
    }

    #[test]
    fn closures_compare_by_allocation() {
        let a = EventHandler::closure(|_, _| {});
        let b = EventHandler::closure(|_, _| {});
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
        assert!(!a.same_as(&EventHandler::Function(noop)));
    }

    #[test]
    fn snapshot_of_unknown_event_is_none() {
        let e = entity();
        let mut bus = EventBus::default();
        assert!(bus.snapshot(e, "destroy").is_none());
        bus.add(e, "destroy", EventHandler::Function(noop));
        assert!(bus.remove(e, "destroy", &EventHandler::Function(noop)));
        assert!(bus.snapshot(e, "destroy").is_none());
        assert!(!bus.remove(e, "destroy", &EventHandler::Function(noop)));
    }

    #[test]
    fn clear_drops_all_events_of_entity() {
        let e = entity();
        let mut bus = EventBus::default();
        bus.add(e, "a", EventHandler::Function(noop));
        bus.add(e, "b", EventHandler::Function(noop));
        bus.clear(e);
        assert!(!bus.has_entity(e));
        assert_eq!(bus.count(e, "a"), 0);
    }

    #[test]
    fn payload_exposes_collision() {
        let mut payload = EventPayload::Collision(CollisionEvent::new(true));
        payload.collision_mut().unwrap().block_movement = false;
        assert_eq!(payload.collision(), Some(&CollisionEvent::new(false)));
        assert!(EventPayload::None.collision().is_none());
    }
}
