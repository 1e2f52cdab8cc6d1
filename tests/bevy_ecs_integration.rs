//! Bevy ECS Integration Tests
//!
//! The registry stores components and resources in a bevy `World` and relies
//! on a handful of its guarantees. These tests pin those down so a bevy_ecs
//! upgrade that changes them fails here first.
//!
//! # Test Categories
//!
//! 1. **Resources** - insertion, replacement, mutation, removal
//! 2. **Entities** - generational handles, despawn, empty spawns
//! 3. **Components** - insert/replace, change through `Mut`
//! 4. **Queries** - filtered entity collection
//!
//! ```sh
//! cargo test --test bevy_ecs_integration
//! ```

use bevy_ecs::prelude::*;

// =============================================================================
// Test Components and Resources
// =============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, PartialEq)]
struct Sprite(String);

#[derive(Resource, Debug, Default, PartialEq)]
struct Counter(i32);

#[derive(Resource, Debug, Clone, Copy, Default)]
struct DebugFlag;

// =============================================================================
// CATEGORY 1: Resources
// =============================================================================

#[test]
fn insert_resource_replaces_previous_value() {
    let mut world = World::new();
    world.insert_resource(Counter(1));
    world.insert_resource(Counter(5));
    assert_eq!(*world.resource::<Counter>(), Counter(5));
}

#[test]
fn resource_mut_changes_are_visible() {
    let mut world = World::new();
    world.insert_resource(Counter(0));
    world.resource_mut::<Counter>().0 += 10;
    assert_eq!(world.resource::<Counter>().0, 10);
}

#[test]
fn marker_resource_presence_toggles() {
    let mut world = World::new();
    assert!(world.get_resource::<DebugFlag>().is_none());
    world.insert_resource(DebugFlag);
    assert!(world.get_resource::<DebugFlag>().is_some());
    world.remove_resource::<DebugFlag>();
    assert!(world.get_resource::<DebugFlag>().is_none());
}

// =============================================================================
// CATEGORY 2: Entities
// =============================================================================

#[test]
fn despawned_handle_never_resolves_again() {
    let mut world = World::new();
    let first = world.spawn(Position { x: 0.0, y: 0.0 }).id();
    world.despawn(first);
    assert!(world.get_entity(first).is_err());

    // the slot may be reused, but with a new generation
    let second = world.spawn(Position { x: 1.0, y: 1.0 }).id();
    assert_ne!(first, second);
    assert!(world.get_entity(first).is_err());
    assert!(world.get::<Position>(first).is_none());
}

#[test]
fn despawning_twice_is_harmless() {
    let mut world = World::new();
    let entity = world.spawn_empty().id();
    let other = world.spawn(Position { x: 0.0, y: 0.0 }).id();
    world.despawn(entity);
    world.despawn(entity);
    assert!(world.get_entity(entity).is_err());
    assert!(world.get_entity(other).is_ok());
}

#[test]
fn empty_spawn_exists_without_components() {
    let mut world = World::new();
    let entity = world.spawn_empty().id();
    assert!(world.get_entity(entity).is_ok());
    assert!(world.get::<Position>(entity).is_none());
}

// =============================================================================
// CATEGORY 3: Components
// =============================================================================

#[test]
fn inserting_same_component_replaces_it() {
    let mut world = World::new();
    let entity = world.spawn_empty().id();
    world.entity_mut(entity).insert(Sprite("tree".into()));
    world.entity_mut(entity).insert(Sprite("rock".into()));
    assert_eq!(world.get::<Sprite>(entity), Some(&Sprite("rock".into())));
}

#[test]
fn get_mut_writes_through() {
    let mut world = World::new();
    let entity = world.spawn(Position { x: 1.0, y: 2.0 }).id();
    if let Some(mut pos) = world.get_mut::<Position>(entity) {
        pos.x += 3.0;
    }
    assert_eq!(world.get::<Position>(entity).map(|p| p.x), Some(4.0));
}

#[test]
fn copied_component_is_detached_from_storage() {
    let mut world = World::new();
    let entity = world.spawn(Position { x: 1.0, y: 2.0 }).id();
    let snapshot = *world.get::<Position>(entity).unwrap();
    world.get_mut::<Position>(entity).unwrap().y = 9.0;
    assert_eq!(snapshot.y, 2.0);
}

// =============================================================================
// CATEGORY 4: Queries
// =============================================================================

#[test]
fn filtered_query_collects_matching_entities() {
    let mut world = World::new();
    let a = world.spawn(Position { x: 0.0, y: 0.0 }).id();
    let b = world
        .spawn((Position { x: 0.0, y: 0.0 }, Sprite("tree".into())))
        .id();
    world.spawn(Sprite("pee".into()));

    let mut query = world.query_filtered::<Entity, With<Position>>();
    let mut found: Vec<Entity> = query.iter(&world).collect();
    found.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn collected_entities_survive_spawns_during_iteration() {
    let mut world = World::new();
    world.spawn(Position { x: 0.0, y: 0.0 });
    world.spawn(Position { x: 1.0, y: 0.0 });

    let mut query = world.query_filtered::<Entity, With<Position>>();
    let snapshot: Vec<Entity> = query.iter(&world).collect();
    for _ in &snapshot {
        world.spawn(Position { x: 5.0, y: 5.0 });
    }
    assert_eq!(snapshot.len(), 2);
    assert_eq!(query.iter(&world).count(), 4);
}

#[test]
fn despawned_entities_leave_queries() {
    let mut world = World::new();
    let a = world.spawn(Position { x: 0.0, y: 0.0 }).id();
    world.spawn(Position { x: 1.0, y: 0.0 });
    world.despawn(a);

    let mut query = world.query::<&Position>();
    let xs: Vec<f32> = query.iter(&world).map(|p| p.x).collect();
    assert_eq!(xs, vec![1.0]);
}
