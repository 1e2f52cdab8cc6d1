//! Procedural slope generation around the camera.
//!
//! The world is divided into square blocks. Every tick the blocks overlapping
//! the camera view are worked out; blocks that scrolled out of view have
//! their entities removed and are forgotten, blocks that scrolled into view
//! are filled with obstacles exactly once. A column of lift poles runs down a
//! fixed x coordinate.
//!
//! Independently of blocks, NPCs enter from the edge the camera is moving
//! towards, and pairs of lift chairs are sent up and down the lift at a pace
//! that follows the camera.

use bevy_ecs::prelude::Entity;
use log::debug;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use smallvec::SmallVec;

use crate::content::{self, NpcDef, NpcLocation, ObstacleDef};
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::registry::template::merge_overrides;
use crate::resources::camera::Camera;

pub const DEFAULT_BLOCK_SIZE: f32 = 384.0;

/// Distance outside the view at which NPCs appear.
pub const NPC_BORDER: f32 = 40.0;
/// Vertical camera travel needed before bottom NPCs may appear.
pub const NPC_MIN_DISTANCE: f32 = 32.0;

pub const LIFTPOLE_X: f32 = -192.0;
pub const LIFTCHAIR_SPEED: f32 = 3.0;
/// Horizontal offset of each chair from the pole line.
const LIFTCHAIR_OFFSET: f32 = 21.0;
const LIFTCHAIR_HEIGHT: f32 = 32.0;
const LIFTCHAIR_CADENCE: f32 = 32.0;

type BlockEntities = SmallVec<[Entity; 16]>;

#[derive(Debug, Default)]
struct Block {
    entities: BlockEntities,
}

pub struct MapGenerator {
    obstacles: Vec<ObstacleDef>,
    npcs: Vec<NpcDef>,
    block_size: f32,
    blocks: FxHashMap<(i32, i32), Block>,
    /// Camera position when NPCs were last considered after a large enough
    /// vertical move.
    last_x: f32,
    last_y: f32,
    chair_y: f32,
}

impl MapGenerator {
    pub fn new(obstacles: Vec<ObstacleDef>, npcs: Vec<NpcDef>, block_size: f32, camera: &Camera) -> Self {
        Self {
            obstacles,
            npcs,
            block_size: if block_size > 0.0 { block_size } else { DEFAULT_BLOCK_SIZE },
            blocks: FxHashMap::default(),
            last_x: camera.x(),
            last_y: camera.y(),
            chair_y: 0.0,
        }
    }

    /// Generator using the built-in spawn tables.
    pub fn with_builtin_tables(block_size: f32, camera: &Camera) -> Result<Self, ContentError> {
        let obstacles = content::load_obstacles(content::OBSTACLES_JSON)?;
        let npcs = content::load_npcs(content::NPCS_JSON)?;
        Ok(Self::new(obstacles, npcs, block_size, camera))
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Entities generated for the block at block coordinates `(x, y)`.
    pub fn block_entities(&self, x: i32, y: i32) -> Option<&[Entity]> {
        self.blocks.get(&(x, y)).map(|block| block.entities.as_slice())
    }

    /// Half-open block range `(start_x, start_y, end_x, end_y)` covering the
    /// camera view.
    pub fn visible_range(&self, camera: &Camera) -> (i32, i32, i32, i32) {
        let size = self.block_size;
        (
            (camera.x() / size).floor() as i32,
            (camera.y() / size).floor() as i32,
            ((camera.x() + camera.scaled_width()) / size).ceil() as i32,
            ((camera.y() + camera.scaled_height()) / size).ceil() as i32,
        )
    }

    pub fn update(&mut self, registry: &mut Registry, camera: &Camera, delta: f32) -> Result<(), ContentError> {
        let (start_x, start_y, end_x, end_y) = self.visible_range(camera);

        self.blocks.retain(|&(x, y), block| {
            let visible = x >= start_x && x < end_x && y >= start_y && y < end_y;
            if !visible {
                debug!("dropping block ({x}, {y}) with {} entities", block.entities.len());
                for &entity in &block.entities {
                    registry.remove_entity(entity);
                }
            }
            visible
        });

        for y in start_y..end_y {
            for x in start_x..end_x {
                if self.blocks.contains_key(&(x, y)) {
                    continue;
                }
                let entities = self.generate_block(registry, x, y)?;
                debug!("generated block ({x}, {y}) with {} entities", entities.len());
                self.blocks.insert((x, y), Block { entities });
            }
        }

        self.generate_npcs(registry, camera)?;

        self.chair_y += delta * LIFTCHAIR_SPEED;
        self.chair_y += delta * (camera.y() - camera.last_y());
        if self.chair_y.abs() >= LIFTCHAIR_CADENCE {
            self.generate_lift_chairs(registry, camera.y() - 56.0)?;
            self.generate_lift_chairs(registry, camera.y() + camera.scaled_height() + 64.0)?;
            self.chair_y = 0.0;
        }

        Ok(())
    }

    fn generate_block(&self, registry: &mut Registry, bx: i32, by: i32) -> Result<BlockEntities, ContentError> {
        let size = self.block_size;
        let x = bx as f32 * size;
        let y = by as f32 * size;
        let mut entities = BlockEntities::new();

        for obstacle in &self.obstacles {
            if registry.rng().f32() > obstacle.chance {
                continue;
            }
            let spread = obstacle.max.saturating_sub(obstacle.min) + 1;
            let amount = obstacle.min + (registry.rng().f32() * spread as f32).floor() as u32;
            for _ in 0..amount {
                let ox = (x + registry.rng().f32() * size).floor();
                let oy = (y + registry.rng().f32() * size).floor();
                let overrides = if obstacle.flip {
                    let flip_x = registry.rng().bool();
                    json!({ "position": { "x": ox, "y": oy }, "render": { "flip_x": flip_x } })
                } else {
                    json!({ "position": { "x": ox, "y": oy } })
                };
                entities.push(registry.create_from_template(&obstacle.template, Some(&overrides))?);
            }
        }

        if LIFTPOLE_X >= x && LIFTPOLE_X < x + size {
            let mut cy = y;
            while cy < y + size {
                let overrides = json!({ "position": { "x": LIFTPOLE_X, "y": cy } });
                entities.push(registry.create_from_template("liftPole", Some(&overrides))?);
                cy += size / 2.0;
            }
        }

        Ok(entities)
    }

    fn generate_npcs(&mut self, registry: &mut Registry, camera: &Camera) -> Result<(), ContentError> {
        let dx = camera.x() - self.last_x;
        let dy = camera.y() - self.last_y;

        for npc in &self.npcs {
            // only the edge being revealed spawns
            match npc.location {
                NpcLocation::Right if dx < 0.0 => continue,
                NpcLocation::Left if dx > 0.0 => continue,
                NpcLocation::Bottom if dy.abs() < NPC_MIN_DISTANCE => continue,
                _ => {}
            }
            if registry.rng().f32() > npc.chance {
                continue;
            }

            let (x, y) = spawn_point(registry, camera, npc.location);
            let position = json!({ "position": { "x": x.floor(), "y": y.floor() } });
            let overrides: Value = merge_overrides(npc.overrides.as_ref(), position);
            let entity = registry.create_from_template(&npc.template, Some(&overrides))?;
            debug!("spawned npc '{}' as {entity:?} at ({x:.0}, {y:.0})", npc.template);
        }

        if dy.abs() >= NPC_MIN_DISTANCE {
            self.last_x = camera.x();
            self.last_y = camera.y();
        }
        Ok(())
    }

    /// One chair going down the left side and one coming up the right.
    fn generate_lift_chairs(&self, registry: &mut Registry, y: f32) -> Result<(), ContentError> {
        let down = json!({
            "position": { "x": LIFTPOLE_X - LIFTCHAIR_OFFSET, "y": y, "z": LIFTCHAIR_HEIGHT, "vel_y": LIFTCHAIR_SPEED },
            "render": { "frame": "down" },
        });
        registry.create_from_template("liftchair", Some(&down))?;

        let roll = registry.rng().f32();
        let frame = if roll < 0.01 {
            "up-yeti"
        } else if roll < 0.35 {
            "up"
        } else {
            "up-occupied"
        };
        let up = json!({
            "position": { "x": LIFTPOLE_X + LIFTCHAIR_OFFSET, "y": y, "z": LIFTCHAIR_HEIGHT, "vel_y": -LIFTCHAIR_SPEED },
            "render": { "frame": frame },
        });
        registry.create_from_template("liftchair", Some(&up))?;
        Ok(())
    }
}

fn spawn_point(registry: &mut Registry, camera: &Camera, location: NpcLocation) -> (f32, f32) {
    let roll = registry.rng().f32();
    match location {
        NpcLocation::Left => (camera.x() - NPC_BORDER, camera.y() + roll * camera.scaled_height()),
        NpcLocation::Right => (
            camera.x() + camera.scaled_width() + NPC_BORDER,
            camera.y() + roll * camera.scaled_height(),
        ),
        NpcLocation::Top => (camera.x() + roll * camera.scaled_width(), camera.y() - NPC_BORDER),
        NpcLocation::Bottom => (
            camera.x() + roll * camera.scaled_width(),
            camera.y() + camera.scaled_height() + NPC_BORDER,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::position::Position;
    use crate::resources::scriptlibrary::ScriptLibrary;
    use crate::systems::default_systems;

    fn registry() -> Registry {
        let mut registry = Registry::with_seed(7);
        registry.add_systems(default_systems());
        crate::scripts::register_all(&mut registry.world_mut().resource_mut::<ScriptLibrary>());
        content::install(&mut registry).unwrap();
        registry
    }

    fn trees_only() -> Vec<ObstacleDef> {
        vec![ObstacleDef {
            template: "tree".to_string(),
            chance: 1.0,
            min: 2,
            max: 2,
            flip: true,
        }]
    }

    #[test]
    fn single_visible_block_is_generated_once() {
        let mut registry = registry();
        let mut camera = Camera::new(1.0, 300.0, 300.0);
        camera.center_on(151.0, 151.0);
        let mut generator = MapGenerator::new(trees_only(), Vec::new(), 384.0, &camera);

        assert_eq!(generator.visible_range(&camera), (0, 0, 1, 1));
        generator.update(&mut registry, &camera, 0.05).unwrap();
        assert_eq!(generator.block_count(), 1);

        let first = generator.block_entities(0, 0).unwrap().to_vec();
        assert_eq!(first.len(), 2);
        for &entity in &first {
            let pos = registry.get::<Position>(entity).unwrap();
            assert!((0.0..384.0).contains(&pos.x));
            assert!((0.0..384.0).contains(&pos.y));
        }

        generator.update(&mut registry, &camera, 0.05).unwrap();
        assert_eq!(generator.block_entities(0, 0).unwrap(), first.as_slice());
    }

    #[test]
    fn scrolling_drops_old_blocks_and_generates_new_ones() {
        let mut registry = registry();
        let mut camera = Camera::new(1.0, 300.0, 300.0);
        camera.center_on(151.0, 151.0);
        let mut generator = MapGenerator::new(trees_only(), Vec::new(), 384.0, &camera);
        generator.update(&mut registry, &camera, 0.05).unwrap();
        let old = generator.block_entities(0, 0).unwrap().to_vec();

        camera.center_on(384.0 + 151.0, 151.0);
        assert_eq!(generator.visible_range(&camera), (1, 0, 2, 1));
        generator.update(&mut registry, &camera, 0.05).unwrap();
        assert_eq!(generator.block_count(), 1);
        assert!(generator.block_entities(0, 0).is_none());
        assert_eq!(generator.block_entities(1, 0).unwrap().len(), 2);

        // removal happens at the end of the next tick
        assert!(old.iter().all(|&e| registry.is_removal_pending(e)));
        registry.update(0.05).unwrap();
        assert!(old.iter().all(|&e| !registry.contains(e)));
    }

    #[test]
    fn lift_poles_run_down_their_column() {
        let mut registry = registry();
        let mut camera = Camera::new(1.0, 300.0, 300.0);
        camera.center_on(-384.0 + 151.0, 151.0);
        let mut generator = MapGenerator::new(Vec::new(), Vec::new(), 384.0, &camera);
        generator.update(&mut registry, &camera, 0.05).unwrap();

        let poles = generator.block_entities(-1, 0).unwrap();
        assert_eq!(poles.len(), 2);
        let ys: Vec<f32> = poles
            .iter()
            .map(|&e| registry.get::<Position>(e).unwrap().y)
            .collect();
        assert_eq!(ys, vec![0.0, 192.0]);
    }

    #[test]
    fn lift_chairs_follow_cadence() {
        let mut registry = registry();
        let camera = Camera::new(1.0, 300.0, 300.0);
        let mut generator = MapGenerator::new(Vec::new(), Vec::new(), 384.0, &camera);

        // 3 units per second until the threshold of 32
        for _ in 0..10 {
            generator.update(&mut registry, &camera, 1.0).unwrap();
        }
        assert!(registry.entities_with::<Position>().is_empty());
        generator.update(&mut registry, &camera, 1.0).unwrap();
        assert_eq!(registry.entities_with::<Position>().len(), 4);
    }

    #[test]
    fn bottom_npcs_wait_for_vertical_movement() {
        let mut registry = registry();
        let mut camera = Camera::new(1.0, 300.0, 300.0);
        camera.center_on(151.0, 151.0);
        let npcs = vec![NpcDef {
            template: "newbie".to_string(),
            chance: 1.0,
            location: NpcLocation::Bottom,
            overrides: None,
        }];
        let mut generator = MapGenerator::new(Vec::new(), npcs, 384.0, &camera);
        generator.update(&mut registry, &camera, 0.0).unwrap();
        assert!(registry.entities_with::<crate::components::script::Script>().is_empty());

        camera.center_on(151.0, 151.0 + 40.0);
        generator.update(&mut registry, &camera, 0.0).unwrap();
        let spawned = registry.entities_with::<crate::components::script::Script>();
        assert_eq!(spawned.len(), 1);
        let pos = registry.get::<Position>(spawned[0]).unwrap();
        assert_eq!(pos.y, (camera.y() + camera.scaled_height() + NPC_BORDER).floor());
    }
}
