//! A playable level.
//!
//! [`Level`] ties the registry, the camera and the map generator together:
//! it spawns the player, keeps the camera ahead of it, unleashes the yeti
//! once the player has gone far enough and reports HUD statistics.
//!
//! One call to [`Level::input`] followed by [`Level::update`] makes a tick;
//! [`Level::render`] may be called any number of times in between with the
//! interpolation fraction of the fixed-step clock.

use bevy_ecs::prelude::Entity;
use log::info;
use serde_json::json;

use crate::components::position::Position;
use crate::content;
use crate::mapgenerator::MapGenerator;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::renderer::Renderer;
use crate::resources::camera::Camera;
use crate::resources::debugmode::DebugMode;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::scriptlibrary::ScriptLibrary;
use crate::scripts;
use crate::scripts::yeti;
use crate::systems::default_systems;
use crate::systems::script::ScriptSystem;

/// World units per metre.
pub const UNITS_PER_METRE: f32 = 24.24;
/// The yeti comes out after this many metres.
pub const YETI_DISTANCE: f32 = 666.0;
/// How far ahead of the player the camera looks, per unit of downhill speed.
const LOOK_AHEAD: f32 = 8.5;
/// How far outside the view the yeti appears.
const YETI_BORDER: f32 = 64.0;

/// What the HUD shows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HudStats {
    pub score: i32,
    pub distance_m: i32,
    /// Seconds the player has been alive.
    pub time: f32,
    pub speed_kmh: i32,
}

impl HudStats {
    /// Elapsed time as `m:ss.mmm`.
    pub fn time_text(&self) -> String {
        let millis = (self.time * 1000.0).floor() as u64;
        format!("{}:{:02}.{:03}", millis / 60_000, millis / 1000 % 60, millis % 1000)
    }
}

pub struct Level {
    registry: Registry,
    camera: Camera,
    map: MapGenerator,
    player: Option<Entity>,
    yeti: Option<Entity>,
    time: f32,
    /// Last known score, kept once the player is gone.
    score: i32,
}

impl Level {
    /// Set up a level from `config`. A seed of 0 picks a random one.
    pub fn new(config: &GameConfig) -> Result<Self, ContentError> {
        let mut registry = match config.seed {
            0 => Registry::new(),
            seed => Registry::with_seed(seed),
        };
        registry.add_systems(default_systems());
        scripts::register_all(&mut registry.world_mut().resource_mut::<ScriptLibrary>());
        content::install(&mut registry)?;
        registry.insert_resource(config.physics());
        registry.insert_resource(config.clone());
        if config.collision_boxes {
            registry.insert_resource(DebugMode);
        }

        let mut camera = Camera::new(
            config.camera_scale,
            config.camera_width as f32,
            config.camera_height as f32,
        );

        let player = registry.create_from_template("skier", None)?;
        if let Some(pos) = registry.get::<Position>(player) {
            camera.center_on(pos.x, pos.y);
        }
        let map = MapGenerator::with_builtin_tables(config.block_size as f32, &camera)?;

        info!(
            "level ready: view {}x{} at {}x, blocks of {}",
            camera.width(),
            camera.height(),
            camera.scale(),
            map.block_size()
        );

        Ok(Self {
            registry,
            camera,
            map,
            player: Some(player),
            yeti: None,
            time: 0.0,
            score: 0,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The player entity while it exists.
    pub fn player(&self) -> Option<Entity> {
        self.player.filter(|&e| self.registry.contains(e))
    }

    pub fn yeti(&self) -> Option<Entity> {
        self.yeti.filter(|&e| self.registry.contains(e))
    }

    pub fn update(&mut self, delta: f32) -> Result<(), ContentError> {
        self.player = self.player();
        self.yeti = self.yeti();

        if let Some(pos) = self.player.and_then(|e| self.registry.get::<Position>(e)).copied() {
            self.camera.set_target(pos.x, pos.y + pos.vel_y * LOOK_AHEAD);
            if self.yeti.is_none() && pos.y >= YETI_DISTANCE * UNITS_PER_METRE {
                self.spawn_yeti(&pos)?;
            }
        } else if let Some(pos) = self.yeti.and_then(|e| self.registry.get::<Position>(e)) {
            self.camera.set_target(pos.x, pos.y);
        }

        self.camera.update();
        self.map.update(&mut self.registry, &self.camera, delta)?;
        self.registry.update(delta)?;

        if let Some(player) = self.player() {
            self.time += delta;
            if let Some(data) = ScriptSystem::data(&self.registry, player) {
                self.score = data.integer("score");
            }
        }
        Ok(())
    }

    fn spawn_yeti(&mut self, player: &Position) -> Result<(), ContentError> {
        let offset = self.camera.scaled_width() / 2.0 + YETI_BORDER;
        let x = if self.registry.rng().bool() {
            player.x - offset
        } else {
            player.x + offset
        };
        let overrides = json!({ "position": { "x": x, "y": player.y - YETI_BORDER } });
        let yeti = self.registry.create_from_template("yeti", Some(&overrides))?;
        if let Some(target) = self.player {
            scripts::with_data(&mut self.registry, yeti, |data| data.set_entity(yeti::TARGET, target));
        }
        info!("the yeti is out at ({x:.0}, {:.0})", player.y - YETI_BORDER);
        self.yeti = Some(yeti);
        Ok(())
    }

    /// Hand this tick's input to the player.
    pub fn input(&mut self, input: &InputState) {
        if let Some(player) = self.player() {
            self.registry.input(player, input);
        }
    }

    pub fn render(&mut self, renderer: &mut dyn Renderer, lerp: f32) {
        self.camera.lerp(lerp);
        self.registry.render(renderer, &self.camera, lerp);
    }

    pub fn stats(&self) -> HudStats {
        let (distance_m, speed_kmh) = match self.player().and_then(|e| self.registry.get::<Position>(e)) {
            Some(pos) => {
                let dx = pos.x - pos.last_x;
                let dy = pos.y - pos.last_y;
                let travelled = (dx * dx + dy * dy).sqrt();
                (
                    (pos.y / UNITS_PER_METRE).round() as i32,
                    (travelled / 1000.0 * 3600.0).round() as i32,
                )
            }
            None => (0, 0),
        };
        HudStats {
            score: self.score,
            distance_m,
            time: self.time,
            speed_kmh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            seed: 42,
            ..GameConfig::new()
        }
    }

    #[test]
    fn time_text_formats_minutes_seconds_and_millis() {
        let stats = HudStats {
            time: 75.25,
            ..Default::default()
        };
        assert_eq!(stats.time_text(), "1:15.250");
    }

    #[test]
    fn new_level_has_a_player_in_view() {
        let level = Level::new(&config()).unwrap();
        let player = level.player().unwrap();
        let pos = level.registry().get::<Position>(player).unwrap();
        let view_x = level.camera().x() + level.camera().scaled_width() / 2.0;
        assert!((view_x - pos.x).abs() < 1.0);
        assert!(level.yeti().is_none());
    }

    #[test]
    fn yeti_appears_past_the_trigger_distance() {
        let mut level = Level::new(&config()).unwrap();
        let player = level.player().unwrap();
        level
            .registry_mut()
            .get_mut::<Position>(player)
            .unwrap()
            .y = YETI_DISTANCE * UNITS_PER_METRE + 10.0;

        level.update(0.05).unwrap();
        let yeti = level.yeti().unwrap();
        let target = ScriptSystem::data(level.registry(), yeti)
            .and_then(|data| data.get_entity(yeti::TARGET));
        assert_eq!(target, Some(player));
    }
}
