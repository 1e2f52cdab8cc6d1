//! Game configuration resource.
//!
//! Settings loaded from an INI file. Defaults are safe to run with, so a
//! missing or partial file only overrides what it names.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_rate = 20
//! max_frame_delta_ms = 200
//! seed = 0
//!
//! [camera]
//! width = 640
//! height = 360
//! scale = 2
//!
//! [physics]
//! gravity = 0.84
//! friction = 0.825
//! velocity_min = 0.075
//!
//! [map]
//! block_size = 384
//!
//! [debug]
//! collision_boxes = false
//! ```
//!
//! A `seed` of 0 asks for an entropy-seeded run.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use super::physics::PhysicsSettings;

const DEFAULT_TICK_RATE: u32 = 20;
const DEFAULT_MAX_FRAME_DELTA_MS: u32 = 200;
const DEFAULT_SEED: u64 = 0;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 360;
const DEFAULT_CAMERA_SCALE: f32 = 2.0;
const DEFAULT_BLOCK_SIZE: u32 = 384;
const DEFAULT_COLLISION_BOXES: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Fixed simulation ticks per second.
    pub tick_rate: u32,
    /// Frame deltas above this reset the tick accumulator.
    pub max_frame_delta_ms: u32,
    /// Random seed, 0 for entropy.
    pub seed: u64,
    /// Viewport size in screen pixels.
    pub camera_width: u32,
    pub camera_height: u32,
    /// Screen pixels per world unit.
    pub camera_scale: f32,
    pub gravity: f32,
    pub friction: f32,
    pub velocity_min: f32,
    /// Side length of a map generator block in world units.
    pub block_size: u32,
    /// Draw collision boxes.
    pub collision_boxes: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        let physics = PhysicsSettings::default();
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
            seed: DEFAULT_SEED,
            camera_width: DEFAULT_CAMERA_WIDTH,
            camera_height: DEFAULT_CAMERA_HEIGHT,
            camera_scale: DEFAULT_CAMERA_SCALE,
            gravity: physics.gravity,
            friction: physics.friction,
            velocity_min: physics.velocity_min,
            block_size: DEFAULT_BLOCK_SIZE,
            collision_boxes: DEFAULT_COLLISION_BOXES,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);

        info!(
            "Loaded config: {} Hz, {}x{} view at {}x, block {}, seed {}",
            self.tick_rate, self.camera_width, self.camera_height, self.camera_scale, self.block_size, self.seed
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [simulation]
        if let Some(rate) = config.getuint("simulation", "tick_rate").ok().flatten() {
            self.tick_rate = (rate as u32).max(1);
        }
        if let Some(ms) = config.getuint("simulation", "max_frame_delta_ms").ok().flatten() {
            self.max_frame_delta_ms = ms as u32;
        }
        if let Some(seed) = config.getuint("simulation", "seed").ok().flatten() {
            self.seed = seed;
        }

        // [camera]
        if let Some(width) = config.getuint("camera", "width").ok().flatten() {
            self.camera_width = width as u32;
        }
        if let Some(height) = config.getuint("camera", "height").ok().flatten() {
            self.camera_height = height as u32;
        }
        if let Some(scale) = config.getfloat("camera", "scale").ok().flatten() {
            if scale > 0.0 {
                self.camera_scale = scale as f32;
            }
        }

        // [physics]
        if let Some(gravity) = config.getfloat("physics", "gravity").ok().flatten() {
            self.gravity = gravity as f32;
        }
        if let Some(friction) = config.getfloat("physics", "friction").ok().flatten() {
            self.friction = friction as f32;
        }
        if let Some(min) = config.getfloat("physics", "velocity_min").ok().flatten() {
            self.velocity_min = min as f32;
        }

        // [map]
        if let Some(size) = config.getuint("map", "block_size").ok().flatten() {
            self.block_size = (size as u32).max(1);
        }

        // [debug]
        if let Some(boxes) = config.getbool("debug", "collision_boxes").ok().flatten() {
            self.collision_boxes = boxes;
        }
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("simulation", "tick_rate", Some(self.tick_rate.to_string()));
        config.set(
            "simulation",
            "max_frame_delta_ms",
            Some(self.max_frame_delta_ms.to_string()),
        );
        config.set("simulation", "seed", Some(self.seed.to_string()));

        config.set("camera", "width", Some(self.camera_width.to_string()));
        config.set("camera", "height", Some(self.camera_height.to_string()));
        config.set("camera", "scale", Some(self.camera_scale.to_string()));

        config.set("physics", "gravity", Some(self.gravity.to_string()));
        config.set("physics", "friction", Some(self.friction.to_string()));
        config.set("physics", "velocity_min", Some(self.velocity_min.to_string()));

        config.set("map", "block_size", Some(self.block_size.to_string()));

        config.set("debug", "collision_boxes", Some(self.collision_boxes.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    pub fn physics(&self) -> PhysicsSettings {
        PhysicsSettings {
            gravity: self.gravity,
            friction: self.friction,
            velocity_min: self.velocity_min,
        }
    }

    /// Fixed tick length in seconds.
    pub fn tick_delta(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn max_frame_delta(&self) -> f32 {
        self.max_frame_delta_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_layout() {
        let config = GameConfig::new();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.block_size, 384);
        assert!((config.tick_delta() - 0.05).abs() < 1e-6);
        assert!((config.max_frame_delta() - 0.2).abs() < 1e-6);
        assert_eq!(config.physics(), PhysicsSettings::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[camera]\nscale = 3\n[physics]\ngravity = 1.5\n[debug]\ncollision_boxes = true\n")
            .unwrap();
        assert_eq!(config.camera_scale, 3.0);
        assert_eq!(config.gravity, 1.5);
        assert!(config.collision_boxes);
        assert_eq!(config.camera_width, 640);
        assert_eq!(config.friction, 0.825);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = GameConfig::with_path("/nonexistent/skidash.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.tick_rate, 20);
    }
}
