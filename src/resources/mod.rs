//! Resources stored in the registry world or owned by the level.
//!
//! Overview
//! - `animationstore` – per-sprite animation tables
//! - `camera` – scrolling view with target following and interpolation
//! - `debugmode` – presence enables debug overlays
//! - `gameconfig` – INI-backed settings
//! - `input` – per-tick snapshot of the game keys
//! - `physics` – gravity, friction and velocity cut-off
//! - `scriptlibrary` – script names to bindings
//! - `trackstate` – trail clock and fading orphan trails
//! - `worldtime` – simulation clock and the fixed-step accumulator
pub mod animationstore;
pub mod camera;
pub mod debugmode;
pub mod gameconfig;
pub mod input;
pub mod physics;
pub mod scriptlibrary;
pub mod trackstate;
pub mod worldtime;
