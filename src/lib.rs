//! skidash library.
//!
//! Simulation core of a downhill skiing arcade game. The [`registry`] module
//! owns entities, templates and per-entity events; [`systems`] drive
//! physics, collision, animation, scripts, pruning and ski tracks over the
//! [`components`]; [`mapgenerator`] fills the slope around the camera and
//! [`game`] ties everything together into a playable level.

pub mod components;
pub mod content;
pub mod events;
pub mod game;
pub mod mapgenerator;
pub mod registry;
pub mod renderer;
pub mod resources;
pub mod scripts;
pub mod systems;
