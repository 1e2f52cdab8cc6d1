//! Components attached to entities.
//!
//! Each component belongs to exactly one system and is built from the
//! template field object keyed by that system's name.
//!
//! Submodules overview:
//! - [`animation`] – playback state of a sprite animation
//! - [`collision`] – box extents and type masks for swept collision tests
//! - [`position`] – world position, velocity and physics multipliers
//! - [`prune`] – automatic removal rules (lifetime, distance, off-camera)
//! - [`render`] – sprite, frame and shadow to draw
//! - [`script`] – scripted behaviour bound by name
//! - [`scriptdata`] – typed key/value state of function-bound scripts
//! - [`tracks`] – ski trail segments left on the snow

pub mod animation;
pub mod collision;
pub mod position;
pub mod prune;
pub mod render;
pub mod script;
pub mod scriptdata;
pub mod tracks;
