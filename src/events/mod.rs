//! Entity event plumbing.
//!
//! - [`bus`] – per-entity subscription tables and handler types
//! - [`collision`] – payload shared by collision dispatches

pub mod bus;
pub mod collision;
