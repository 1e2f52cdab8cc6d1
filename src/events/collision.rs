//! Collision event payload.
//!
//! The collision system fires `collision:source` on the moving entity and
//! `collision:target` on the entity it ran into. Both dispatches share one
//! [`CollisionEvent`]; handlers may clear [`CollisionEvent::block_movement`]
//! to let the mover pass through, or set it to stop the mover at the point of
//! contact. The value seen after both dispatches decides the outcome.

/// Mutable payload shared by the two halves of a collision dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionEvent {
    /// Seeded from the obstacle's `blocks` flag.
    pub block_movement: bool,
}

impl CollisionEvent {
    pub fn new(block_movement: bool) -> Self {
        Self { block_movement }
    }
}
