//! Collision volume and filtering masks.
//!
//! The volume is an axis-aligned box centred on the entity's ground position:
//! `width` along x, `depth` along y (the slope direction, usually thin) and
//! `height` straight up from the entity's z. An entity only tests itself
//! against others whose `type` intersects its own `with` mask, so a rock that
//! tests against nothing still gets hit by a skier that tests against rocks.
//!
//! Masks are written in content tables as flag names, e.g.
//! `"with": "OBSTACLE | EFFECT"`.

use bevy_ecs::prelude::Component;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision categories.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CollisionType: u32 {
        const OBSTACLE = 1;
        const EFFECT = 2;
        const NPC = 4;
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Collision {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Categories this entity belongs to.
    #[serde(rename = "type")]
    pub kind: CollisionType,
    /// Categories this entity tests against.
    pub with: CollisionType,
    /// Whether movers that hit this entity are stopped.
    pub blocks: bool,
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 16.0,
            depth: 1.0,
            kind: CollisionType::empty(),
            with: CollisionType::empty(),
            blocks: false,
        }
    }
}

impl Collision {
    /// Whether this entity wants to be tested against `other`.
    pub fn tests_against(&self, other: &Collision) -> bool {
        self.with.intersects(other.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_parse_from_flag_names() {
        let collision: Collision = serde_json::from_value(json!({
            "type": "NPC",
            "with": "OBSTACLE | EFFECT",
            "blocks": true
        }))
        .unwrap();
        assert_eq!(collision.kind, CollisionType::NPC);
        assert_eq!(collision.with, CollisionType::OBSTACLE | CollisionType::EFFECT);
        assert_eq!(collision.width, 16.0);
        assert!(collision.blocks);
    }

    #[test]
    fn tests_against_uses_with_and_type() {
        let skier = Collision {
            with: CollisionType::OBSTACLE,
            ..Default::default()
        };
        let rock = Collision {
            kind: CollisionType::OBSTACLE,
            ..Default::default()
        };
        let dog = Collision {
            kind: CollisionType::NPC,
            ..Default::default()
        };
        assert!(skier.tests_against(&rock));
        assert!(!skier.tests_against(&dog));
        assert!(!rock.tests_against(&skier));
    }
}
