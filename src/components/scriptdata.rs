// Typed key/value payload carried by function-bound scripts

use bevy_ecs::prelude::Entity;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Opaque per-entity state of a script.
///
/// Templates and spawn overrides may seed `scalars`, `integers` and `flags`;
/// entity references only exist at runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptData {
    pub scalars: FxHashMap<String, f32>,
    pub integers: FxHashMap<String, i32>,
    pub flags: FxHashSet<String>,
    #[serde(skip)]
    pub entities: FxHashMap<String, Entity>,
}

impl ScriptData {
    pub fn set_scalar(&mut self, key: impl Into<String>, value: f32) {
        self.scalars.insert(key.into(), value);
    }
    pub fn get_scalar(&self, key: &str) -> Option<f32> {
        self.scalars.get(key).copied()
    }
    /// Scalar value, or zero when unset.
    pub fn scalar(&self, key: &str) -> f32 {
        self.get_scalar(key).unwrap_or(0.0)
    }
    pub fn set_integer(&mut self, key: impl Into<String>, value: i32) {
        self.integers.insert(key.into(), value);
    }
    pub fn get_integer(&self, key: &str) -> Option<i32> {
        self.integers.get(key).copied()
    }
    /// Integer value, or zero when unset.
    pub fn integer(&self, key: &str) -> i32 {
        self.get_integer(key).unwrap_or(0)
    }
    pub fn set_flag(&mut self, key: impl Into<String>) {
        self.flags.insert(key.into());
    }
    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }
    pub fn set_flag_to(&mut self, key: impl Into<String>, value: bool) {
        let key = key.into();
        if value {
            self.flags.insert(key);
        } else {
            self.flags.remove(&key);
        }
    }
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }
    pub fn set_entity(&mut self, key: impl Into<String>, entity: Entity) {
        self.entities.insert(key.into(), entity);
    }
    pub fn get_entity(&self, key: &str) -> Option<Entity> {
        self.entities.get(key).copied()
    }
    pub fn clear_entity(&mut self, key: &str) {
        self.entities.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_zero() {
        let data = ScriptData::default();
        assert_eq!(data.scalar("age"), 0.0);
        assert_eq!(data.integer("score"), 0);
        assert!(!data.has_flag("flip_x"));
    }

    #[test]
    fn set_flag_to_toggles() {
        let mut data = ScriptData::default();
        data.set_flag_to("sitting", true);
        assert!(data.has_flag("sitting"));
        data.set_flag_to("sitting", false);
        assert!(!data.has_flag("sitting"));
    }

    #[test]
    fn deserializes_seed_values() {
        let data: ScriptData = serde_json::from_value(json!({
            "integers": { "score": 500 },
            "flags": ["flip_x"]
        }))
        .unwrap();
        assert_eq!(data.integer("score"), 500);
        assert!(data.has_flag("flip_x"));
        assert!(data.entities.is_empty());
    }
}
