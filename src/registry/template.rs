//! Entity templates and component field layering.
//!
//! A [`Template`] maps a system name to a JSON object holding the initial
//! field values of that system's component. At creation time the registry
//! layers the template fields and then the caller's overrides on top of each
//! other (later layers win, key by key) and deserializes the result into the
//! component type. Fields absent from every layer keep the component's
//! `Default` value.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ContentError;

/// Named recipe of initial component values keyed by system name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    components: FxHashMap<String, Value>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of one component's fields.
    pub fn with(mut self, system: &str, fields: Value) -> Self {
        self.components.insert(system.to_string(), fields);
        self
    }

    pub fn systems(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn uses(&self, system: &str) -> bool {
        self.components.contains_key(system)
    }

    pub fn fields(&self, system: &str) -> Option<&Value> {
        self.components.get(system)
    }
}

/// Parse a JSON object of `name -> template` pairs.
pub fn parse_templates(json: &str) -> Result<FxHashMap<String, Template>, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse {
        what: "entity templates",
        source,
    })
}

/// Layer the given field objects in order and deserialize the result.
///
/// `null` layers are skipped; anything else that is not an object is a
/// content error. Layering is shallow: an override replaces a whole field
/// value, nested objects included.
pub fn build_component<T: DeserializeOwned>(
    system: &str,
    layers: &[&Value],
) -> Result<T, ContentError> {
    let mut merged = Map::new();
    for layer in layers {
        match layer {
            Value::Null => {}
            Value::Object(fields) => {
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
            }
            _ => return Err(ContentError::NotAnObject(system.to_string())),
        }
    }
    serde_json::from_value(Value::Object(merged)).map_err(|source| {
        ContentError::InvalidComponent {
            system: system.to_string(),
            source,
        }
    })
}

/// Merge two override objects one level deep (per system, per field).
///
/// Used when a spawner adds its own fields (typically a position) to the
/// overrides carried by a spawn table entry.
pub fn merge_overrides(base: Option<&Value>, extra: Value) -> Value {
    let Some(Value::Object(base)) = base else {
        return extra;
    };
    let mut merged = base.clone();
    if let Value::Object(extra) = extra {
        for (system, fields) in extra {
            match (merged.entry(system).or_insert(Value::Null), fields) {
                (Value::Object(existing), Value::Object(fields)) => existing.extend(fields),
                (slot, fields) => *slot = fields,
            }
        }
    }
    Value::Object(merged)
}
