//! Sprite animation tables.
//!
//! Every sprite owns a set of named animations. An animation is a uniform
//! frame duration plus an ordered list of frames; a frame may carry an event
//! name that is fired as `animation:<event>` when the frame is shown. In the
//! content tables frames are written as `"frame"` or `"frame:event"`.
//!
//! ```json
//! { "yeti": { "eat": { "frame_time": 0.28, "frames": ["eat1", "eat2", "eat3", "eat4:eatdone"] } } }
//! ```

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::registry::error::ContentError;

/// One frame of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Sprite frame name written to the render component.
    pub frame: String,
    /// Event fired when this frame is applied.
    pub event: Option<String>,
}

impl AnimationFrame {
    /// Parse `"frame"` or `"frame:event"`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((frame, event)) if !event.is_empty() => Self {
                frame: frame.to_string(),
                event: Some(event.to_string()),
            },
            Some((frame, _)) => Self {
                frame: frame.to_string(),
                event: None,
            },
            None => Self {
                frame: raw.to_string(),
                event: None,
            },
        }
    }
}

/// Immutable definition of a single named animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    /// Seconds each frame stays on screen. Zero means a still frame.
    pub frame_time: f32,
    pub frames: Vec<AnimationFrame>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnimation {
    frame_time: f32,
    frames: Vec<String>,
}

/// Central registry of animation tables keyed by sprite name.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnimationStore {
    sprites: FxHashMap<String, FxHashMap<String, Arc<SpriteAnimation>>>,
}

impl AnimationStore {
    /// Parse the JSON animation tables.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let raw: FxHashMap<String, FxHashMap<String, RawAnimation>> =
            serde_json::from_str(json).map_err(|source| ContentError::Parse {
                what: "sprite animations",
                source,
            })?;
        let mut store = Self::default();
        for (sprite, animations) in raw {
            for (name, animation) in animations {
                store.insert(
                    &sprite,
                    &name,
                    SpriteAnimation {
                        frame_time: animation.frame_time,
                        frames: animation.frames.iter().map(|f| AnimationFrame::parse(f)).collect(),
                    },
                );
            }
        }
        Ok(store)
    }

    pub fn insert(&mut self, sprite: &str, name: &str, animation: SpriteAnimation) {
        self.sprites
            .entry(sprite.to_string())
            .or_default()
            .insert(name.to_string(), Arc::new(animation));
    }

    pub fn get(&self, sprite: &str, name: &str) -> Option<Arc<SpriteAnimation>> {
        self.sprites.get(sprite)?.get(name).cloned()
    }

    /// Like [`get`](Self::get) but reports the miss as a content error.
    pub fn lookup(&self, sprite: &str, name: &str) -> Result<Arc<SpriteAnimation>, ContentError> {
        self.get(sprite, name).ok_or_else(|| ContentError::UnknownAnimation {
            sprite: sprite.to_string(),
            animation: name.to_string(),
        })
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_with_event_is_split() {
        let frame = AnimationFrame::parse("eat4:eatdone");
        assert_eq!(frame.frame, "eat4");
        assert_eq!(frame.event.as_deref(), Some("eatdone"));
        assert_eq!(AnimationFrame::parse("run1").event, None);
        assert_eq!(AnimationFrame::parse("run1:").event, None);
    }

    #[test]
    fn from_json_builds_tables() {
        let store = AnimationStore::from_json(
            r#"{ "dog": { "walk": { "frame_time": 0.1, "frames": ["walk1", "walk2"] } } }"#,
        )
        .unwrap();
        let walk = store.get("dog", "walk").unwrap();
        assert_eq!(walk.frames.len(), 2);
        assert_eq!(walk.frame_time, 0.1);
        assert!(store.get("dog", "sit").is_none());
    }

    #[test]
    fn lookup_miss_is_content_error() {
        let store = AnimationStore::default();
        let err = store.lookup("yeti", "dance").unwrap_err();
        assert!(matches!(err, ContentError::UnknownAnimation { .. }));
        assert_eq!(err.to_string(), "unknown animation 'dance' for sprite 'yeti'");
    }
}
