//! Built-in content tables.
//!
//! The game's entity templates, sprite animations and map generator spawn
//! tables are JSON files under `assets/content`, embedded at build time. They
//! are parsed once when a level is set up; any mistake in them is a
//! [`ContentError`].

use serde::Deserialize;
use serde_json::Value;

use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::registry::template::parse_templates;
use crate::resources::animationstore::AnimationStore;

pub const TEMPLATES_JSON: &str = include_str!("../assets/content/templates.json");
pub const SPRITES_JSON: &str = include_str!("../assets/content/sprites.json");
pub const OBSTACLES_JSON: &str = include_str!("../assets/content/obstacles.json");
pub const NPCS_JSON: &str = include_str!("../assets/content/npcs.json");

/// An obstacle the map generator may scatter over a block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleDef {
    pub template: String,
    /// Probability that the obstacle appears in a block at all.
    pub chance: f32,
    /// Inclusive count range once it does.
    pub min: u32,
    pub max: u32,
    /// Mirror half of the instances.
    #[serde(default)]
    pub flip: bool,
}

/// Screen edge an NPC enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NpcLocation {
    Left,
    Right,
    Top,
    Bottom,
}

/// An NPC the map generator may spawn while the camera moves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcDef {
    pub template: String,
    /// Probability per tick.
    pub chance: f32,
    pub location: NpcLocation,
    /// Extra creation overrides, merged with the spawn position.
    #[serde(default)]
    pub overrides: Option<Value>,
}

pub fn load_obstacles(json: &str) -> Result<Vec<ObstacleDef>, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse {
        what: "obstacle table",
        source,
    })
}

pub fn load_npcs(json: &str) -> Result<Vec<NpcDef>, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse {
        what: "npc table",
        source,
    })
}

/// Install the built-in templates and animations into `registry`.
pub fn install(registry: &mut Registry) -> Result<(), ContentError> {
    let templates = parse_templates(TEMPLATES_JSON)?;
    let count = templates.len();
    registry.add_templates(templates);

    let store = AnimationStore::from_json(SPRITES_JSON)?;
    let sprites = store.sprite_count();
    registry.insert_resource(store);

    log::info!("loaded {count} entity templates and animations for {sprites} sprites");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_parse() {
        let obstacles = load_obstacles(OBSTACLES_JSON).unwrap();
        assert_eq!(obstacles.len(), 17);
        assert!(obstacles.iter().all(|o| o.min <= o.max));

        let npcs = load_npcs(NPCS_JSON).unwrap();
        assert_eq!(npcs.len(), 7);
        assert_eq!(npcs[6].location, NpcLocation::Top);
        assert!(npcs[1].overrides.is_some());
    }

    #[test]
    fn every_spawnable_template_exists() {
        let templates = parse_templates(TEMPLATES_JSON).unwrap();
        for obstacle in load_obstacles(OBSTACLES_JSON).unwrap() {
            assert!(templates.contains_key(&obstacle.template), "{}", obstacle.template);
        }
        for npc in load_npcs(NPCS_JSON).unwrap() {
            assert!(templates.contains_key(&npc.template), "{}", npc.template);
        }
        for name in ["skier", "yeti", "score", "pee", "liftPole", "liftchair"] {
            assert!(templates.contains_key(name), "{name}");
        }
    }

    #[test]
    fn yeti_frames_carry_events() {
        let store = AnimationStore::from_json(SPRITES_JSON).unwrap();
        let eat = store.get("yeti", "eat").unwrap();
        assert_eq!(eat.frames.last().unwrap().event.as_deref(), Some("eatdone"));
    }
}
