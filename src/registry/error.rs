//! Configuration errors raised while instantiating content.
//!
//! Every variant points at a bug in the content tables (templates, sprite
//! animations, spawn tables) rather than a runtime condition, so callers are
//! expected to stop the simulation and report it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown entity template '{0}'")]
    UnknownTemplate(String),
    #[error("template '{template}' references unknown system '{system}'")]
    UnknownSystem { template: String, system: String },
    #[error("overrides for template '{template}' target system '{system}' which the template does not use")]
    OverrideWithoutComponent { template: String, system: String },
    #[error("unknown animation '{animation}' for sprite '{sprite}'")]
    UnknownAnimation { sprite: String, animation: String },
    #[error("unknown script '{0}'")]
    UnknownScript(String),
    #[error("component '{system}' requires a '{requires}' component on the same entity")]
    MissingComponent {
        system: &'static str,
        requires: &'static str,
    },
    #[error("fields for component '{0}' must be a JSON object")]
    NotAnObject(String),
    #[error("invalid fields for component '{system}': {source}")]
    InvalidComponent {
        system: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
