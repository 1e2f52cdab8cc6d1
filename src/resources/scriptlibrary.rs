//! Script lookup table.
//!
//! Maps the script names used in entity templates to their bindings. The game
//! registers its scripts once at startup with
//! [`crate::scripts::register_all`]; a template naming a script that is not in
//! the library fails to instantiate.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

use crate::components::script::{HandlerFactory, ScriptBinding, ScriptFunctions};
use crate::registry::error::ContentError;

#[derive(Resource, Default)]
pub struct ScriptLibrary {
    bindings: FxHashMap<String, ScriptBinding>,
}

impl ScriptLibrary {
    pub fn register_functions(&mut self, name: &str, functions: ScriptFunctions) {
        self.bindings
            .insert(name.to_string(), ScriptBinding::Functions(functions));
    }

    pub fn register_handler(&mut self, name: &str, factory: HandlerFactory) {
        self.bindings
            .insert(name.to_string(), ScriptBinding::Handler(factory));
    }

    pub fn get(&self, name: &str) -> Option<ScriptBinding> {
        self.bindings.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<ScriptBinding, ContentError> {
        self.get(name)
            .ok_or_else(|| ContentError::UnknownScript(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
