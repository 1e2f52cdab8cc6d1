//! Gameplay scripts.
//!
//! Every script is registered in the [`ScriptLibrary`] under the name entity
//! templates use for it. The player is a stateful [`ScriptHandler`]
//! (`skier`); everything else is a small set of plain functions keeping its
//! state in the script's [`ScriptData`].
//!
//! [`ScriptHandler`]: crate::components::script::ScriptHandler

use bevy_ecs::prelude::Entity;

use crate::components::script::Script;
use crate::components::scriptdata::ScriptData;
use crate::registry::Registry;
use crate::resources::scriptlibrary::ScriptLibrary;

pub mod dog;
pub mod movingtree;
pub mod newbie;
pub mod ramp;
pub mod score;
pub mod skier;
pub mod snowboarder;
pub mod yeti;

/// Register every gameplay script.
pub fn register_all(library: &mut ScriptLibrary) {
    library.register_handler("skier", skier::factory);
    library.register_functions("yeti", yeti::FUNCTIONS);
    library.register_functions("dog", dog::FUNCTIONS);
    library.register_functions("newbie", newbie::FUNCTIONS);
    library.register_functions("movingtree", movingtree::FUNCTIONS);
    library.register_functions("snowboarder", snowboarder::FUNCTIONS);
    library.register_functions("score", score::FUNCTIONS);
    library.register_functions("rampSmall", ramp::SMALL);
    library.register_functions("rampLarge", ramp::LARGE);
}

/// Run `f` on the script data of `entity`.
pub(crate) fn with_data<R>(registry: &mut Registry, entity: Entity, f: impl FnOnce(&mut ScriptData) -> R) -> Option<R> {
    registry
        .get_mut::<Script>(entity)
        .map(|mut script| f(&mut script.data))
}

/// Uniform random value in `[low, high)`.
pub(crate) fn random_range(registry: &mut Registry, low: f32, high: f32) -> f32 {
    low + registry.rng().f32() * (high - low)
}
