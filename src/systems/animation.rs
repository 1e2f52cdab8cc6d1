//! Sprite animation playback.
//!
//! Running animations accumulate `delta * speed`; every time a full frame
//! duration has passed the next frame (wrapping to the first) is written to
//! the entity's [`Render`] component and, if the frame carries an event,
//! `animation:<event>` is fired on the entity. Animations with a zero frame
//! time show their first frame and never advance.
//!
//! Gameplay code switches animations through [`AnimationSystem::play`] and
//! [`AnimationSystem::set`]. Asking for the animation that is already
//! playing keeps its phase; only the speed is updated.

use bevy_ecs::prelude::Entity;
use serde_json::Value;

use super::{System, SystemId, insert_component};
use crate::components::animation::Animation;
use crate::components::render::Render;
use crate::registry::Registry;
use crate::registry::error::ContentError;
use crate::resources::animationstore::{AnimationFrame, AnimationStore};

pub struct AnimationSystem;

impl System for AnimationSystem {
    fn id(&self) -> SystemId {
        SystemId::Animation
    }

    fn add(&self, registry: &mut Registry, entity: Entity, layers: &[&Value]) -> Result<(), ContentError> {
        insert_component::<Animation>(registry, entity, self.id(), layers)
    }

    /// Apply the template's animation, validating it against the sprite.
    fn finalize(&self, registry: &mut Registry, entity: Entity) -> Result<(), ContentError> {
        if registry.get::<Render>(entity).is_none() {
            return Err(ContentError::MissingComponent {
                system: "animation",
                requires: "render",
            });
        }
        let Some((name, speed)) = registry
            .get::<Animation>(entity)
            .map(|anim| (anim.animation.clone(), anim.speed))
        else {
            return Ok(());
        };
        set_animation(registry, entity, &name, speed, true).map(|_| ())
    }

    fn has(&self, registry: &Registry, entity: Entity) -> bool {
        registry.get::<Animation>(entity).is_some()
    }

    fn update(&self, registry: &mut Registry, delta: f32) {
        for entity in registry.entities_with::<Animation>() {
            let Some(anim) = registry.get::<Animation>(entity) else {
                continue;
            };
            if !anim.running || anim.next_frame_time <= 0.0 {
                continue;
            }
            let name = anim.animation.clone();
            let Some(sprite) = registry.get::<Render>(entity).map(|r| r.sprite.clone()) else {
                continue;
            };
            let lookup = registry.resource::<AnimationStore>().lookup(&sprite, &name);
            let Some(def) = registry.check(lookup) else {
                continue;
            };
            if def.frames.is_empty() {
                continue;
            }

            if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
                let speed = anim.speed;
                anim.time += delta * speed;
            }

            loop {
                let frame = {
                    let Some(mut anim) = registry.get_mut::<Animation>(entity) else {
                        break;
                    };
                    // an event listener may have switched animations
                    if anim.animation != name || anim.next_frame_time <= 0.0 || anim.time < anim.next_frame_time {
                        break;
                    }
                    anim.frame_index += 1;
                    if anim.frame_index >= def.frames.len() {
                        anim.frame_index = 0;
                    }
                    anim.time -= def.frame_time;
                    def.frames[anim.frame_index].clone()
                };
                apply_frame(registry, entity, &frame, def.frame_time);
            }
        }
    }
}

impl AnimationSystem {
    /// Switch to `name` and start playing it.
    pub fn try_play(registry: &mut Registry, entity: Entity, name: &str, speed: f32) -> Result<(), ContentError> {
        if set_animation(registry, entity, name, speed, false)? {
            if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
                anim.running = true;
            }
        }
        Ok(())
    }

    /// [`try_play`](Self::try_play), recording errors on the registry.
    pub fn play(registry: &mut Registry, entity: Entity, name: &str, speed: f32) {
        let result = Self::try_play(registry, entity, name, speed);
        registry.check(result);
    }

    /// Switch to `name` without touching the running flag.
    pub fn try_set(registry: &mut Registry, entity: Entity, name: &str, speed: f32) -> Result<(), ContentError> {
        set_animation(registry, entity, name, speed, false).map(|_| ())
    }

    /// [`try_set`](Self::try_set), recording errors on the registry.
    pub fn set(registry: &mut Registry, entity: Entity, name: &str, speed: f32) {
        let result = Self::try_set(registry, entity, name, speed);
        registry.check(result);
    }

    pub fn start(registry: &mut Registry, entity: Entity) {
        if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
            anim.running = true;
        }
    }

    pub fn stop(registry: &mut Registry, entity: Entity) {
        if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
            anim.running = false;
        }
    }
}

/// Returns whether the animation was (re)started from its first frame.
fn set_animation(
    registry: &mut Registry,
    entity: Entity,
    name: &str,
    speed: f32,
    force: bool,
) -> Result<bool, ContentError> {
    {
        let Some(mut anim) = registry.get_mut::<Animation>(entity) else {
            return Ok(false);
        };
        anim.speed = speed;
        if !force && anim.animation == name {
            return Ok(false);
        }
    }

    let sprite = registry
        .get::<Render>(entity)
        .map(|r| r.sprite.clone())
        .unwrap_or_default();
    let def = registry.resource::<AnimationStore>().lookup(&sprite, name)?;

    if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
        anim.animation = name.to_string();
        anim.frame_index = 0;
        anim.time = 0.0;
    }
    if let Some(frame) = def.frames.first() {
        apply_frame(registry, entity, frame, def.frame_time);
    }
    Ok(true)
}

fn apply_frame(registry: &mut Registry, entity: Entity, frame: &AnimationFrame, duration: f32) {
    if let Some(mut render) = registry.get_mut::<Render>(entity) {
        render.frame.clone_from(&frame.frame);
    }
    if let Some(mut anim) = registry.get_mut::<Animation>(entity) {
        anim.next_frame_time = duration;
    }
    if let Some(event) = &frame.event {
        registry.trigger(entity, entity, &format!("animation:{event}"));
    }
}
