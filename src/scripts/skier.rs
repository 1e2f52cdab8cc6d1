//! The player's skier.
//!
//! A small state machine:
//!
//! - `Ground`: steering in 13 degree steps between facing right (0) and left
//!   (180), pushing off while facing straight down, walking uphill or
//!   sideways while facing sideways, and jumping.
//! - `Air`: quarter turns, flips and sideways poses, each counted as a stunt.
//!   Landing facing down without being mid-flip or posing scores the jump;
//!   anything else is a crash.
//! - `Fall`: knocked off balance in the air; always lands in a hard crash.
//! - `Crash`: lying in the snow until a direction is pressed. After a hard
//!   crash it takes two presses.
//!
//! Hitting a blocking obstacle near its top edge while jumping straight
//! launches the skier over it for bonus points. The running total is kept in
//! the script data as `integers["score"]`.

use bevy_ecs::prelude::Entity;
use serde_json::json;

use super::with_data;
use crate::components::collision::Collision;
use crate::components::position::Position;
use crate::components::render::Render;
use crate::components::script::ScriptHandler;
use crate::events::bus::{EntityEvent, EventHandler, EventPayload};
use crate::registry::Registry;
use crate::resources::input::InputState;
use crate::systems::animation::AnimationSystem;
use crate::systems::collision::COLLISION_SOURCE_EVENT;
use crate::systems::position::TOUCH_GROUND_EVENT;
use crate::systems::script::ScriptSystem;

/// Base ground speed.
pub const SPEED: f32 = 2.2;
/// Degrees turned per tick while steering.
pub const TURN_SPEED: i32 = 13;
pub const JUMP_FORCE: f32 = 3.0;
/// Speed multiplier of each push.
pub const PUSH_MULTIPLIER: f32 = 1.045;
pub const SPEED_MAX: f32 = 4.0;
/// Seconds between pushes.
pub const PUSH_DELAY: f32 = 0.75;
/// Decay of the extra speed while not pushing.
pub const SLOWDOWN: f32 = 0.94;
/// How far below an obstacle's top it can still be jumped off.
pub const OBSTACLE_JUMP_HEIGHT: f32 = 5.0;
pub const OBSTACLE_JUMP_FORCE: f32 = 8.0;

pub const SCORE_FLIP: f32 = 500.0;
pub const SCORE_TURN: f32 = 300.0;
pub const SCORE_POSE: f32 = 1000.0;
pub const SCORE_MAX_SPEED: f32 = 50.0;
pub const SCORE_SPEED_MIN: f32 = 6.0;
pub const SCORE_MAX_HEIGHT: f32 = 25.0;
pub const SCORE_HEIGHT_MIN: f32 = 9.0;
pub const SCORE_MULTIPLIER_LANDING: f32 = 2.0;
/// Points per unit of obstacle height for a perfect jump-off.
pub const SCORE_OBSTACLE_JUMP: f32 = 500.0;
pub const SCORE_CRASH_HARD: f32 = -1500.0;
pub const SCORE_CRASH_SOFT: f32 = -500.0;

/// Landing vertical speed below which a crash is hard.
const HARD_CRASH_VELOCITY: f32 = -4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkierState {
    #[default]
    Ground,
    Air,
    Fall,
    Crash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skier {
    angle: i32,
    state: SkierState,
    posing: bool,
    flip: i32,
    crashed_hard: bool,

    max_velocity: f32,
    push_timer: f32,

    stunt_flips: i32,
    stunt_turns: i32,
    stunt_poses: i32,
    max_speed: f32,
    max_height: f32,
    obstacles_hit: u32,

    score: i32,
}

impl Default for Skier {
    fn default() -> Self {
        Self {
            angle: 0,
            state: SkierState::Ground,
            posing: false,
            flip: 0,
            crashed_hard: false,
            max_velocity: SPEED,
            push_timer: 0.0,
            stunt_flips: 0,
            stunt_turns: 0,
            stunt_poses: 0,
            max_speed: 0.0,
            max_height: 0.0,
            obstacles_hit: 0,
            score: 0,
        }
    }
}

pub fn factory() -> Box<dyn ScriptHandler> {
    Box::new(Skier::default())
}

/// Round to the nearest multiple of 30 degrees, halves rounding up.
pub fn snap_angle(angle: i32) -> i32 {
    (angle as f32 / 30.0 + 0.5).floor() as i32 * 30
}

/// Round points down to a multiple of 50.
pub fn floor_score(score: f32) -> i32 {
    (score / 50.0).floor() as i32 * 50
}

impl Skier {
    pub fn state(&self) -> SkierState {
        self.state
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Points for the jump that just ended, before rounding.
    fn landing_score(&self) -> f32 {
        if self.max_speed < SCORE_SPEED_MIN || self.max_height < SCORE_HEIGHT_MIN {
            return 0.0;
        }
        let mut score = self.stunt_flips.abs() as f32 * SCORE_FLIP
            + self.stunt_turns.abs() as f32 * SCORE_TURN
            + self.stunt_poses as f32 * SCORE_POSE
            + self.max_speed * SCORE_MAX_SPEED
            + self.max_height * SCORE_MAX_HEIGHT;
        score *= (self.obstacles_hit + 1) as f32 * 2.0;
        if self.angle == 90 {
            score *= SCORE_MULTIPLIER_LANDING;
        }
        score
    }

    fn reset_scores(&mut self) {
        self.stunt_flips = 0;
        self.stunt_turns = 0;
        self.stunt_poses = 0;
        self.max_speed = 0.0;
        self.max_height = 0.0;
        self.obstacles_hit = 0;
    }

    /// Award points and pop up a score entity where the skier is.
    fn increase_score(&mut self, entity: Entity, registry: &mut Registry, score: f32) {
        let score = floor_score(score);
        if score == 0 {
            return;
        }
        self.score += score;
        let total = self.score;
        with_data(registry, entity, |data| data.set_integer("score", total));

        let Some(pos) = registry.get::<Position>(entity).copied() else {
            return;
        };
        let overrides = json!({
            "position": { "x": pos.x, "y": pos.y, "z": pos.z, "vel_y": -2.0 + pos.vel_y * 0.6 },
            "script": { "data": { "integers": { "score": score } } },
        });
        registry.spawn("score", Some(&overrides));
    }

    fn crash(&mut self, entity: Entity, registry: &mut Registry, hard: bool) {
        self.angle = 90;
        self.flip = 0;
        self.posing = false;
        self.crashed_hard = hard;
        self.max_velocity = SPEED;

        if let Some(mut pos) = registry.get_mut::<Position>(entity) {
            if hard {
                pos.vel_x = 0.0;
                pos.vel_y = 0.0;
            } else {
                pos.vel_y *= 0.15;
            }
        }
        let penalty = if hard { SCORE_CRASH_HARD } else { SCORE_CRASH_SOFT };
        self.increase_score(entity, registry, penalty);

        self.state = SkierState::Crash;
    }

    fn touch_ground(&mut self, entity: Entity, registry: &mut Registry) {
        let vel_z = registry.get::<Position>(entity).map_or(0.0, |p| p.vel_z);
        match self.state {
            SkierState::Air => {
                if self.flip > 0 || self.posing || self.angle == 270 {
                    self.crash(entity, registry, vel_z < HARD_CRASH_VELOCITY);
                } else {
                    self.state = SkierState::Ground;
                    let score = self.landing_score();
                    self.increase_score(entity, registry, score);
                }
            }
            SkierState::Fall => self.crash(entity, registry, true),
            SkierState::Ground | SkierState::Crash => {}
        }
        self.reset_scores();
    }

    fn collide(&mut self, entity: Entity, obstacle: Entity, registry: &mut Registry, payload: &mut EventPayload) {
        if !payload.collision().is_some_and(|c| c.block_movement) {
            return;
        }
        let (Some(pos), Some(own)) = (
            registry.get::<Position>(entity).copied(),
            registry.get::<Collision>(entity).copied(),
        ) else {
            return;
        };
        let (Some(pos2), Some(coll2)) = (
            registry.get::<Position>(obstacle).copied(),
            registry.get::<Collision>(obstacle).copied(),
        ) else {
            return;
        };

        let spot = coll2.height - (pos.z - pos2.z);
        if self.angle == 90 && self.state == SkierState::Air && spot <= OBSTACLE_JUMP_HEIGHT {
            let precision = spot / OBSTACLE_JUMP_HEIGHT;
            if let Some(mut pos) = registry.get_mut::<Position>(entity) {
                pos.vel_z += 1.0 + precision * OBSTACLE_JUMP_FORCE;
                pos.z = pos2.z + coll2.height;
            }
            self.obstacles_hit += 1;
            self.increase_score(entity, registry, precision * SCORE_OBSTACLE_JUMP * coll2.height);
        } else {
            if pos.on_ground() {
                self.crash(entity, registry, true);
            } else {
                self.state = SkierState::Fall;
            }
            self.reset_scores();
        }

        // continue just past the obstacle
        if let Some(mut pos) = registry.get_mut::<Position>(entity) {
            pos.y = pos2.y + coll2.depth / 2.0 + own.depth / 2.0 + 0.1;
        }
        if let Some(collision) = payload.collision_mut() {
            collision.block_movement = false;
        }
    }

    fn input_ground(&mut self, pos: &mut Position, input: &InputState) {
        if input.jump.active {
            self.angle = 90;
            pos.vel_z += JUMP_FORCE;
            self.state = SkierState::Air;
        } else if input.down.active {
            if self.angle == 90 && self.push_timer <= 0.0 {
                self.max_velocity = SPEED_MAX.min(self.max_velocity * PUSH_MULTIPLIER);
                self.push_timer = PUSH_DELAY;
            }
            self.angle = 90;
        } else if input.up.active {
            if self.angle == 180 || self.angle == 0 {
                pos.vel_y -= SPEED / 12.0;
            }
        } else if input.left.active {
            if self.angle == 180 {
                pos.vel_x -= SPEED / 7.0;
            } else {
                self.angle += TURN_SPEED;
            }
        } else if input.right.active {
            if self.angle == 0 {
                pos.vel_x += SPEED / 7.0;
            } else {
                self.angle -= TURN_SPEED;
            }
        } else {
            self.angle = snap_angle(self.angle);
        }
        self.angle = self.angle.clamp(0, 180);
    }

    fn input_air(&mut self, input: &InputState) {
        if input.left.just_pressed {
            self.angle += 90;
            self.flip = 0;
            self.stunt_turns -= 1;
        } else if input.right.just_pressed {
            self.angle -= 90;
            self.flip = 0;
            self.stunt_turns += 1;
        } else if input.up.just_pressed {
            if self.angle == 90 || self.angle == 270 {
                self.flip = if self.flip >= 2 { 0 } else { self.flip + 1 };
                self.stunt_flips -= 1;
            } else {
                self.toggle_pose();
            }
        } else if input.down.just_pressed {
            if self.angle == 90 || self.angle == 270 {
                self.flip = if self.flip <= 0 { 2 } else { self.flip - 1 };
                self.stunt_flips += 1;
            } else {
                self.toggle_pose();
            }
        }
        self.angle = self.angle.rem_euclid(360);
    }

    fn toggle_pose(&mut self) {
        self.posing = !self.posing;
        if self.posing {
            self.stunt_poses += 1;
        }
    }

    fn input_crash(&mut self, input: &InputState) {
        if !(input.left.just_pressed || input.right.just_pressed || input.down.just_pressed) {
            return;
        }
        if self.crashed_hard {
            self.crashed_hard = false;
            return;
        }
        self.state = SkierState::Ground;
        if input.left.just_pressed {
            self.angle = 180;
        } else if input.right.just_pressed {
            self.angle = 0;
        }
    }

    fn apply_velocity(&self, pos: &mut Position) {
        if self.state != SkierState::Ground {
            return;
        }
        let angle = snap_angle(self.angle);
        match angle {
            90 => pos.vel_y += self.max_velocity,
            30 | 60 | 120 | 150 => {
                let rad = (angle as f32).to_radians();
                pos.vel_x += rad.cos() * self.max_velocity;
                pos.vel_y += rad.sin() * self.max_velocity;
            }
            _ => {}
        }
    }

    /// Animation name and speed for the current state.
    fn animation(&self, pos: &Position) -> Option<(&'static str, f32)> {
        let angle = snap_angle(self.angle);
        let flip_animation = || match self.flip {
            1 => Some(("flip1", 1.0)),
            2 => Some(("flip2", 1.0)),
            _ => None,
        };

        match self.state {
            SkierState::Ground => match angle {
                90 if self.push_timer > PUSH_DELAY * 0.9 => Some(("movePush", 1.0)),
                90 => Some(("moveDown", pos.vel_y / 16.0)),
                0 | 180 if pos.vel_y < 0.0 => Some(("moveUp", (pos.vel_y / 2.0).abs())),
                0 | 180 if pos.vel_x != 0.0 => Some(("moveSide", (pos.vel_x / 5.5).abs())),
                0 | 180 => Some(("stand", 1.0)),
                30 | 150 => Some(("moveDiag1", pos.speed() / 15.75)),
                60 | 120 => Some(("moveDiag2", pos.speed() / 15.75)),
                _ => None,
            },
            SkierState::Air => match angle {
                90 if self.flip == 0 => Some(("jump", 1.0)),
                270 if self.flip == 0 => Some(("jumpBack", 1.0)),
                90 | 270 => flip_animation(),
                0 | 180 if self.posing => Some(("pose", 1.0)),
                0 | 180 => Some(("jumpSide", 1.0)),
                _ => None,
            },
            SkierState::Fall => Some(("fall", 1.0)),
            SkierState::Crash if self.crashed_hard => Some(("fallBuried", 1.0)),
            SkierState::Crash => Some(("fallSit", 1.0)),
        }
    }
}

impl ScriptHandler for Skier {
    fn create(&mut self, entity: Entity, registry: &mut Registry) {
        with_data(registry, entity, |data| data.set_integer("score", 0));
        registry.add_event_listener(entity, TOUCH_GROUND_EVENT, EventHandler::Function(ScriptSystem::forward_event));
        registry.add_event_listener(entity, COLLISION_SOURCE_EVENT, EventHandler::Function(ScriptSystem::forward_event));
    }

    fn update(&mut self, entity: Entity, registry: &mut Registry, delta: f32) {
        if self.push_timer > 0.0 {
            self.push_timer -= delta;
        } else {
            self.max_velocity = SPEED + (self.max_velocity - SPEED) * SLOWDOWN;
        }

        let pos = {
            let Some(mut pos) = registry.get_mut::<Position>(entity) else {
                return;
            };
            if !pos.on_ground() {
                self.max_speed = self.max_speed.max(pos.speed());
                self.max_height = self.max_height.max(pos.z);
            }
            self.apply_velocity(&mut pos);
            *pos
        };

        if let Some((name, speed)) = self.animation(&pos) {
            AnimationSystem::play(registry, entity, name, speed);
        }
        if let Some(mut render) = registry.get_mut::<Render>(entity) {
            render.flip_x = snap_angle(self.angle) > 90;
        }
    }

    fn input(&mut self, entity: Entity, registry: &mut Registry, input: &InputState) {
        let Some(mut pos) = registry.get_mut::<Position>(entity) else {
            return;
        };

        // launched by something else, e.g. a ramp
        if !pos.on_ground() && self.state == SkierState::Ground {
            self.state = SkierState::Air;
            self.angle = 90;
        }

        match self.state {
            SkierState::Ground => self.input_ground(&mut pos, input),
            SkierState::Air => self.input_air(input),
            SkierState::Fall => {}
            SkierState::Crash => self.input_crash(input),
        }
    }

    fn on_event(&mut self, event: &mut EntityEvent<'_>, payload: &mut EventPayload) {
        let entity = event.target;
        match event.name {
            TOUCH_GROUND_EVENT => self.touch_ground(entity, event.registry),
            COLLISION_SOURCE_EVENT => self.collide(entity, event.source, event.registry, payload),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_angle_rounds_half_up() {
        assert_eq!(snap_angle(0), 0);
        assert_eq!(snap_angle(14), 0);
        assert_eq!(snap_angle(15), 30);
        assert_eq!(snap_angle(103), 90);
        assert_eq!(snap_angle(105), 120);
        assert_eq!(snap_angle(180), 180);
    }

    #[test]
    fn floor_score_rounds_towards_negative_infinity() {
        assert_eq!(floor_score(1234.0), 1200);
        assert_eq!(floor_score(49.9), 0);
        assert_eq!(floor_score(-1500.0), -1500);
        assert_eq!(floor_score(-10.0), -50);
    }

    #[test]
    fn small_jumps_score_nothing() {
        let skier = Skier {
            max_speed: 10.0,
            max_height: 5.0,
            ..Default::default()
        };
        assert_eq!(skier.landing_score(), 0.0);
    }

    #[test]
    fn landing_score_combines_stunts_and_multipliers() {
        let skier = Skier {
            angle: 90,
            stunt_flips: -1,
            stunt_turns: 2,
            stunt_poses: 1,
            max_speed: 6.0,
            max_height: 10.0,
            obstacles_hit: 1,
            ..Default::default()
        };
        // (500 + 600 + 1000 + 300 + 250) * 4 * 2
        assert_eq!(skier.landing_score(), 21200.0);
    }

    #[test]
    fn ground_steering_clamps_and_snaps() {
        let mut skier = Skier::default();
        let mut pos = Position::default();
        let left = InputState {
            left: crate::resources::input::BoolState {
                active: true,
                ..Default::default()
            },
            ..Default::default()
        };
        for _ in 0..20 {
            skier.input_ground(&mut pos, &left);
        }
        assert_eq!(skier.angle, 180);

        skier.angle = 100;
        skier.input_ground(&mut pos, &InputState::default());
        assert_eq!(skier.angle, 90);
    }

    #[test]
    fn air_flips_cycle_through_three_states() {
        let mut skier = Skier {
            angle: 90,
            state: SkierState::Air,
            ..Default::default()
        };
        let up = InputState {
            up: crate::resources::input::BoolState {
                active: true,
                just_pressed: true,
                just_released: false,
            },
            ..Default::default()
        };
        skier.input_air(&up);
        skier.input_air(&up);
        assert_eq!(skier.flip, 2);
        skier.input_air(&up);
        assert_eq!(skier.flip, 0);
        assert_eq!(skier.stunt_flips, -3);
    }

    fn skier_registry() -> (Registry, Entity) {
        let mut registry = Registry::with_seed(3);
        registry.add_systems(crate::systems::default_systems());
        crate::scripts::register_all(
            &mut registry
                .world_mut()
                .resource_mut::<crate::resources::scriptlibrary::ScriptLibrary>(),
        );
        crate::content::install(&mut registry).unwrap();
        let entity = registry.create_from_template("skier", None).unwrap();
        (registry, entity)
    }

    #[test]
    fn falling_skier_always_lands_hard() {
        let (mut registry, entity) = skier_registry();
        {
            let mut pos = registry.get_mut::<Position>(entity).unwrap();
            pos.vel_x = 2.0;
            pos.vel_y = 3.0;
            pos.vel_z = -1.0;
        }
        let mut skier = Skier {
            state: SkierState::Fall,
            ..Default::default()
        };

        skier.touch_ground(entity, &mut registry);

        assert_eq!(skier.state(), SkierState::Crash);
        assert!(skier.crashed_hard);
        assert_eq!(skier.score(), -1500);
        let pos = registry.get::<Position>(entity).unwrap();
        assert_eq!((pos.vel_x, pos.vel_y), (0.0, 0.0));
    }

    #[test]
    fn gentle_air_crash_is_soft() {
        let (mut registry, entity) = skier_registry();
        registry.get_mut::<Position>(entity).unwrap().vel_z = -1.0;
        let mut skier = Skier {
            state: SkierState::Air,
            posing: true,
            ..Default::default()
        };

        skier.touch_ground(entity, &mut registry);

        assert!(!skier.crashed_hard);
        assert_eq!(skier.score(), -500);
    }

    #[test]
    fn hard_crash_needs_two_presses() {
        let mut skier = Skier {
            state: SkierState::Crash,
            crashed_hard: true,
            ..Default::default()
        };
        let right = InputState {
            right: crate::resources::input::BoolState {
                active: true,
                just_pressed: true,
                just_released: false,
            },
            ..Default::default()
        };
        skier.input_crash(&right);
        assert_eq!(skier.state, SkierState::Crash);
        skier.input_crash(&right);
        assert_eq!(skier.state, SkierState::Ground);
        assert_eq!(skier.angle, 0);
    }
}
