//! Per-tick input snapshot.
//!
//! The embedding application polls its keyboard (or an autopilot) into a
//! [`RawInput`] once per tick and feeds it to [`InputState::update`], which
//! derives the edge flags. Gameplay code only ever reads [`InputState`].

use bevy_ecs::prelude::*;

/// Boolean action state with edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolState {
    /// Whether the action is currently held.
    pub active: bool,
    /// Whether the action went down this tick.
    pub just_pressed: bool,
    /// Whether the action went up this tick.
    pub just_released: bool,
}

impl BoolState {
    fn update(&mut self, active: bool) {
        self.just_pressed = active && !self.active;
        self.just_released = !active && self.active;
        self.active = active;
    }
}

/// Raw held/not-held state of every action, as polled from the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Actions the game reacts to.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: BoolState,
    pub down: BoolState,
    pub left: BoolState,
    pub right: BoolState,
    pub jump: BoolState,
}

impl InputState {
    /// Advance one tick with freshly polled key states.
    pub fn update(&mut self, raw: RawInput) {
        self.up.update(raw.up);
        self.down.update(raw.down);
        self.left.update(raw.left);
        self.right.update(raw.right);
        self.jump.update(raw.jump);
    }

    /// True if any direction went down this tick.
    pub fn any_direction_pressed(&self) -> bool {
        self.up.just_pressed || self.down.just_pressed || self.left.just_pressed || self.right.just_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputstate_default_all_inactive() {
        let input = InputState::default();
        for state in [input.up, input.down, input.left, input.right, input.jump] {
            assert!(!state.active);
            assert!(!state.just_pressed);
            assert!(!state.just_released);
        }
    }

    #[test]
    fn test_press_is_reported_once() {
        let mut input = InputState::default();
        let held = RawInput {
            left: true,
            ..Default::default()
        };
        input.update(held);
        assert!(input.left.active);
        assert!(input.left.just_pressed);
        assert!(input.any_direction_pressed());

        input.update(held);
        assert!(input.left.active);
        assert!(!input.left.just_pressed);
        assert!(!input.any_direction_pressed());
    }

    #[test]
    fn test_release_is_reported_once() {
        let mut input = InputState::default();
        input.update(RawInput {
            jump: true,
            ..Default::default()
        });
        input.update(RawInput::default());
        assert!(!input.jump.active);
        assert!(input.jump.just_released);
        input.update(RawInput::default());
        assert!(!input.jump.just_released);
    }
}
