//! Simulation clock resources.
//!
//! [`WorldTime`] is advanced once per fixed tick by the registry. The
//! [`FixedStep`] accumulator turns variable display-frame deltas into whole
//! fixed ticks plus an interpolation fraction for rendering.

use bevy_ecs::prelude::Resource;

/// Fixed simulation rate in ticks per second.
pub const DEFAULT_TICK_RATE: u32 = 20;
/// Frame deltas above this are treated as a stall and discarded.
pub const DEFAULT_MAX_FRAME_DELTA: f32 = 0.2;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct WorldTime {
    /// Seconds simulated since the registry was created.
    pub elapsed: f32,
    /// Delta of the last tick in seconds.
    pub delta: f32,
    /// Number of ticks run so far.
    pub frame_count: u64,
}

/// Fixed-timestep accumulator.
#[derive(Debug, Clone, Copy)]
pub struct FixedStep {
    step: f32,
    max_frame_delta: f32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE, DEFAULT_MAX_FRAME_DELTA)
    }
}

impl FixedStep {
    pub fn new(tick_rate: u32, max_frame_delta: f32) -> Self {
        Self {
            step: 1.0 / tick_rate.max(1) as f32,
            max_frame_delta,
            accumulator: 0.0,
        }
    }

    /// Duration of one tick in seconds.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed one display frame. Returns how many ticks to run.
    ///
    /// A frame longer than `max_frame_delta` resets the accumulator instead of
    /// trying to catch up.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        if frame_delta > self.max_frame_delta {
            self.accumulator = 0.0;
            return 0;
        }
        self.accumulator += frame_delta;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }

    /// Render interpolation fraction in `[0, 1)`.
    pub fn lerp(&self) -> f32 {
        self.accumulator / self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(0.03), 0);
        assert_eq!(clock.advance(0.03), 1);
        assert!((clock.lerp() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn runs_several_ticks_for_long_frame() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(0.16), 3);
        assert!((clock.lerp() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn stall_resets_accumulator() {
        let mut clock = FixedStep::default();
        clock.advance(0.04);
        assert_eq!(clock.advance(0.5), 0);
        assert_eq!(clock.lerp(), 0.0);
    }
}
