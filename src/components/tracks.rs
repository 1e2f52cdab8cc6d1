//! Ski trails left in the snow.
//!
//! Template fields: `decal`, `duration`.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// One straight piece of trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPart {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Track clock time at which the part was started.
    pub time: f32,
}

impl TrackPart {
    /// Direction of the part in radians.
    pub fn angle(&self) -> f32 {
        (self.y2 - self.y1).atan2(self.x2 - self.x1)
    }
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tracks {
    /// Decal drawn along the parts.
    pub decal: String,
    /// Seconds until a part has faded out completely.
    pub duration: f32,
    #[serde(skip)]
    pub parts: Vec<TrackPart>,
}

impl Default for Tracks {
    fn default() -> Self {
        Self {
            decal: "skies".to_string(),
            duration: 10.0,
            parts: Vec::new(),
        }
    }
}

impl Tracks {
    /// Drop parts that are `duration` or more seconds old.
    ///
    /// Parts are appended in time order, so only the front is ever trimmed.
    pub fn prune(&mut self, now: f32) {
        let expired = self
            .parts
            .iter()
            .take_while(|part| now - part.time >= self.duration)
            .count();
        self.parts.drain(..expired);
    }

    /// Opacity of a part at time `now`.
    pub fn alpha(&self, part: &TrackPart, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - (now - part.time) / self.duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(time: f32) -> TrackPart {
        TrackPart {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            time,
        }
    }

    #[test]
    fn prune_trims_only_expired_front() {
        let mut tracks = Tracks {
            duration: 2.0,
            parts: vec![part(0.0), part(1.0), part(2.5), part(3.0)],
            ..Default::default()
        };
        tracks.prune(3.0);
        let times: Vec<f32> = tracks.parts.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![2.5, 3.0]);
    }

    #[test]
    fn alpha_fades_linearly() {
        let tracks = Tracks {
            duration: 10.0,
            ..Default::default()
        };
        assert_eq!(tracks.alpha(&part(0.0), 0.0), 1.0);
        assert!((tracks.alpha(&part(0.0), 2.5) - 0.75).abs() < 1e-6);
        assert_eq!(tracks.alpha(&part(0.0), 12.0), 0.0);
    }
}
