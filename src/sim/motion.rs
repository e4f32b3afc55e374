//! Knockback impulses shared by the player and ghostlike entities

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

/// A push that decays linearly to zero over its duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Knockback {
    /// Displacement per tick at the start of the push
    pub force: f32,
    /// Direction of the push (radians)
    pub angle: f32,
    pub duration: u32,
    /// Ticks remaining
    pub timer: u32,
}

impl Knockback {
    /// Start a new push, replacing a weaker one still in progress
    pub fn start(&mut self, force: f32, angle: f32, duration: u32) {
        if duration == 0 {
            return;
        }
        if self.timer == 0 || force >= self.remaining_force() {
            *self = Self {
                force,
                angle,
                duration,
                timer: duration,
            };
        }
    }

    pub fn active(&self) -> bool {
        self.timer > 0
    }

    fn remaining_force(&self) -> f32 {
        if self.duration == 0 {
            return 0.0;
        }
        self.force * self.timer as f32 / self.duration as f32
    }

    /// Displacement for this tick; advances the timer
    pub fn step(&mut self) -> Vec2 {
        if self.timer == 0 {
            return Vec2::ZERO;
        }
        let delta = polar_to_cartesian(self.remaining_force(), self.angle);
        self.timer -= 1;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knockback_decays_linearly() {
        let mut kb = Knockback::default();
        kb.start(0.4, 0.0, 4);
        let steps: Vec<f32> = (0..5).map(|_| kb.step().x).collect();
        let expected = [0.4, 0.3, 0.2, 0.1, 0.0];
        for (got, want) in steps.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6);
        }
        assert!(!kb.active());
    }

    #[test]
    fn test_weaker_push_does_not_override() {
        let mut kb = Knockback::default();
        kb.start(0.5, 0.0, 10);
        kb.start(0.1, 1.0, 10);
        assert_eq!(kb.angle, 0.0);
        kb.start(0.6, 1.0, 10);
        assert_eq!(kb.angle, 1.0);
    }
}
