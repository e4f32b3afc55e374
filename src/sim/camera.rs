//! View offset: follows the player plus a decaying shake impulse

use glam::Vec2;
use rand::Rng;

/// Never authoritative over world state; the renderer only reads `get()`.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    pub pos: Vec2,
    /// Shake amplitude at the start of the impulse
    pub force: f32,
    pub duration: u32,
    /// Ticks of shake remaining
    pub timer: u32,
    /// Jitter sampled this tick
    jitter: Vec2,
    /// Shake disabled by settings
    pub muted: bool,
}

impl Camera {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    /// Raise the impulse; a weaker or shorter shake never shortens a stronger one
    pub fn shake(&mut self, force: f32, duration: u32) {
        if self.muted {
            return;
        }
        if force > self.force {
            self.force = force;
        }
        if duration > self.duration {
            self.duration = duration;
        }
        if duration > self.timer {
            self.timer = duration;
        }
    }

    /// Current shake amplitude
    pub fn intensity(&self) -> f32 {
        if self.timer == 0 || self.duration == 0 {
            return 0.0;
        }
        self.force * self.timer as f32 / self.duration as f32
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, target: Vec2, rng: &mut R) {
        self.pos = target;

        let intensity = self.intensity();
        self.jitter = if intensity > 0.0 {
            Vec2::new(
                intensity * rng.random_range(-25..=25) as f32 / 100.0,
                intensity * rng.random_range(-25..=25) as f32 / 100.0,
            )
        } else {
            Vec2::ZERO
        };

        if self.timer > 0 {
            self.timer -= 1;
            if self.timer == 0 {
                self.force = 0.0;
                self.duration = 0;
            }
        }
    }

    /// View center for the renderer
    pub fn get(&self) -> (f32, f32) {
        (self.pos.x + self.jitter.x, self.pos.y + self.jitter.y)
    }
}
