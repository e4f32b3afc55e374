//! Cosmetic particles and point lights
//!
//! Both self-terminate; nothing else in the simulation reads them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Particle sprite families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Heart,
    Flame,
    Smoke,
    Spark,
}

impl ParticleKind {
    pub fn id(&self) -> &'static str {
        match self {
            ParticleKind::Heart => "heart",
            ParticleKind::Flame => "flame",
            ParticleKind::Smoke => "smoke",
            ParticleKind::Spark => "spark",
        }
    }
}

/// A point with velocity, acceleration and a fixed lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    /// Lifetime in ticks
    pub lifetime: u32,
    pub timer: u32,
    pub destroy: bool,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, vel: Vec2, lifetime: u32) -> Self {
        Self {
            kind,
            pos,
            vel,
            acc: Vec2::ZERO,
            lifetime,
            timer: 0,
            destroy: false,
        }
    }

    pub fn with_acc(mut self, acc: Vec2) -> Self {
        self.acc = acc;
        self
    }

    pub fn tick(&mut self) {
        self.timer += 1;
        self.pos += self.vel;
        self.vel += self.acc;
        if self.timer >= self.lifetime {
            self.destroy = true;
        }
    }
}

/// A point light fading linearly to zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub pos: Vec2,
    /// Luminance at spawn
    pub peak: f32,
    /// Current luminance
    pub lum: f32,
    pub duration: u32,
    pub timer: u32,
    pub destroy: bool,
}

impl Light {
    pub fn new(pos: Vec2, peak: f32, duration: u32) -> Self {
        Self {
            pos,
            peak,
            lum: peak,
            duration,
            timer: 0,
            destroy: duration == 0,
        }
    }

    pub fn tick(&mut self) {
        self.timer += 1;
        if self.timer >= self.duration {
            self.lum = 0.0;
            self.destroy = true;
        } else {
            self.lum = self.peak * (1.0 - self.timer as f32 / self.duration as f32);
        }
    }
}
