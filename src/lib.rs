//! Roomcrawl - simulation core of a room-by-room action game
//!
//! Core modules:
//! - `sim`: Fixed-timestep world model (player, rooms, entities, items, camera)
//! - `catalog`: Static per-type configuration for entities and items
//! - `persistence`: Save record types and the load/store boundary
//! - `settings`: Simulation-relevant preferences

pub mod catalog;
pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use catalog::Catalog;
pub use error::{LoadError, Result};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const FRAMERATE: u32 = 60;

    /// Room extent in world units (centered on the room origin)
    pub const ROOM_W: f32 = 24.0;
    pub const ROOM_H: f32 = 16.0;
    /// Thickness of the wall blocks that line a room
    pub const WALL_THICKNESS: f32 = 1.0;
    /// Width of the gap left in a wall for an open door
    pub const DOOR_GAP: f32 = 4.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 0.75;
    pub const PLAYER_SPEED: f32 = 0.35;
    pub const PLAYER_MAX_HP: i32 = 10;
    /// Grace ticks after the player takes a hit
    pub const PLAYER_INVULNERABLE_TICKS: u32 = 30;

    /// Ticks a dead entity lingers before removal (knocked-out window)
    pub const DESTROY_LINGER: u32 = FRAMERATE;

    /// Full room transition length; the room swap happens at the halfway point
    pub const TRANSITION_TICKS: u32 = FRAMERATE / 2;

    /// Maximum distance between the player and an interaction point
    pub const INTERACT_RADIUS: f32 = 7.0;

    /// Fallback box edge for entities missing from the catalog
    pub const DEFAULT_BOX: f32 = 0.75;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to a cartesian offset
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the ray from `from` toward `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-2.5 * PI) + FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        for turns in [-7.3f32, -1.1, 0.4, 5.9, 12.25] {
            let angle = normalize_angle(turns * PI);
            assert!((-PI..PI).contains(&angle), "{turns} -> {angle}");
        }
    }

    #[test]
    fn test_angle_to_cardinals() {
        let origin = Vec2::ZERO;
        assert!(angle_to(origin, Vec2::new(1.0, 0.0)).abs() < 1e-6);
        assert!((angle_to(origin, Vec2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
        let p = polar_to_cartesian(2.0, PI);
        assert!((p.x + 2.0).abs() < 1e-5 && p.y.abs() < 1e-5);
    }
}
