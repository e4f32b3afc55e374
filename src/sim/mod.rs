//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `Arena::tick` per frame)
//! - Seeded RNG only (the arena's `Pcg32`)
//! - Stable iteration order (room entity vector order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod behavior;
pub mod camera;
pub mod collision;
pub mod entity;
pub mod fx;
pub mod generate;
pub mod item;
pub mod motion;
pub mod player;
pub mod roll;
pub mod room;
pub mod tables;
pub mod world;

pub use arena::{Arena, Transition};
pub use camera::Camera;
pub use collision::{Bounds, CONTACT_EPSILON, Push, collides, resolve};
pub use entity::{Entity, EntityKind, Projectile, ProjectileKind, Target};
pub use fx::{Light, Particle, ParticleKind};
pub use generate::{Adjacent, generate};
pub use item::{Item, ItemKind};
pub use motion::Knockback;
pub use player::Player;
pub use roll::roll;
pub use room::{Block, Direction, Doors, Room, RoomKind};
