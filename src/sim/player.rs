//! The single user-controlled actor

use glam::Vec2;

use super::collision::{Bounds, resolve_all};
use super::item::Item;
use super::motion::Knockback;
use crate::consts::*;

/// Player state. Game over is the `eliminated` flag; the player is never removed.
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Current room coordinate
    pub rx: i32,
    pub ry: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub eliminated: bool,
    pub item: Option<Item>,
    /// Ticks of movement lockout left
    pub stun: u32,
    /// Post-hit grace ticks left
    pub invulnerable: u32,
    pub knockback: Knockback,
    pub speed: f32,
}

impl Player {
    pub fn new(pos: Vec2, rx: i32, ry: i32, item: Option<Item>) -> Self {
        Self {
            pos,
            size: Vec2::splat(PLAYER_SIZE),
            rx,
            ry,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            eliminated: false,
            item,
            stun: 0,
            invulnerable: 0,
            knockback: Knockback::default(),
            speed: PLAYER_SPEED,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(self.pos, self.size)
    }

    pub fn can_move(&self) -> bool {
        !self.eliminated && self.stun == 0
    }

    pub fn move_x(&mut self, dx: f32) {
        if self.can_move() {
            self.pos.x += dx;
        }
    }

    pub fn move_y(&mut self, dy: f32) {
        if self.can_move() {
            self.pos.y += dy;
        }
    }

    /// Take a hit. Returns the HP removed (0 while invulnerable).
    pub fn damage(&mut self, amount: i32) -> i32 {
        if amount <= 0 || self.invulnerable > 0 || self.eliminated {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp - amount).max(0);
        self.invulnerable = PLAYER_INVULNERABLE_TICKS;
        if self.hp == 0 {
            self.eliminated = true;
            log::info!("Player eliminated in room ({}, {})", self.rx, self.ry);
        }
        before - self.hp
    }

    pub fn knock(&mut self, force: f32, angle: f32, duration: u32) {
        if !self.eliminated {
            self.knockback.start(force, angle, duration);
        }
    }

    /// Lock movement for at least `ticks`
    pub fn stun(&mut self, ticks: u32) {
        self.stun = self.stun.max(ticks);
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Timers, knockback drift, then push out of every wall
    pub fn tick<'a>(&mut self, walls: impl IntoIterator<Item = &'a Bounds>) {
        self.stun = self.stun.saturating_sub(1);
        self.invulnerable = self.invulnerable.saturating_sub(1);
        self.pos += self.knockback.step();
        resolve_all(walls, &mut self.pos, self.size);
    }
}
