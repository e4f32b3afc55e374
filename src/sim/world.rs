//! Per-pass tick context
//!
//! Behaviors never touch a room's collections directly. They read the static
//! layout, reach the player/camera/rng through `Ctx`, see the other entities
//! through `Others`, and queue new objects in the `Outbox`, which the room
//! drains after the pass. Anything spawned during a pass is first ticked on
//! the following tick.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::collision::Bounds;
use super::entity::{Entity, EntityKind};
use super::fx::{Light, Particle};
use super::player::Player;
use super::room::Block;
use crate::catalog::Catalog;

/// Arena-owned state lent to a room for one pass
pub struct Env<'a> {
    pub player: &'a mut Player,
    pub camera: &'a mut Camera,
    pub rng: &'a mut Pcg32,
    pub catalog: &'a Catalog,
    pub next_id: &'a mut u32,
}

/// Objects spawned during a pass
#[derive(Debug, Default)]
pub struct Outbox {
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    pub lights: Vec<Light>,
}

/// Everything a behavior may touch besides itself and its neighbours
pub struct Ctx<'a> {
    pub player: &'a mut Player,
    pub camera: &'a mut Camera,
    pub rng: &'a mut Pcg32,
    pub catalog: &'a Catalog,
    pub layout: &'a [Block],
    next_id: &'a mut u32,
    /// Live opponents in the room at the start of the pass
    pub opponents: usize,
    pub out: Outbox,
}

impl<'a> Ctx<'a> {
    pub fn new(env: Env<'a>, layout: &'a [Block], opponents: usize) -> Self {
        Self {
            player: env.player,
            camera: env.camera,
            rng: env.rng,
            catalog: env.catalog,
            layout,
            next_id: env.next_id,
            opponents,
            out: Outbox::default(),
        }
    }

    /// Allocate a fresh entity uid
    pub fn alloc_id(&mut self) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        id
    }

    /// Queue a new entity; returns its uid
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
        let uid = self.alloc_id();
        let entity = Entity::new(self.catalog, kind, pos, uid);
        self.out.entities.push(entity);
        uid
    }

    pub fn particle(&mut self, particle: Particle) {
        self.out.particles.push(particle);
    }

    pub fn light(&mut self, light: Light) {
        self.out.lights.push(light);
    }

    /// True if `bounds` penetrates any static block
    pub fn blocked(&self, bounds: &Bounds) -> bool {
        self.layout.iter().any(|block| block.bounds.overlaps(bounds))
    }

    /// End the pass, handing back what was spawned
    pub fn finish(self) -> Outbox {
        self.out
    }
}

/// Every entity in the room except the one being ticked, in room order
pub struct Others<'a> {
    before: &'a mut [Entity],
    after: &'a mut [Entity],
}

impl<'a> Others<'a> {
    /// Split `entities` into the entity at `index` and the rest
    pub fn split(entities: &'a mut [Entity], index: usize) -> Option<(&'a mut Entity, Others<'a>)> {
        if index >= entities.len() {
            return None;
        }
        let (before, rest) = entities.split_at_mut(index);
        let (current, after) = rest.split_first_mut()?;
        Some((current, Others { before, after }))
    }

    /// View over all entities (for actions not tied to an entity)
    pub fn all(entities: &'a mut [Entity]) -> Self {
        Self {
            before: entities,
            after: &mut [],
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.before.iter().chain(self.after.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.before.iter_mut().chain(self.after.iter_mut())
    }
}
