//! Rooms: one grid cell of the world and everything inside it

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::entity::Entity;
use super::fx::{Light, Particle};
use super::world::{Ctx, Env, Others, Outbox};

/// Static collision geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub bounds: Bounds,
}

impl Block {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            bounds: Bounds::new(x, y, w, h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    #[default]
    Passage,
    Dungeon,
}

/// Cardinal direction; north is -y
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Grid step toward the neighbouring room
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Door availability per side, fixed at generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Doors {
    pub north: bool,
    pub west: bool,
    pub south: bool,
    pub east: bool,
}

impl Doors {
    pub fn get(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, dir: Direction, open: bool) {
        match dir {
            Direction::North => self.north = open,
            Direction::East => self.east = open,
            Direction::South => self.south = open,
            Direction::West => self.west = open,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub rx: i32,
    pub ry: i32,
    pub w: f32,
    pub h: f32,
    pub kind: RoomKind,
    pub doors: Doors,
    pub layout: Vec<Block>,
    pub entities: Vec<Entity>,
    pub particles: Vec<Particle>,
    pub lights: Vec<Light>,
}

impl Room {
    pub fn new(rx: i32, ry: i32, w: f32, h: f32, kind: RoomKind, doors: Doors) -> Self {
        Self {
            rx,
            ry,
            w,
            h,
            kind,
            doors,
            layout: Vec::new(),
            entities: Vec::new(),
            particles: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Live opponents (the room-clear count)
    pub fn opponents(&self) -> usize {
        self.entities.iter().filter(|e| e.is_live_opponent()).count()
    }

    /// Everything the player collides with: blocks, then standing barricades
    pub fn walls(&self) -> Vec<Bounds> {
        self.layout
            .iter()
            .map(|block| block.bounds)
            .chain(self.entities.iter().filter(|e| e.is_barrier()).map(Entity::bounds))
            .collect()
    }

    /// One simulation pass over the room.
    ///
    /// Order: held item, player, entities in vector order (each removed right
    /// after its own tick once expired), then this pass's spawns are appended,
    /// then particles and lights tick. Objects spawned during the pass are not
    /// ticked until the next one.
    pub fn tick(&mut self, env: Env, max_particles: usize) {
        let opponents = self.opponents();
        let walls = self.walls();
        let mut ctx = Ctx::new(env, &self.layout, opponents);

        if let Some(mut item) = ctx.player.item.take() {
            item.tick(&mut ctx);
            ctx.player.item = Some(item);
        }
        ctx.player.tick(&walls);

        let mut i = 0;
        while let Some((entity, mut others)) = Others::split(&mut self.entities, i) {
            entity.tick(&mut others, &mut ctx);
            if entity.expired() {
                self.entities.remove(i);
            } else {
                i += 1;
            }
        }

        let Outbox {
            entities,
            particles,
            lights,
        } = ctx.finish();
        self.entities.extend(entities);

        self.particles.retain_mut(|p| {
            p.tick();
            !p.destroy
        });
        self.lights.retain_mut(|l| {
            l.tick();
            !l.destroy
        });
        self.particles.extend(particles);
        self.lights.extend(lights);

        if self.particles.len() > max_particles {
            let excess = self.particles.len() - max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Fold objects spawned outside a pass (item use) into the room
    pub fn absorb(&mut self, out: Outbox, max_particles: usize) {
        self.entities.extend(out.entities);
        self.particles.extend(out.particles);
        self.lights.extend(out.lights);
        if self.particles.len() > max_particles {
            let excess = self.particles.len() - max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Drop entities that finished dying outside a pass
    pub fn purge(&mut self) {
        self.entities.retain(|e| !e.expired());
    }

    /// The player is leaving: temporary entities go, effects are cleared
    pub fn clear_transients(&mut self) {
        for entity in self.entities.iter_mut().filter(|e| e.flags.temporary) {
            entity.vanish();
        }
        self.purge();
        self.particles.clear();
        self.lights.clear();
    }

    /// First live interactable entity whose box contains `point`
    pub fn entity_at(&self, point: Vec2) -> Option<usize> {
        self.entities
            .iter()
            .position(|e| !e.destroy && e.flags.interactable && e.bounds().contains(point))
    }
}
