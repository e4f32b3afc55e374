//! The world root and per-frame entry point
//!
//! Owns the player, every discovered room, the camera, and the room-transition
//! state machine:
//!
//! ```text
//! Idle --(player crosses an open door)--> Transitioning { dir, timer = 30 }
//! Transitioning: timer -= 1 each tick
//!     timer == 15: swap rooms, place player at the entry edge
//!     timer == 0:  back to Idle
//! ```

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::Camera;
use super::generate::{Adjacent, generate};
use super::player::Player;
use super::room::{Direction, Room};
use super::world::{Ctx, Env, Others};
use crate::catalog::Catalog;
use crate::consts::*;
use crate::settings::Settings;

/// Room-transition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    Idle,
    Transitioning { dir: Direction, timer: u32 },
}

pub struct Arena {
    pub player: Player,
    rooms: Vec<Room>,
    pub camera: Camera,
    /// Ticks of suppressed movement input left
    pub frozen: u32,
    transition: Transition,
    rng: Pcg32,
    seed: u64,
    catalog: Arc<Catalog>,
    settings: Settings,
    next_id: u32,
    /// Ticks simulated since creation or load
    pub time_ticks: u64,
}

impl Arena {
    /// Fresh world: player at the origin of room (0, 0)
    pub fn new(seed: u64, catalog: Arc<Catalog>, settings: Settings) -> Self {
        let player = Player::new(Vec2::ZERO, 0, 0, None);
        Self::from_parts(player, Vec::new(), seed, catalog, settings)
    }

    /// Assemble a world from loaded parts
    pub fn from_parts(
        player: Player,
        rooms: Vec<Room>,
        seed: u64,
        catalog: Arc<Catalog>,
        settings: Settings,
    ) -> Self {
        let next_id = rooms
            .iter()
            .flat_map(|room| room.entities.iter().map(|e| e.uid))
            .max()
            .unwrap_or(0)
            + 1;
        let mut camera = Camera::new(player.pos);
        camera.muted = !settings.effective_screen_shake();
        Self {
            player,
            rooms,
            camera,
            frozen: 0,
            transition: Transition::Idle,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            catalog,
            settings,
            next_id,
            time_ticks: 0,
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// The room at `(rx, ry)` if it has been generated
    pub fn room(&self, rx: i32, ry: i32) -> Option<&Room> {
        self.rooms.iter().find(|r| r.rx == rx && r.ry == ry)
    }

    fn room_index(&self, rx: i32, ry: i32) -> Option<usize> {
        self.rooms.iter().position(|r| r.rx == rx && r.ry == ry)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.room(self.player.rx, self.player.ry)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Direction of the running transition
    pub fn transdir(&self) -> Option<Direction> {
        match self.transition {
            Transition::Idle => None,
            Transition::Transitioning { dir, .. } => Some(dir),
        }
    }

    /// Ticks left in the running transition (0 when idle)
    pub fn transtimer(&self) -> u32 {
        match self.transition {
            Transition::Idle => 0,
            Transition::Transitioning { timer, .. } => timer,
        }
    }

    /// Index of the room at `(rx, ry)`, generating it if needed
    pub fn ensure_room(&mut self, rx: i32, ry: i32) -> usize {
        if let Some(index) = self.room_index(rx, ry) {
            return index;
        }

        let mut adjacent = Adjacent::default();
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            let facing = self
                .room(rx + dx, ry + dy)
                .map(|neighbour| neighbour.doors.get(dir.opposite()));
            adjacent.set(dir, facing);
        }

        let room = generate(rx, ry, &adjacent, &mut self.rng, &self.catalog, &mut self.next_id);
        self.rooms.push(room);
        self.rooms.len() - 1
    }

    /// Add a prebuilt room; refused if the coordinate is taken
    pub fn insert_room(&mut self, room: Room) -> bool {
        if self.room_index(room.rx, room.ry).is_some() {
            return false;
        }
        self.next_id = self
            .next_id
            .max(room.entities.iter().map(|e| e.uid + 1).max().unwrap_or(0));
        self.rooms.push(room);
        true
    }

    /// Advance the world one frame
    pub fn tick(&mut self) {
        let index = self.ensure_room(self.player.rx, self.player.ry);
        self.frozen = self.frozen.saturating_sub(1);

        let max_particles = self.settings.max_particles();
        let env = Env {
            player: &mut self.player,
            camera: &mut self.camera,
            rng: &mut self.rng,
            catalog: &self.catalog,
            next_id: &mut self.next_id,
        };
        self.rooms[index].tick(env, max_particles);

        self.step_transition();
        self.camera.tick(self.player.pos, &mut self.rng);
        self.time_ticks += 1;
    }

    fn step_transition(&mut self) {
        match self.transition {
            Transition::Idle => {
                if let Some(dir) = self.crossing() {
                    log::debug!("Transition {:?} from ({}, {})", dir, self.player.rx, self.player.ry);
                    self.frozen = TRANSITION_TICKS;
                    self.transition = Transition::Transitioning {
                        dir,
                        timer: TRANSITION_TICKS,
                    };
                }
            }
            Transition::Transitioning { dir, timer } => {
                let timer = timer.saturating_sub(1);
                if timer == TRANSITION_TICKS / 2 {
                    self.cross(dir);
                }
                self.transition = if timer == 0 {
                    Transition::Idle
                } else {
                    Transition::Transitioning { dir, timer }
                };
            }
        }
    }

    /// Edge the player's box has crossed through an open door, if any
    fn crossing(&self) -> Option<Direction> {
        let room = self.current_room()?;
        let bounds = self.player.bounds();
        let (hw, hh) = (room.w / 2.0, room.h / 2.0);
        Direction::ALL.into_iter().find(|dir| {
            let past = match dir {
                Direction::North => bounds.top() < -hh,
                Direction::East => bounds.right() > hw,
                Direction::South => bounds.bottom() > hh,
                Direction::West => bounds.left() < -hw,
            };
            past && room.doors.get(*dir)
        })
    }

    /// Swap rooms at the transition midpoint
    fn cross(&mut self, dir: Direction) {
        if let Some(index) = self.room_index(self.player.rx, self.player.ry) {
            self.rooms[index].clear_transients();
        }

        let (dx, dy) = dir.offset();
        self.player.rx += dx;
        self.player.ry += dy;
        let index = self.ensure_room(self.player.rx, self.player.ry);

        // Entry spot sits flush with the inner face of the wall line; doorway
        // barricades never overlap it.
        let room = &self.rooms[index];
        let (hw, hh) = (room.w / 2.0, room.h / 2.0);
        let inset = self.player.size / 2.0 + Vec2::splat(WALL_THICKNESS);
        match dir {
            Direction::North => self.player.pos.y = hh - inset.y,
            Direction::East => self.player.pos.x = -hw + inset.x,
            Direction::South => self.player.pos.y = -hh + inset.y,
            Direction::West => self.player.pos.x = hw - inset.x,
        }
        if let Some(item) = self.player.item.as_mut() {
            item.unequip();
        }
        log::info!(
            "Entered room ({}, {}) heading {:?}",
            self.player.rx,
            self.player.ry,
            dir
        );
    }

    pub fn move_x(&mut self, dx: f32) {
        if self.frozen == 0 {
            self.player.move_x(dx);
        }
    }

    pub fn move_y(&mut self, dy: f32) {
        if self.frozen == 0 {
            self.player.move_y(dy);
        }
    }

    /// Single use of the held item aimed at `point`
    pub fn apply_item(&mut self, point: Vec2) -> bool {
        self.use_item(point, false)
    }

    /// Held-button use of the held item aimed at `point`
    pub fn dapply_item(&mut self, point: Vec2) -> bool {
        self.use_item(point, true)
    }

    fn use_item(&mut self, point: Vec2, continuous: bool) -> bool {
        if self.player.eliminated || self.frozen > 0 {
            return false;
        }
        let Some(mut item) = self.player.item.take() else {
            return false;
        };
        let index = self.ensure_room(self.player.rx, self.player.ry);
        let max_particles = self.settings.max_particles();

        let room = &mut self.rooms[index];
        let opponents = room.opponents();
        let env = Env {
            player: &mut self.player,
            camera: &mut self.camera,
            rng: &mut self.rng,
            catalog: &self.catalog,
            next_id: &mut self.next_id,
        };
        let mut ctx = Ctx::new(env, &room.layout, opponents);
        let mut others = Others::all(&mut room.entities);
        let used = if continuous {
            item.dapply(point, &mut others, &mut ctx)
        } else {
            item.apply(point, &mut others, &mut ctx)
        };
        if !item.consumed {
            ctx.player.item = Some(item);
        }
        let out = ctx.finish();

        room.absorb(out, max_particles);
        room.purge();
        used
    }

    /// Interact with the entity under `point`, within reach of the player
    pub fn interact(&mut self, point: Vec2) -> bool {
        if self.player.eliminated || self.player.pos.distance(point) > INTERACT_RADIUS {
            return false;
        }
        let index = self.ensure_room(self.player.rx, self.player.ry);
        let max_particles = self.settings.max_particles();

        let room = &mut self.rooms[index];
        let Some(target) = room.entity_at(point) else {
            return false;
        };
        let opponents = room.opponents();
        let env = Env {
            player: &mut self.player,
            camera: &mut self.camera,
            rng: &mut self.rng,
            catalog: &self.catalog,
            next_id: &mut self.next_id,
        };
        let mut ctx = Ctx::new(env, &room.layout, opponents);
        room.entities[target].interact(&mut ctx);
        let out = ctx.finish();

        room.absorb(out, max_particles);
        room.purge();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityKind};
    use crate::sim::fx::Light;
    use crate::sim::generate::{door_center, walls};
    use crate::sim::item::{Item, ItemKind};
    use crate::sim::room::{Doors, RoomKind};

    fn open_room(rx: i32, ry: i32) -> Room {
        let doors = Doors {
            north: true,
            west: true,
            south: true,
            east: true,
        };
        let mut room = Room::new(rx, ry, ROOM_W, ROOM_H, RoomKind::Passage, doors);
        room.layout = walls(ROOM_W, ROOM_H, &doors);
        room
    }

    fn arena() -> Arena {
        let mut arena = Arena::new(5, Arc::new(Catalog::builtin()), Settings::default());
        for (rx, ry) in [(0, 0), (0, -1), (1, 0), (0, 1), (-1, 0)] {
            assert!(arena.insert_room(open_room(rx, ry)));
        }
        arena
    }

    /// Run until the transition midpoint has passed
    fn run_to_midpoint(arena: &mut Arena) {
        while arena.transtimer() > TRANSITION_TICKS / 2 {
            arena.tick();
        }
    }

    #[test]
    fn test_tick_creates_the_current_room() {
        let mut arena = Arena::new(1, Arc::new(Catalog::builtin()), Settings::default());
        assert!(arena.current_room().is_none());
        arena.tick();
        assert!(arena.current_room().is_some());
        arena.tick();
        assert_eq!(arena.rooms().len(), 1);
    }

    #[test]
    fn test_transition_in_each_direction() {
        let cases = [
            (Direction::North, Vec2::new(0.0, -ROOM_H / 2.0 + 0.2), (0, -1)),
            (Direction::East, Vec2::new(ROOM_W / 2.0 - 0.2, 0.0), (1, 0)),
            (Direction::South, Vec2::new(0.0, ROOM_H / 2.0 - 0.2), (0, 1)),
            (Direction::West, Vec2::new(-ROOM_W / 2.0 + 0.2, 0.0), (-1, 0)),
        ];
        for (dir, start, cell) in cases {
            let mut arena = arena();
            arena.player.pos = start;
            arena.tick();
            assert_eq!(arena.transdir(), Some(dir));
            assert_eq!(arena.transtimer(), TRANSITION_TICKS);
            assert_eq!(arena.frozen, TRANSITION_TICKS);
            assert_eq!((arena.player.rx, arena.player.ry), (0, 0));

            run_to_midpoint(&mut arena);
            assert_eq!((arena.player.rx, arena.player.ry), cell);

            let half = PLAYER_SIZE / 2.0 + WALL_THICKNESS;
            let expected = match dir {
                Direction::North => Vec2::new(start.x, ROOM_H / 2.0 - half),
                Direction::East => Vec2::new(-ROOM_W / 2.0 + half, start.y),
                Direction::South => Vec2::new(start.x, -ROOM_H / 2.0 + half),
                Direction::West => Vec2::new(ROOM_W / 2.0 - half, start.y),
            };
            assert!((arena.player.pos - expected).length() < 1e-4, "{dir:?}");

            while arena.transtimer() > 0 {
                arena.tick();
            }
            assert_eq!(arena.transition(), Transition::Idle);
            assert_eq!((arena.player.rx, arena.player.ry), cell);
        }
    }

    #[test]
    fn test_player_stays_in_barricaded_dungeon() {
        let mut arena = arena();
        let mut dungeon = open_room(0, -1);
        dungeon.kind = RoomKind::Dungeon;
        let gate = door_center(dungeon.w, dungeon.h, Direction::South);
        dungeon.entities.push(
            Entity::new(&arena.catalog, EntityKind::Barricade, gate, 900)
                .with_size(Vec2::new(DOOR_GAP, WALL_THICKNESS)),
        );
        dungeon.entities.push(Entity::new(
            &arena.catalog,
            EntityKind::from_id("spider").unwrap(),
            Vec2::new(-8.0, -4.0),
            901,
        ));
        arena.rooms.retain(|r| (r.rx, r.ry) != (0, -1));
        assert!(arena.insert_room(dungeon));

        arena.player.pos = Vec2::new(0.0, -ROOM_H / 2.0 + 0.2);
        arena.tick();
        assert_eq!(arena.transdir(), Some(Direction::North));
        run_to_midpoint(&mut arena);
        let entry = arena.player.pos;
        arena.tick();
        assert_eq!(arena.player.pos.y, entry.y);

        for _ in 0..40 {
            arena.tick();
        }
        assert_eq!(arena.transition(), Transition::Idle);
        assert_eq!((arena.player.rx, arena.player.ry), (0, -1));
        let room = arena.current_room().unwrap();
        assert_eq!(room.opponents(), 1);
        assert!(room.entities.iter().any(|e| e.is_barrier()));
    }

    #[test]
    fn test_closed_door_does_not_transition() {
        let mut arena = Arena::new(5, Arc::new(Catalog::builtin()), Settings::default());
        let mut room = open_room(0, 0);
        room.doors.north = false;
        arena.insert_room(room);
        arena.player.pos = Vec2::new(0.0, -ROOM_H / 2.0 + 0.2);
        arena.tick();
        assert_eq!(arena.transition(), Transition::Idle);
    }

    #[test]
    fn test_frozen_suppresses_movement() {
        let mut arena = arena();
        arena.frozen = 2;
        arena.move_x(1.0);
        assert_eq!(arena.player.pos, Vec2::ZERO);
        arena.frozen = 0;
        arena.move_x(1.0);
        assert_eq!(arena.player.pos, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_transition_clears_temporary_entities() {
        let mut arena = arena();
        arena.player.item = Some(Item::new(&arena.catalog, ItemKind::Pistol));
        assert!(arena.apply_item(Vec2::new(5.0, 0.0)));
        let turret = Entity::new(
            &arena.catalog,
            EntityKind::from_id("turret").unwrap(),
            Vec2::new(-5.0, 3.0),
            500,
        );
        arena.rooms[0].entities.push(turret);
        arena.rooms[0].lights.push(Light::new(Vec2::ZERO, 50.0, 600));

        arena.player.pos = Vec2::new(0.0, -ROOM_H / 2.0 + 0.2);
        arena.tick();
        assert!(arena.rooms[0].entities.iter().any(|e| e.id() == "bullet"));

        run_to_midpoint(&mut arena);
        let left = arena.room(0, 0).unwrap();
        assert_eq!(left.entities.len(), 1);
        assert_eq!(left.entities[0].id(), "turret");
        assert!(left.particles.is_empty() && left.lights.is_empty());
    }

    #[test]
    fn test_apply_item_spawns_into_current_room() {
        let mut arena = arena();
        arena.player.item = Some(Item::new(&arena.catalog, ItemKind::Pistol));
        assert!(arena.apply_item(Vec2::new(5.0, 0.0)));
        let room = arena.current_room().unwrap();
        assert_eq!(room.entities.len(), 1);
        assert_eq!(room.entities[0].id(), "bullet");
        assert_eq!(arena.player.item.as_ref().map(|i| i.ammo), Some(7));
    }

    #[test]
    fn test_consumed_item_leaves_the_hand() {
        let mut arena = arena();
        arena.player.item = Some(Item::new(&arena.catalog, ItemKind::Grenade));
        assert!(arena.apply_item(Vec2::new(3.0, 0.0)));
        assert!(arena.player.item.is_none());
        assert!(!arena.apply_item(Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_interact_requires_reach_and_hit() {
        let mut arena = arena();
        let pickup = {
            let item = Item::new(&arena.catalog, ItemKind::Medkit);
            Entity::new(&arena.catalog, EntityKind::pickup(item), Vec2::new(3.0, 0.0), 900)
        };
        let far = {
            let item = Item::new(&arena.catalog, ItemKind::Rifle);
            Entity::new(&arena.catalog, EntityKind::pickup(item), Vec2::new(9.0, 0.0), 901)
        };
        arena.rooms[0].entities.push(pickup);
        arena.rooms[0].entities.push(far);

        assert!(!arena.interact(Vec2::new(9.0, 0.0)));
        assert!(!arena.interact(Vec2::new(4.0, 2.0)));
        assert!(arena.interact(Vec2::new(3.1, 0.1)));
        assert_eq!(arena.player.item.as_ref().map(|i| i.id()), Some("medkit"));
        assert_eq!(arena.rooms[0].entities.len(), 1);
    }

    #[test]
    fn test_new_rooms_respect_neighbour_doors() {
        let mut arena = Arena::new(17, Arc::new(Catalog::builtin()), Settings::default());
        let mut closed = open_room(1, 0);
        closed.doors.west = false;
        arena.insert_room(closed);
        arena.tick();
        assert!(!arena.current_room().unwrap().doors.east);
    }

    #[test]
    fn test_next_id_skips_loaded_uids() {
        let catalog = Arc::new(Catalog::builtin());
        let mut room = open_room(0, 0);
        room.entities.push(Entity::new(
            &catalog,
            EntityKind::from_id("spider").unwrap(),
            Vec2::new(5.0, 5.0),
            41,
        ));
        let player = Player::new(Vec2::ZERO, 0, 0, None);
        let arena = Arena::from_parts(player, vec![room], 1, catalog, Settings::default());
        assert_eq!(arena.next_id, 42);
    }
}
