//! Entities: every simulated actor that is not the player
//!
//! An entity's type lives in `EntityKind`, whose variants carry the
//! type-specific state (fuse timers, facing angles, the item a pickup holds).
//! Capabilities are `match`es over the kind with a shared default arm:
//! - damage: subtract HP, knock out at zero (see `damage_null`)
//! - animate: `entity_<id>` with no rotation
//! - interact: nothing
//!
//! Per-kind tick behavior lives in `behavior.rs`.

use glam::Vec2;
use rand::Rng;

use super::collision::{Bounds, resolve};
use super::fx::{Particle, ParticleKind};
use super::item::{Item, ItemKind};
use super::motion::Knockback;
use super::world::{Ctx, Others};
use crate::catalog::{Catalog, EntityFlags};
use crate::consts::*;
use crate::polar_to_cartesian;

/// Fuse lengths (ticks) for the things that blow up
pub const METHANE_FUSE: u32 = 90;
pub const EXPLOSIVE_SPIDER_FUSE: u32 = 45;
pub const GRENADE_FUSE: u32 = 90;

/// Projectile source uid for shots fired by the player
pub const PLAYER_SOURCE: u32 = 0;

/// Projectile families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Bullet,
    Dagger,
    Flameball,
    Rocket,
    Web,
}

impl ProjectileKind {
    pub fn id(&self) -> &'static str {
        match self {
            ProjectileKind::Bullet => "bullet",
            ProjectileKind::Dagger => "dagger",
            ProjectileKind::Flameball => "flameball",
            ProjectileKind::Rocket => "rocket",
            ProjectileKind::Web => "web",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "bullet" => Some(ProjectileKind::Bullet),
            "dagger" => Some(ProjectileKind::Dagger),
            "flameball" => Some(ProjectileKind::Flameball),
            "rocket" => Some(ProjectileKind::Rocket),
            "web" => Some(ProjectileKind::Web),
            _ => None,
        }
    }

    /// Units per tick
    pub fn speed(&self) -> f32 {
        match self {
            ProjectileKind::Bullet => 0.45,
            ProjectileKind::Dagger => 0.35,
            ProjectileKind::Flameball => 0.2,
            ProjectileKind::Rocket => 0.3,
            ProjectileKind::Web => 0.2,
        }
    }

    pub fn damage(&self) -> i32 {
        match self {
            ProjectileKind::Bullet => 1,
            ProjectileKind::Dagger => 2,
            ProjectileKind::Flameball => 1,
            ProjectileKind::Rocket => 4,
            ProjectileKind::Web => 0,
        }
    }

    /// Lifetime in ticks
    pub fn duration(&self) -> u32 {
        match self {
            ProjectileKind::Bullet => 90,
            ProjectileKind::Dagger => 60,
            ProjectileKind::Flameball => 25,
            ProjectileKind::Rocket => 120,
            ProjectileKind::Web => 60,
        }
    }

    /// Knockback force applied on hit
    pub fn knockback(&self) -> f32 {
        match self {
            ProjectileKind::Bullet => 0.15,
            ProjectileKind::Dagger => 0.1,
            ProjectileKind::Flameball => 0.12,
            ProjectileKind::Rocket => 0.4,
            ProjectileKind::Web => 0.05,
        }
    }

    pub fn pierces(&self) -> bool {
        matches!(self, ProjectileKind::Dagger)
    }
}

/// Who a projectile can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Player,
    Entities,
    Any,
}

impl Target {
    pub fn id(&self) -> &'static str {
        match self {
            Target::Player => "player",
            Target::Entities => "entities",
            Target::Any => "any",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "player" => Some(Target::Player),
            "entities" => Some(Target::Entities),
            "any" => Some(Target::Any),
            _ => None,
        }
    }

    pub fn hits_player(&self) -> bool {
        matches!(self, Target::Player | Target::Any)
    }

    pub fn hits_entities(&self) -> bool {
        matches!(self, Target::Entities | Target::Any)
    }
}

/// In-flight state of a projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub angle: f32,
    pub speed: f32,
    pub damage: i32,
    pub duration: u32,
    pub target: Target,
    /// Uid of the shooter (0 = the player)
    pub source: u32,
    /// Uids already pierced
    pub struck: Vec<u32>,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, angle: f32, target: Target, source: u32) -> Self {
        Self {
            kind,
            angle,
            speed: kind.speed(),
            damage: kind.damage(),
            duration: kind.duration(),
            target,
            source,
            struck: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Entity type plus its type-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Spider {
        web_cooldown: u32,
        bite_cooldown: u32,
    },
    ExplosiveSpider {
        fuse: Option<u32>,
    },
    MethaneCan {
        fuse: Option<u32>,
    },
    Grenade {
        vel: Vec2,
        fuse: u32,
    },
    Projectile(Projectile),
    /// Ground pickup representing an item
    Item {
        item: Box<Item>,
    },
    Turret {
        angle: f32,
        cooldown: u32,
    },
    DungeonChest {
        opened: bool,
    },
    Barricade,
    AuraWisp {
        /// Bond shared with the aura_blade that summoned it
        bond: u32,
        angle: f32,
        cooldown: u32,
    },
    /// A type id the simulation has no behavior for
    Inert {
        id: String,
        meta: serde_json::Map<String, serde_json::Value>,
    },
}

impl EntityKind {
    /// Fresh state for a type id; `None` for `item` (needs the held item) and
    /// for ids without behavior.
    pub fn from_id(id: &str) -> Option<Self> {
        let kind = match id {
            "spider" => EntityKind::Spider {
                web_cooldown: 0,
                bite_cooldown: 0,
            },
            "explosive_spider" => EntityKind::ExplosiveSpider { fuse: None },
            "methane_can" => EntityKind::MethaneCan { fuse: None },
            "grenade" => EntityKind::Grenade {
                vel: Vec2::ZERO,
                fuse: GRENADE_FUSE,
            },
            "turret" => EntityKind::Turret {
                angle: 0.0,
                cooldown: 0,
            },
            "dungeon_chest" => EntityKind::DungeonChest { opened: false },
            "barricade" => EntityKind::Barricade,
            "aura_wisp" => EntityKind::AuraWisp {
                bond: 0,
                angle: 0.0,
                cooldown: 0,
            },
            other => {
                let kind = ProjectileKind::from_id(other)?;
                EntityKind::Projectile(Projectile::new(kind, 0.0, Target::Entities, 0))
            }
        };
        Some(kind)
    }

    pub fn id(&self) -> &str {
        match self {
            EntityKind::Spider { .. } => "spider",
            EntityKind::ExplosiveSpider { .. } => "explosive_spider",
            EntityKind::MethaneCan { .. } => "methane_can",
            EntityKind::Grenade { .. } => "grenade",
            EntityKind::Projectile(shot) => shot.kind.id(),
            EntityKind::Item { .. } => "item",
            EntityKind::Turret { .. } => "turret",
            EntityKind::DungeonChest { .. } => "dungeon_chest",
            EntityKind::Barricade => "barricade",
            EntityKind::AuraWisp { .. } => "aura_wisp",
            EntityKind::Inert { id, .. } => id,
        }
    }

    pub fn pickup(item: Item) -> Self {
        EntityKind::Item {
            item: Box::new(item),
        }
    }
}

/// A simulated actor owned by exactly one room
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub uid: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub flags: EntityFlags,
    /// Ticks lived
    pub timer: u32,
    pub destroy: bool,
    /// Linger ticks left before removal once destroyed
    pub destroy_timer: u32,
    pub knockback: Knockback,
}

impl Entity {
    pub fn new(catalog: &Catalog, kind: EntityKind, pos: Vec2, uid: u32) -> Self {
        let spec = catalog.entity(kind.id());
        Self {
            uid,
            kind,
            pos,
            size: Vec2::new(spec.w, spec.h),
            name: spec.name.clone(),
            hp: spec.max_hp,
            max_hp: spec.max_hp,
            flags: spec.flags,
            timer: 0,
            destroy: false,
            destroy_timer: 0,
            knockback: Knockback::default(),
        }
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn id(&self) -> &str {
        self.kind.id()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(self.pos, self.size)
    }

    /// Destroyed and done lingering
    pub fn expired(&self) -> bool {
        self.destroy && self.destroy_timer == 0
    }

    /// Counts toward the room-clear check
    pub fn is_live_opponent(&self) -> bool {
        self.flags.opponent && !self.destroy
    }

    /// Blocks the player like a wall
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, EntityKind::Barricade) && !self.destroy
    }

    /// Pushed out of blocks after moving
    fn is_solid(&self) -> bool {
        !matches!(
            self.kind,
            EntityKind::Projectile(_) | EntityKind::AuraWisp { .. } | EntityKind::Barricade
        )
    }

    /// Remove at the end of this entity's own tick, without lingering
    pub fn vanish(&mut self) {
        self.destroy = true;
        self.destroy_timer = 0;
    }

    /// Advance one tick: behavior, lifetime, knockback, block push-out.
    ///
    /// A destroyed entity only counts its linger timer down.
    pub fn tick(&mut self, others: &mut Others, ctx: &mut Ctx) {
        if self.destroy {
            self.destroy_timer = self.destroy_timer.saturating_sub(1);
            return;
        }

        self.behave(others, ctx);
        self.timer += 1;
        if self.destroy {
            return;
        }

        self.pos += self.knockback.step();
        if self.is_solid() {
            for block in ctx.layout {
                resolve(&block.bounds, &mut self.pos, self.size);
            }
        }
    }

    /// Start a knockback push (ghostlike, non-immune entities only)
    pub fn knock(&mut self, force: f32, angle: f32, duration: u32) {
        if self.flags.ghostlike && !self.flags.immune && !self.destroy {
            self.knockback.start(force, angle, duration);
        }
    }

    /// Deal `amount` damage arriving from direction `angle`.
    ///
    /// Returns the HP actually removed. Immune and already destroyed entities
    /// are untouched. Unless the type handler short-circuits, a burst of heart
    /// particles spans `amount * 4` degrees around `angle`.
    pub fn damage(&mut self, amount: i32, angle: f32, ctx: &mut Ctx) -> i32 {
        if self.flags.immune || self.destroy {
            return 0;
        }
        let Some(dealt) = self.damage_handler(amount) else {
            return 0;
        };
        self.heart_burst(amount, angle, ctx);
        dealt
    }

    /// Per-kind damage; `None` short-circuits the heart burst
    fn damage_handler(&mut self, amount: i32) -> Option<i32> {
        match &mut self.kind {
            EntityKind::MethaneCan { fuse } => {
                fuse.get_or_insert(METHANE_FUSE);
                return None;
            }
            EntityKind::ExplosiveSpider { fuse } => {
                fuse.get_or_insert(EXPLOSIVE_SPIDER_FUSE);
                return None;
            }
            _ => {}
        }
        Some(self.damage_null(amount))
    }

    /// Default damage: subtract, clamp at zero, knock out at zero
    pub fn damage_null(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 && !self.destroy {
            self.destroy = true;
            self.destroy_timer = DESTROY_LINGER;
        }
        before - self.hp
    }

    fn heart_burst(&self, amount: i32, angle: f32, ctx: &mut Ctx) {
        let arc = (amount.max(0) as f32 * 4.0).to_radians();
        let count = amount.max(1) as usize + 2;
        for i in 0..count {
            let t = i as f32 / (count - 1) as f32 - 0.5;
            let heading = angle + arc * t;
            let speed = ctx.rng.random_range(0.03..0.08);
            ctx.particle(
                Particle::new(
                    ParticleKind::Heart,
                    self.pos,
                    polar_to_cartesian(speed, heading),
                    FRAMERATE / 2,
                )
                .with_acc(Vec2::new(0.0, -0.002)),
            );
        }
    }

    /// Sprite key and rotation for the renderer
    pub fn animate(&self) -> (String, f32) {
        match &self.kind {
            EntityKind::Projectile(shot) => (format!("entity_{}", shot.kind.id()), shot.angle),
            EntityKind::Turret { angle, .. } => ("entity_turret".to_string(), *angle),
            EntityKind::AuraWisp { angle, .. } => ("entity_aura_wisp".to_string(), *angle),
            EntityKind::MethaneCan { fuse: Some(t) } | EntityKind::ExplosiveSpider { fuse: Some(t) }
                if (t / 4) % 2 == 0 =>
            {
                (format!("entity_{}_lit", self.id()), 0.0)
            }
            EntityKind::DungeonChest { opened: true } => {
                ("entity_dungeon_chest_open".to_string(), 0.0)
            }
            EntityKind::Item { item } => (format!("item_{}", item.id()), 0.0),
            _ => self.animate_null(),
        }
    }

    pub fn animate_null(&self) -> (String, f32) {
        (format!("entity_{}", self.id()), 0.0)
    }

    /// The player's interact intent landed on this entity.
    ///
    /// Pickups hand their item over (or trade it for the held one); a placed
    /// turret or an unlit methane can is picked back up the same way.
    pub fn interact(&mut self, ctx: &mut Ctx) {
        if self.destroy || !self.flags.interactable {
            return;
        }

        let offered = match &mut self.kind {
            EntityKind::Item { item } => {
                match ctx.player.item.take() {
                    None => {
                        ctx.player.item = Some((**item).clone());
                        self.destroy = true;
                        self.destroy_timer = 0;
                    }
                    Some(mut held) => {
                        held.unequip();
                        ctx.player.item = Some(std::mem::replace(item.as_mut(), held));
                    }
                }
                log::debug!("Picked up {}", ctx.player.item.as_ref().map_or("???", |i| i.id()));
                return;
            }
            EntityKind::Turret { .. } => ItemKind::Turret,
            EntityKind::MethaneCan { fuse: None } => ItemKind::MethaneCan,
            _ => return,
        };

        let picked = Item::new(ctx.catalog, offered);
        match ctx.player.item.replace(picked) {
            None => self.vanish(),
            Some(mut held) => {
                held.unequip();
                *self = Entity::new(ctx.catalog, EntityKind::pickup(held), self.pos, self.uid);
            }
        }
    }
}

/// Hit distance: the sum of both boxes' mean half-extents
pub fn reach(a: Vec2, b: Vec2) -> f32 {
    (a.x + a.y + b.x + b.y) / 4.0
}
