//! Held items: weapons and consumables
//!
//! `apply` is a single activation aimed at a world point, `dapply` the
//! continuous (held-button) variant that only automatic items honour.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use super::collision::Bounds;
use super::entity::{EntityKind, GRENADE_FUSE, PLAYER_SOURCE, Projectile, ProjectileKind, Target};
use super::fx::{Particle, ParticleKind};
use super::world::{Ctx, Others};
use crate::catalog::{Catalog, ItemClass};
use crate::{angle_to, polar_to_cartesian};

/// Distance from the player's center where shots and throws start
const MUZZLE_OFFSET: f32 = 0.5;
/// Furthest a placeable item can be set down
const PLACE_RANGE: f32 = 3.0;
const GRENADE_MAX_THROW: f32 = 8.0;
const MEDKIT_HEAL: i32 = 3;
const RIFLE_SPREAD: f32 = 0.05;
const FLAMETHROWER_SPREAD: f32 = 0.15;
const ROCKET_RECOIL: f32 = 0.15;
const SLASH_REACH: f32 = 1.0;
const SLASH_RADIUS: f32 = 1.25;
const SLASH_DAMAGE: i32 = 2;

/// Item type plus its type-specific state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Pistol,
    Rifle,
    Dagger,
    RocketLauncher,
    Flamethrower,
    AuraBlade {
        /// Bond with the summoned wisp; `None` while not equipped
        bond: Option<u32>,
    },
    Grenade,
    MethaneCan,
    Turret,
    Medkit,
    /// An id without behavior; never does anything
    Unknown(String),
}

impl ItemKind {
    pub fn from_id(id: &str) -> Self {
        match id {
            "pistol" => ItemKind::Pistol,
            "rifle" => ItemKind::Rifle,
            "dagger" => ItemKind::Dagger,
            "rocket_launcher" => ItemKind::RocketLauncher,
            "flamethrower" => ItemKind::Flamethrower,
            "aura_blade" => ItemKind::AuraBlade { bond: None },
            "grenade" => ItemKind::Grenade,
            "methane_can" => ItemKind::MethaneCan,
            "turret" => ItemKind::Turret,
            "medkit" => ItemKind::Medkit,
            other => ItemKind::Unknown(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ItemKind::Pistol => "pistol",
            ItemKind::Rifle => "rifle",
            ItemKind::Dagger => "dagger",
            ItemKind::RocketLauncher => "rocket_launcher",
            ItemKind::Flamethrower => "flamethrower",
            ItemKind::AuraBlade { .. } => "aura_blade",
            ItemKind::Grenade => "grenade",
            ItemKind::MethaneCan => "methane_can",
            ItemKind::Turret => "turret",
            ItemKind::Medkit => "medkit",
            ItemKind::Unknown(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    pub class: ItemClass,
    /// Cooldown after a use
    pub delay: u32,
    /// Cooldown ticks left
    pub timer: u32,
    pub automatic: bool,
    /// 0 = no ammunition tracked
    pub max_ammo: u32,
    pub ammo: u32,
    pub reload_time: u32,
    /// Reload ticks left (0 = not reloading)
    pub reload_timer: u32,
    /// A consumable that has been used up
    pub consumed: bool,
}

impl Item {
    pub fn new(catalog: &Catalog, kind: ItemKind) -> Self {
        let spec = catalog.item(kind.id());
        Self {
            kind,
            name: spec.name.clone(),
            class: spec.class,
            delay: spec.delay,
            timer: 0,
            automatic: spec.automatic,
            max_ammo: spec.max_ammo,
            ammo: spec.max_ammo,
            reload_time: spec.reload_time,
            reload_timer: 0,
            consumed: false,
        }
    }

    pub fn from_id(catalog: &Catalog, id: &str) -> Self {
        Self::new(catalog, ItemKind::from_id(id))
    }

    pub fn id(&self) -> &str {
        self.kind.id()
    }

    pub fn reloading(&self) -> bool {
        self.reload_timer > 0
    }

    /// Count down cooldown and reload; ammunition refills when the reload ends
    pub fn tick_timers(&mut self) {
        self.timer = self.timer.saturating_sub(1);
        if self.reload_timer > 0 {
            self.reload_timer -= 1;
            if self.reload_timer == 0 {
                self.ammo = self.max_ammo;
            }
        }
    }

    /// Per-tick update while held
    pub fn tick(&mut self, ctx: &mut Ctx) {
        self.tick_timers();
        self.equip(ctx);
    }

    /// Start reloading; no-op when full, already reloading or ammo-less
    pub fn reload(&mut self) {
        if self.max_ammo == 0 || self.reloading() || self.ammo == self.max_ammo {
            return;
        }
        if self.reload_time == 0 {
            self.ammo = self.max_ammo;
        } else {
            self.reload_timer = self.reload_time;
        }
    }

    /// Single activation aimed at `point`. Returns true if the item was used.
    pub fn apply(&mut self, point: Vec2, others: &mut Others, ctx: &mut Ctx) -> bool {
        if self.consumed || self.timer > 0 || self.reloading() {
            return false;
        }
        if self.class == ItemClass::Shooter && self.max_ammo > 0 && self.ammo == 0 {
            self.reload();
            return false;
        }
        if !self.use_at(point, others, ctx) {
            return false;
        }

        self.timer = self.delay;
        if self.max_ammo > 0 {
            self.ammo -= 1;
        }
        if self.class == ItemClass::Consume {
            self.consumed = true;
        }
        true
    }

    /// Continuous activation; only automatic items respond
    pub fn dapply(&mut self, point: Vec2, others: &mut Others, ctx: &mut Ctx) -> bool {
        self.automatic && self.apply(point, others, ctx)
    }

    fn use_at(&mut self, point: Vec2, others: &mut Others, ctx: &mut Ctx) -> bool {
        match self.kind {
            ItemKind::Pistol => fire(ProjectileKind::Bullet, 0.0, point, ctx),
            ItemKind::Rifle => fire(ProjectileKind::Bullet, RIFLE_SPREAD, point, ctx),
            ItemKind::Dagger => fire(ProjectileKind::Dagger, 0.0, point, ctx),
            ItemKind::RocketLauncher => {
                let angle = angle_to(ctx.player.pos, point);
                ctx.player.knock(ROCKET_RECOIL, angle + PI, 8);
                fire(ProjectileKind::Rocket, 0.0, point, ctx)
            }
            ItemKind::Flamethrower => fire(ProjectileKind::Flameball, FLAMETHROWER_SPREAD, point, ctx),
            ItemKind::AuraBlade { .. } => slash(point, others, ctx),
            ItemKind::Grenade => throw_grenade(point, ctx),
            ItemKind::MethaneCan => place(EntityKind::MethaneCan { fuse: None }, point, ctx),
            ItemKind::Turret => place(
                EntityKind::Turret {
                    angle: 0.0,
                    cooldown: 0,
                },
                point,
                ctx,
            ),
            ItemKind::Medkit => {
                if ctx.player.hp >= ctx.player.max_hp {
                    return false;
                }
                ctx.player.heal(MEDKIT_HEAL);
                true
            }
            ItemKind::Unknown(_) => false,
        }
    }

    /// Called every tick while held: the aura blade summons its wisp
    pub fn equip(&mut self, ctx: &mut Ctx) {
        if let ItemKind::AuraBlade { bond } = &mut self.kind {
            if bond.is_none() {
                let id = ctx.rng.random::<u32>();
                *bond = Some(id);
                let pos = ctx.player.pos;
                ctx.spawn(
                    EntityKind::AuraWisp {
                        bond: id,
                        angle: 0.0,
                        cooldown: 0,
                    },
                    pos,
                );
            }
        }
    }

    /// The item left the player's hands
    pub fn unequip(&mut self) {
        if let ItemKind::AuraBlade { bond } = &mut self.kind {
            *bond = None;
        }
    }
}

fn fire(kind: ProjectileKind, spread: f32, point: Vec2, ctx: &mut Ctx) -> bool {
    let origin = ctx.player.pos;
    let mut angle = angle_to(origin, point);
    if spread > 0.0 {
        angle += ctx.rng.random_range(-spread..=spread);
    }
    ctx.spawn(
        EntityKind::Projectile(Projectile::new(kind, angle, Target::Entities, PLAYER_SOURCE)),
        origin + polar_to_cartesian(MUZZLE_OFFSET, angle),
    );
    true
}

/// Melee arc centered just in front of the player toward `point`
fn slash(point: Vec2, others: &mut Others, ctx: &mut Ctx) -> bool {
    let origin = ctx.player.pos;
    let angle = angle_to(origin, point);
    let center = origin + polar_to_cartesian(SLASH_REACH, angle);

    for other in others.iter_mut() {
        if !other.is_live_opponent() || other.pos.distance(center) > SLASH_RADIUS {
            continue;
        }
        other.damage(SLASH_DAMAGE, angle, ctx);
        other.knock(0.25, angle, 10);
    }

    for i in 0..6 {
        let heading = angle + (i as f32 - 2.5) * 0.2;
        ctx.particle(Particle::new(
            ParticleKind::Spark,
            center,
            polar_to_cartesian(0.06, heading),
            12,
        ));
    }
    true
}

/// Thrown so that drag brings it to rest near `point`
fn throw_grenade(point: Vec2, ctx: &mut Ctx) -> bool {
    let origin = ctx.player.pos;
    let angle = angle_to(origin, point);
    let distance = origin.distance(point).min(GRENADE_MAX_THROW);
    ctx.spawn(
        EntityKind::Grenade {
            vel: polar_to_cartesian(distance / 10.0, angle),
            fuse: GRENADE_FUSE,
        },
        origin + polar_to_cartesian(MUZZLE_OFFSET, angle),
    );
    true
}

/// Set an entity down at `point` if it is close and clear of blocks
fn place(kind: EntityKind, point: Vec2, ctx: &mut Ctx) -> bool {
    if ctx.player.pos.distance(point) > PLACE_RANGE {
        return false;
    }
    let spec = ctx.catalog.entity(kind.id());
    if ctx.blocked(&Bounds::around(point, Vec2::new(spec.w, spec.h))) {
        return false;
    }
    ctx.spawn(kind, point);
    true
}
