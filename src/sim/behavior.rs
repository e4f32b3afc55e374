//! Per-kind tick behaviors
//!
//! `Entity::behave` is the tick capability: one arm per kind with behavior,
//! the rest fall through to the no-op default.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision::Bounds;
use super::entity::{
    EXPLOSIVE_SPIDER_FUSE, Entity, EntityKind, Projectile, ProjectileKind, Target, reach,
};
use super::fx::{Light, Particle, ParticleKind};
use super::item::{Item, ItemKind};
use super::roll::roll;
use super::tables::{LOOT_COUNTS, LOOT_ITEMS};
use super::world::{Ctx, Others};
use crate::{angle_to, normalize_angle, polar_to_cartesian};

const SPIDER_SPEED: f32 = 0.05;
const SPIDER_SIGHT: f32 = 12.0;
const WEB_RANGE: f32 = 4.0;
const WEB_COOLDOWN: u32 = 120;
const BITE_COOLDOWN: u32 = 60;
const BITE_DAMAGE: i32 = 1;

const EXPLOSIVE_SPIDER_SPEED: f32 = 0.07;
const EXPLOSIVE_SPIDER_TRIGGER: f32 = 1.5;

const GRENADE_DRAG: f32 = 0.9;

/// One flameball every 5 degrees
const EXPLOSION_RAYS: u32 = 72;
const EXPLOSION_SHAKE: f32 = 0.5;
const EXPLOSION_SHAKE_TICKS: u32 = 30;
const EXPLOSION_LIGHT: f32 = 120.0;
const EXPLOSION_LIGHT_TICKS: u32 = 20;

const TURRET_COOLDOWN: u32 = 30;
const TURRET_MUZZLE: f32 = 0.6;

const CHEST_RING: f32 = 1.5;

const WISP_RADIUS: f32 = 1.5;
const WISP_SPEED: f32 = 0.08;
const WISP_COOLDOWN: u32 = 20;

/// Knockback duration for every hit
const HIT_KNOCK_TICKS: u32 = 10;

impl Entity {
    pub(super) fn behave(&mut self, others: &mut Others, ctx: &mut Ctx) {
        match self.kind {
            EntityKind::Spider { .. } => self.tick_spider(ctx),
            EntityKind::ExplosiveSpider { .. } => self.tick_explosive_spider(ctx),
            EntityKind::MethaneCan { .. } => self.burn_fuse(ctx),
            EntityKind::Grenade { .. } => self.tick_grenade(ctx),
            EntityKind::Projectile(_) => self.tick_projectile(others, ctx),
            EntityKind::Turret { .. } => self.tick_turret(others, ctx),
            EntityKind::DungeonChest { .. } => {
                self.open_chest(ctx);
            }
            EntityKind::Barricade => {
                if ctx.opponents == 0 {
                    log::debug!("Barricade {} lifted", self.uid);
                    self.vanish();
                }
            }
            EntityKind::AuraWisp { .. } => self.tick_aura_wisp(others, ctx),
            _ => {}
        }
    }

    fn tick_spider(&mut self, ctx: &mut Ctx) {
        let EntityKind::Spider {
            web_cooldown,
            bite_cooldown,
        } = &mut self.kind
        else {
            return;
        };
        *web_cooldown = web_cooldown.saturating_sub(1);
        *bite_cooldown = bite_cooldown.saturating_sub(1);
        if ctx.player.eliminated {
            return;
        }

        let target = ctx.player.pos;
        let distance = self.pos.distance(target);
        let angle = angle_to(self.pos, target);

        if distance > 1.0 && distance < SPIDER_SIGHT {
            self.pos += polar_to_cartesian(SPIDER_SPEED, angle);
        }

        if distance <= WEB_RANGE && *web_cooldown == 0 {
            *web_cooldown = WEB_COOLDOWN;
            let web = Projectile::new(ProjectileKind::Web, angle, Target::Player, self.uid);
            ctx.spawn(EntityKind::Projectile(web), self.pos);
        }

        if *bite_cooldown == 0 && Bounds::around(self.pos, self.size).overlaps(&ctx.player.bounds()) {
            *bite_cooldown = BITE_COOLDOWN;
            ctx.player.damage(BITE_DAMAGE);
            ctx.player.knock(0.2, angle, HIT_KNOCK_TICKS);
        }
    }

    fn tick_explosive_spider(&mut self, ctx: &mut Ctx) {
        if let EntityKind::ExplosiveSpider { fuse: fuse @ None } = &mut self.kind {
            if !ctx.player.eliminated {
                let distance = self.pos.distance(ctx.player.pos);
                if distance <= EXPLOSIVE_SPIDER_TRIGGER {
                    *fuse = Some(EXPLOSIVE_SPIDER_FUSE);
                } else if distance < SPIDER_SIGHT {
                    let angle = angle_to(self.pos, ctx.player.pos);
                    self.pos += polar_to_cartesian(EXPLOSIVE_SPIDER_SPEED, angle);
                }
            }
        }
        self.burn_fuse(ctx);
    }

    fn tick_grenade(&mut self, ctx: &mut Ctx) {
        if let EntityKind::Grenade { vel, .. } = &mut self.kind {
            let step = *vel;
            *vel *= GRENADE_DRAG;
            self.pos += step;
        }
        self.burn_fuse(ctx);
    }

    /// Lit fuse for this entity, if any
    fn fuse_mut(&mut self) -> Option<&mut u32> {
        match &mut self.kind {
            EntityKind::MethaneCan { fuse } | EntityKind::ExplosiveSpider { fuse } => fuse.as_mut(),
            EntityKind::Grenade { fuse, .. } => Some(fuse),
            _ => None,
        }
    }

    /// Count a lit fuse down, sputtering flames; explode when it runs out
    fn burn_fuse(&mut self, ctx: &mut Ctx) {
        let Some(fuse) = self.fuse_mut() else {
            return;
        };
        let remaining = *fuse;
        *fuse = remaining.saturating_sub(1);
        if remaining == 0 {
            self.explode(ctx);
            return;
        }

        let vel = Vec2::new(
            ctx.rng.random_range(-0.02..0.02),
            ctx.rng.random_range(-0.06..-0.02),
        );
        ctx.particle(Particle::new(ParticleKind::Flame, self.pos, vel, 15));
    }

    /// Ring of flameballs, shake, flash, gone
    pub fn explode(&mut self, ctx: &mut Ctx) {
        for ray in 0..EXPLOSION_RAYS {
            let angle = (ray as f32 * 5.0).to_radians();
            let speed = ctx.rng.random_range(0.15..0.25);
            let flame = Projectile::new(ProjectileKind::Flameball, angle, Target::Any, self.uid)
                .with_speed(speed);
            ctx.spawn(EntityKind::Projectile(flame), self.pos);
        }
        ctx.camera.shake(EXPLOSION_SHAKE, EXPLOSION_SHAKE_TICKS);
        ctx.light(Light::new(self.pos, EXPLOSION_LIGHT, EXPLOSION_LIGHT_TICKS));
        for _ in 0..8 {
            let heading = ctx.rng.random_range(0.0..TAU);
            let speed = ctx.rng.random_range(0.01..0.04);
            ctx.particle(Particle::new(
                ParticleKind::Smoke,
                self.pos,
                polar_to_cartesian(speed, heading),
                40,
            ));
        }
        log::debug!(
            "{} {} exploded at ({:.2}, {:.2})",
            self.id(),
            self.uid,
            self.pos.x,
            self.pos.y
        );
        self.vanish();
    }

    /// Move, then hit the first valid target in reach
    fn tick_projectile(&mut self, others: &mut Others, ctx: &mut Ctx) {
        let EntityKind::Projectile(shot) = &mut self.kind else {
            return;
        };
        self.pos += polar_to_cartesian(shot.speed, shot.angle);
        if self.timer >= shot.duration || ctx.blocked(&Bounds::around(self.pos, self.size)) {
            self.destroy = true;
            self.destroy_timer = 0;
            return;
        }

        let player = &mut *ctx.player;
        if shot.target.hits_player()
            && !player.eliminated
            && self.pos.distance(player.pos) <= reach(self.size, player.size)
        {
            player.damage(shot.damage);
            player.knock(shot.kind.knockback(), shot.angle, HIT_KNOCK_TICKS);
            if shot.kind == ProjectileKind::Web {
                player.stun(60);
            }
            self.destroy = true;
            self.destroy_timer = 0;
            return;
        }

        if !shot.target.hits_entities() {
            return;
        }
        for other in others.iter_mut() {
            if other.flags.immune
                || other.destroy
                || other.uid == shot.source
                || shot.struck.contains(&other.uid)
                || self.pos.distance(other.pos) > reach(self.size, other.size)
            {
                continue;
            }
            other.damage(shot.damage, shot.angle, ctx);
            other.knock(shot.kind.knockback(), shot.angle, HIT_KNOCK_TICKS);
            if shot.kind == ProjectileKind::Rocket {
                ctx.camera.shake(0.3, 15);
            }
            if shot.kind.pierces() {
                shot.struck.push(other.uid);
                continue;
            }
            self.destroy = true;
            self.destroy_timer = 0;
            return;
        }
    }

    fn tick_turret(&mut self, others: &Others, ctx: &mut Ctx) {
        let EntityKind::Turret { angle, cooldown } = &mut self.kind else {
            return;
        };
        *cooldown = cooldown.saturating_sub(1);

        let pos = self.pos;
        let nearest = others
            .iter()
            .filter(|e| e.is_live_opponent())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(pos)
                    .total_cmp(&b.pos.distance_squared(pos))
            });
        let Some(target) = nearest else {
            return;
        };

        *angle = angle_to(pos, target.pos);
        if *cooldown == 0 {
            *cooldown = TURRET_COOLDOWN;
            let bullet = Projectile::new(ProjectileKind::Bullet, *angle, Target::Entities, self.uid);
            ctx.spawn(
                EntityKind::Projectile(bullet),
                pos + polar_to_cartesian(TURRET_MUZZLE, *angle),
            );
        }
    }

    /// Roll and drop the chest's loot once the room is clear.
    ///
    /// Returns the number of pickups dropped; 0 if still guarded or already
    /// opened.
    pub fn open_chest(&mut self, ctx: &mut Ctx) -> usize {
        let EntityKind::DungeonChest { opened } = &mut self.kind else {
            return 0;
        };
        if *opened || ctx.opponents > 0 {
            return 0;
        }
        *opened = true;

        let count = roll(LOOT_COUNTS, ctx.rng).copied().unwrap_or(1);
        for i in 0..count {
            let Some(id) = roll(LOOT_ITEMS, ctx.rng) else {
                break;
            };
            let item = Item::from_id(ctx.catalog, id);
            let angle = TAU * i as f32 / count as f32;
            ctx.spawn(
                EntityKind::pickup(item),
                self.pos + polar_to_cartesian(CHEST_RING, angle),
            );
        }
        log::debug!("Chest {} opened, {} item(s) dropped", self.uid, count);
        count
    }

    fn tick_aura_wisp(&mut self, others: &mut Others, ctx: &mut Ctx) {
        let EntityKind::AuraWisp {
            bond,
            angle,
            cooldown,
        } = &mut self.kind
        else {
            return;
        };
        let bonded = matches!(
            ctx.player.item.as_ref().map(|item| &item.kind),
            Some(ItemKind::AuraBlade { bond: Some(b) }) if *b == *bond
        );
        if !bonded {
            self.destroy = true;
            self.destroy_timer = 0;
            return;
        }

        *angle = normalize_angle(*angle + WISP_SPEED);
        self.pos = ctx.player.pos + polar_to_cartesian(WISP_RADIUS, *angle);
        *cooldown = cooldown.saturating_sub(1);
        if *cooldown > 0 {
            return;
        }

        let own = Bounds::around(self.pos, self.size);
        for other in others.iter_mut() {
            if !other.is_live_opponent() || !other.bounds().overlaps(&own) {
                continue;
            }
            let push = angle_to(self.pos, other.pos);
            other.damage(1, push, ctx);
            other.knock(0.2, push, HIT_KNOCK_TICKS);
            *cooldown = WISP_COOLDOWN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::room::Block;
    use crate::sim::world::testing::TestWorld;

    fn spider(world: &mut TestWorld, pos: Vec2) -> Entity {
        world.entity(EntityKind::from_id("spider").unwrap(), pos)
    }

    fn bullet(world: &mut TestWorld, pos: Vec2, angle: f32) -> Entity {
        let shot = Projectile::new(ProjectileKind::Bullet, angle, Target::Entities, 0);
        world.entity(EntityKind::Projectile(shot), pos)
    }

    #[test]
    fn test_bullet_hits_spider_on_spawn_tick() {
        let mut world = TestWorld::new();
        let target = spider(&mut world, Vec2::new(3.0, 3.0));
        let mut shot = bullet(&mut world, Vec2::new(3.0, 3.0), 0.0);
        let mut entities = vec![target];

        let mut ctx = world.ctx(1);
        let mut others = Others::all(&mut entities);
        shot.tick(&mut others, &mut ctx);

        assert!(shot.expired());
        assert_eq!(entities[0].hp, 2);
        assert!(entities[0].knockback.active());
        assert_eq!(entities[0].knockback.angle, 0.0);
    }

    #[test]
    fn test_projectile_never_hits_its_source() {
        let mut world = TestWorld::new();
        let turret = world.entity(EntityKind::from_id("turret").unwrap(), Vec2::ZERO);
        let shot = Projectile::new(ProjectileKind::Bullet, 0.0, Target::Entities, turret.uid);
        let mut shot = world.entity(EntityKind::Projectile(shot), Vec2::new(-0.3, 0.0));
        let mut entities = vec![turret];

        let mut ctx = world.ctx(0);
        let mut others = Others::all(&mut entities);
        shot.tick(&mut others, &mut ctx);
        assert!(!shot.destroy);
        assert_eq!(entities[0].hp, entities[0].max_hp);
    }

    #[test]
    fn test_projectile_stops_at_blocks_and_after_duration() {
        let mut world = TestWorld::new();
        world.layout.push(Block::new(1.0, 0.0, 1.0, 4.0));
        let mut blocked = bullet(&mut world, Vec2::new(0.2, 0.0), 0.0);
        let mut free = bullet(&mut world, Vec2::new(0.0, 5.0), std::f32::consts::PI);

        let mut ctx = world.ctx(0);
        let mut others = Others::all(&mut []);
        blocked.tick(&mut others, &mut ctx);
        assert!(blocked.expired());

        for _ in 0..ProjectileKind::Bullet.duration() {
            free.tick(&mut others, &mut ctx);
        }
        assert!(!free.destroy);
        free.tick(&mut others, &mut ctx);
        assert!(free.expired());
    }

    #[test]
    fn test_dagger_pierces_each_target_once() {
        let mut world = TestWorld::new();
        let a = spider(&mut world, Vec2::new(0.2, 0.0));
        let b = spider(&mut world, Vec2::new(0.5, 0.0));
        let shot = Projectile::new(ProjectileKind::Dagger, 0.0, Target::Entities, 0)
            .with_speed(0.05);
        let mut dagger = world.entity(EntityKind::Projectile(shot), Vec2::ZERO);
        let mut entities = vec![a, b];

        let mut ctx = world.ctx(2);
        let mut others = Others::all(&mut entities);
        dagger.tick(&mut others, &mut ctx);
        dagger.tick(&mut others, &mut ctx);

        assert!(!dagger.destroy);
        assert_eq!(entities[0].hp, 1);
        assert_eq!(entities[1].hp, 1);
    }

    #[test]
    fn test_web_stuns_player() {
        let mut world = TestWorld::new();
        let web = Projectile::new(ProjectileKind::Web, 0.0, Target::Player, 7);
        let mut web = world.entity(EntityKind::Projectile(web), Vec2::new(-0.2, 0.0));
        let mut ctx = world.ctx(0);
        web.tick(&mut Others::all(&mut []), &mut ctx);
        assert!(web.expired());
        assert!(ctx.player.stun > 0);
        assert_eq!(ctx.player.hp, PLAYER_MAX_HP);
    }

    #[test]
    fn test_spider_homes_and_webs() {
        let mut world = TestWorld::new();
        let mut spider = spider(&mut world, Vec2::new(3.0, 0.0));
        let mut ctx = world.ctx(1);
        spider.tick(&mut Others::all(&mut []), &mut ctx);
        assert!((spider.pos.x - (3.0 - SPIDER_SPEED)).abs() < 1e-5);
        let out = ctx.finish();
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].id(), "web");
    }

    #[test]
    fn test_spider_ignores_player_out_of_sight() {
        let mut world = TestWorld::new();
        let mut spider = spider(&mut world, Vec2::new(20.0, 0.0));
        let mut ctx = world.ctx(1);
        spider.tick(&mut Others::all(&mut []), &mut ctx);
        assert_eq!(spider.pos, Vec2::new(20.0, 0.0));
        assert!(ctx.finish().entities.is_empty());
    }

    #[test]
    fn test_methane_can_explodes_into_flame_ring() {
        let mut world = TestWorld::new();
        let mut can = world.entity(EntityKind::MethaneCan { fuse: Some(2) }, Vec2::new(5.0, 5.0));
        let mut ctx = world.ctx(0);
        let mut others = Others::all(&mut []);
        can.tick(&mut others, &mut ctx);
        can.tick(&mut others, &mut ctx);
        assert!(!can.destroy);
        can.tick(&mut others, &mut ctx);
        assert!(can.expired());
        assert!(ctx.camera.timer > 0);

        let out = ctx.finish();
        let flames = out
            .entities
            .iter()
            .filter(|e| e.id() == "flameball")
            .count();
        assert_eq!(flames, EXPLOSION_RAYS as usize);
        assert_eq!(out.lights.len(), 1);
    }

    #[test]
    fn test_explosive_spider_lights_near_player() {
        let mut world = TestWorld::new();
        let mut spider = world.entity(
            EntityKind::from_id("explosive_spider").unwrap(),
            Vec2::new(1.0, 0.0),
        );
        let mut ctx = world.ctx(1);
        spider.tick(&mut Others::all(&mut []), &mut ctx);
        assert_eq!(
            spider.kind,
            EntityKind::ExplosiveSpider {
                fuse: Some(EXPLOSIVE_SPIDER_FUSE - 1)
            }
        );
    }

    #[test]
    fn test_grenade_slows_down() {
        let mut world = TestWorld::new();
        let mut grenade = world.entity(
            EntityKind::Grenade {
                vel: Vec2::new(0.5, 0.0),
                fuse: 50,
            },
            Vec2::ZERO,
        );
        let mut ctx = world.ctx(0);
        let mut others = Others::all(&mut []);
        grenade.tick(&mut others, &mut ctx);
        grenade.tick(&mut others, &mut ctx);
        assert!((grenade.pos.x - (0.5 + 0.45)).abs() < 1e-5);
    }

    #[test]
    fn test_chest_opens_exactly_once() {
        let mut world = TestWorld::new();
        let mut chest = world.entity(EntityKind::from_id("dungeon_chest").unwrap(), Vec2::ZERO);

        let mut guarded = world.ctx(2);
        assert_eq!(chest.open_chest(&mut guarded), 0);
        assert!(guarded.finish().entities.is_empty());

        let mut ctx = world.ctx(0);
        let dropped = chest.open_chest(&mut ctx);
        assert!((1..=3).contains(&dropped));
        assert_eq!(chest.open_chest(&mut ctx), 0);
        let out = ctx.finish();
        assert_eq!(out.entities.len(), dropped);
        assert!(out.entities.iter().all(|e| e.id() == "item"));
        assert_eq!(chest.animate().0, "entity_dungeon_chest_open");
    }

    #[test]
    fn test_barricade_lifts_when_room_is_clear() {
        let mut world = TestWorld::new();
        let mut barricade = world.entity(EntityKind::Barricade, Vec2::ZERO);
        let mut others = Others::all(&mut []);
        {
            let mut ctx = world.ctx(3);
            barricade.tick(&mut others, &mut ctx);
            assert!(!barricade.destroy);
        }
        let mut ctx = world.ctx(0);
        barricade.tick(&mut others, &mut ctx);
        assert!(barricade.expired());
    }

    #[test]
    fn test_turret_faces_nearest_opponent() {
        let mut world = TestWorld::new();
        let near = spider(&mut world, Vec2::new(0.0, 4.0));
        let far = spider(&mut world, Vec2::new(8.0, 0.0));
        let mut turret = world.entity(EntityKind::from_id("turret").unwrap(), Vec2::ZERO);
        let mut entities = vec![far, near];

        let mut ctx = world.ctx(2);
        turret.tick(&mut Others::all(&mut entities), &mut ctx);
        let EntityKind::Turret { angle, cooldown } = turret.kind else {
            panic!("turret kind changed");
        };
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(cooldown, TURRET_COOLDOWN);
        assert_eq!(ctx.finish().entities.len(), 1);
    }

    #[test]
    fn test_wisp_vanishes_without_bonded_blade() {
        let mut world = TestWorld::new();
        let mut wisp = world.entity(
            EntityKind::AuraWisp {
                bond: 9,
                angle: 0.0,
                cooldown: 0,
            },
            Vec2::ZERO,
        );
        world.player.item = Some(Item::new(
            &world.catalog,
            ItemKind::AuraBlade { bond: Some(9) },
        ));
        let mut others = Others::all(&mut []);
        {
            let mut ctx = world.ctx(0);
            wisp.tick(&mut others, &mut ctx);
            assert!(!wisp.destroy);
            assert!((wisp.pos.length() - WISP_RADIUS).abs() < 1e-4);
        }
        world.player.item = None;
        let mut ctx = world.ctx(0);
        wisp.tick(&mut others, &mut ctx);
        assert!(wisp.expired());
    }
}
