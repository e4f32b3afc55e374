//! Save record types and the entity <-> record mapping
//!
//! Entities are stored as `{ id, x, y, meta }`. The meta map carries the
//! per-kind state that lives in `EntityKind` variants at runtime; missing keys
//! fall back to a fresh entity's state.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::sim::entity::{Entity, EntityKind, Projectile, Target};
use crate::sim::item::Item;
use crate::sim::room::{Block, Doors, RoomKind};

/// Everything needed to rebuild an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Random source seed; 0 when absent
    #[serde(default)]
    pub seed: u64,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub rx: i32,
    #[serde(default)]
    pub ry: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRecord>,
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammo: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub rx: i32,
    pub ry: i32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub kind: RoomKind,
    /// Absent doors load closed
    #[serde(default)]
    pub doors: Doors,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        let b = block.bounds;
        Self {
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
        }
    }
}

impl From<&BlockRecord> for Block {
    fn from(record: &BlockRecord) -> Self {
        Block::new(record.x, record.y, record.w, record.h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    /// Runtime id, kept so projectile sources survive a reload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

fn get_f32(meta: &Map<String, Value>, key: &str) -> Option<f32> {
    meta.get(key).and_then(Value::as_f64).map(|v| v as f32)
}

fn get_u32(meta: &Map<String, Value>, key: &str) -> Option<u32> {
    meta.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

fn get_i32(meta: &Map<String, Value>, key: &str) -> Option<i32> {
    meta.get(key)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

fn get_bool(meta: &Map<String, Value>, key: &str) -> Option<bool> {
    meta.get(key).and_then(Value::as_bool)
}

fn get_str<'a>(meta: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    meta.get(key).and_then(Value::as_str)
}

impl EntityRecord {
    pub fn from_entity(entity: &Entity) -> Self {
        let mut meta = Map::new();
        match &entity.kind {
            EntityKind::Spider {
                web_cooldown,
                bite_cooldown,
            } => {
                meta.insert("web_cooldown".into(), (*web_cooldown).into());
                meta.insert("bite_cooldown".into(), (*bite_cooldown).into());
            }
            EntityKind::ExplosiveSpider { fuse } | EntityKind::MethaneCan { fuse } => {
                if let Some(fuse) = fuse {
                    meta.insert("fuse".into(), (*fuse).into());
                }
            }
            EntityKind::Grenade { vel, fuse } => {
                meta.insert("vx".into(), vel.x.into());
                meta.insert("vy".into(), vel.y.into());
                meta.insert("fuse".into(), (*fuse).into());
            }
            EntityKind::Projectile(shot) => {
                meta.insert("angle".into(), shot.angle.into());
                meta.insert("speed".into(), shot.speed.into());
                meta.insert("damage".into(), shot.damage.into());
                meta.insert("duration".into(), shot.duration.into());
                meta.insert("target".into(), shot.target.id().into());
                meta.insert("source".into(), shot.source.into());
            }
            EntityKind::Item { item } => {
                meta.insert("item".into(), item.id().into());
                if item.max_ammo > 0 {
                    meta.insert("ammo".into(), item.ammo.into());
                }
            }
            EntityKind::Turret { angle, cooldown } => {
                meta.insert("angle".into(), (*angle).into());
                meta.insert("cooldown".into(), (*cooldown).into());
            }
            EntityKind::DungeonChest { opened } => {
                meta.insert("opened".into(), (*opened).into());
            }
            EntityKind::Barricade => {
                meta.insert("w".into(), entity.size.x.into());
                meta.insert("h".into(), entity.size.y.into());
            }
            EntityKind::AuraWisp {
                bond,
                angle,
                cooldown,
            } => {
                meta.insert("bond".into(), (*bond).into());
                meta.insert("angle".into(), (*angle).into());
                meta.insert("cooldown".into(), (*cooldown).into());
            }
            EntityKind::Inert { meta: raw, .. } => meta = raw.clone(),
        }
        if entity.hp != entity.max_hp && !matches!(entity.kind, EntityKind::Inert { .. }) {
            meta.insert("hp".into(), entity.hp.into());
        }
        if entity.timer > 0 && !matches!(entity.kind, EntityKind::Inert { .. }) {
            meta.insert("timer".into(), entity.timer.into());
        }

        Self {
            id: entity.id().to_string(),
            uid: Some(entity.uid),
            x: entity.pos.x,
            y: entity.pos.y,
            meta,
        }
    }

    /// Rebuild the entity. Unknown ids become inert entities carrying their
    /// meta untouched.
    pub fn to_entity(&self, catalog: &Catalog, uid: u32) -> Entity {
        let pos = Vec2::new(self.x, self.y);
        let meta = &self.meta;

        let kind = match self.id.as_str() {
            "item" => {
                let id = get_str(meta, "item").unwrap_or_default();
                let mut item = Item::from_id(catalog, id);
                if let Some(ammo) = get_u32(meta, "ammo") {
                    item.ammo = ammo.min(item.max_ammo);
                }
                EntityKind::pickup(item)
            }
            id => match EntityKind::from_id(id) {
                Some(fresh) => self.restore(fresh),
                None => {
                    log::warn!("Unknown entity id '{}' at ({}, {}), loading inert", id, self.x, self.y);
                    EntityKind::Inert {
                        id: id.to_string(),
                        meta: meta.clone(),
                    }
                }
            },
        };

        let mut entity = Entity::new(catalog, kind, pos, uid);
        if let EntityKind::Barricade = entity.kind {
            let w = get_f32(meta, "w").unwrap_or(entity.size.x);
            let h = get_f32(meta, "h").unwrap_or(entity.size.y);
            entity.size = Vec2::new(w, h);
        }
        if !matches!(entity.kind, EntityKind::Inert { .. }) {
            if let Some(hp) = get_i32(meta, "hp") {
                entity.hp = hp.clamp(0, entity.max_hp);
            }
            entity.timer = get_u32(meta, "timer").unwrap_or(0);
        }
        entity
    }

    /// Overlay stored per-kind state on a fresh kind
    fn restore(&self, fresh: EntityKind) -> EntityKind {
        let meta = &self.meta;
        match fresh {
            EntityKind::Spider {
                web_cooldown,
                bite_cooldown,
            } => EntityKind::Spider {
                web_cooldown: get_u32(meta, "web_cooldown").unwrap_or(web_cooldown),
                bite_cooldown: get_u32(meta, "bite_cooldown").unwrap_or(bite_cooldown),
            },
            EntityKind::ExplosiveSpider { .. } => EntityKind::ExplosiveSpider {
                fuse: get_u32(meta, "fuse"),
            },
            EntityKind::MethaneCan { .. } => EntityKind::MethaneCan {
                fuse: get_u32(meta, "fuse"),
            },
            EntityKind::Grenade { vel, fuse } => EntityKind::Grenade {
                vel: Vec2::new(
                    get_f32(meta, "vx").unwrap_or(vel.x),
                    get_f32(meta, "vy").unwrap_or(vel.y),
                ),
                fuse: get_u32(meta, "fuse").unwrap_or(fuse),
            },
            EntityKind::Projectile(shot) => {
                let target = get_str(meta, "target")
                    .and_then(Target::from_id)
                    .unwrap_or(shot.target);
                let angle = get_f32(meta, "angle").unwrap_or(shot.angle);
                let source = get_u32(meta, "source").unwrap_or(shot.source);
                let mut restored = Projectile::new(shot.kind, angle, target, source);
                restored.speed = get_f32(meta, "speed").unwrap_or(shot.speed);
                restored.damage = get_i32(meta, "damage").unwrap_or(shot.damage);
                restored.duration = get_u32(meta, "duration").unwrap_or(shot.duration);
                EntityKind::Projectile(restored)
            }
            EntityKind::Turret { angle, cooldown } => EntityKind::Turret {
                angle: get_f32(meta, "angle").unwrap_or(angle),
                cooldown: get_u32(meta, "cooldown").unwrap_or(cooldown),
            },
            EntityKind::DungeonChest { opened } => EntityKind::DungeonChest {
                opened: get_bool(meta, "opened").unwrap_or(opened),
            },
            EntityKind::AuraWisp {
                bond,
                angle,
                cooldown,
            } => EntityKind::AuraWisp {
                bond: get_u32(meta, "bond").unwrap_or(bond),
                angle: get_f32(meta, "angle").unwrap_or(angle),
                cooldown: get_u32(meta, "cooldown").unwrap_or(cooldown),
            },
            other => other,
        }
    }
}
