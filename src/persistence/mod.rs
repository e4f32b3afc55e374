//! Load/store boundary
//!
//! Converts between a live `Arena` and a plain `SaveRecord`. No file I/O
//! happens here; callers move the JSON text wherever they keep it. A record
//! that fails to parse or describes an impossible world is rejected whole.

pub mod record;

use std::collections::HashSet;
use std::sync::Arc;

use glam::Vec2;

use crate::catalog::Catalog;
use crate::error::{LoadError, Result};
use crate::settings::Settings;
use crate::sim::arena::Arena;
use crate::sim::entity::PLAYER_SOURCE;
use crate::sim::item::Item;
use crate::sim::player::Player;
use crate::sim::room::{Block, Room};

pub use record::{BlockRecord, EntityRecord, ItemRecord, RoomRecord, SaveRecord};

/// Parse a save record
pub fn from_json(json: &str) -> Result<SaveRecord> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a save record
pub fn to_json(record: &SaveRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

fn finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn validate(record: &SaveRecord) -> Result<()> {
    if !finite(&[record.x, record.y]) {
        return Err(LoadError::Validation(format!(
            "player position ({}, {}) is not finite",
            record.x, record.y
        )));
    }

    let mut seen = HashSet::new();
    for room in &record.rooms {
        let at = (room.rx, room.ry);
        if !seen.insert(at) {
            return Err(LoadError::Validation(format!("duplicate room at {at:?}")));
        }
        if !finite(&[room.w, room.h]) || room.w <= 0.0 || room.h <= 0.0 {
            return Err(LoadError::Validation(format!(
                "room {at:?} has invalid extent {} x {}",
                room.w, room.h
            )));
        }
        for block in &room.blocks {
            if !finite(&[block.x, block.y, block.w, block.h]) || block.w <= 0.0 || block.h <= 0.0 {
                return Err(LoadError::Validation(format!(
                    "room {at:?} has an invalid block {block:?}"
                )));
            }
        }
        for entity in &room.entities {
            if !finite(&[entity.x, entity.y]) {
                return Err(LoadError::Validation(format!(
                    "room {at:?}: entity '{}' has a non-finite position",
                    entity.id
                )));
            }
        }
    }
    Ok(())
}

/// Rebuild an arena from a record
pub fn load(record: &SaveRecord, catalog: Arc<Catalog>, settings: Settings) -> Result<Arena> {
    validate(record)?;

    let item = record.item.as_ref().map(|saved| {
        let mut item = Item::from_id(&catalog, &saved.id);
        if let Some(ammo) = saved.ammo {
            item.ammo = ammo.min(item.max_ammo);
        }
        item
    });
    let mut player = Player::new(Vec2::new(record.x, record.y), record.rx, record.ry, item);
    if let Some(hp) = record.hp {
        player.hp = hp.clamp(0, player.max_hp);
        player.eliminated = player.hp == 0;
    }

    // Saved uids are kept so projectile sources still point at their
    // shooter; missing, reserved or repeated ones get fresh ids above them.
    let mut next_uid = record
        .rooms
        .iter()
        .flat_map(|room| &room.entities)
        .filter_map(|entity| entity.uid)
        .max()
        .unwrap_or(PLAYER_SOURCE)
        + 1;
    let mut taken = HashSet::new();
    let mut rooms = Vec::with_capacity(record.rooms.len());
    for saved in &record.rooms {
        let mut room = Room::new(saved.rx, saved.ry, saved.w, saved.h, saved.kind, saved.doors);
        room.layout = saved.blocks.iter().map(Block::from).collect();
        for entity in &saved.entities {
            let uid = match entity.uid {
                Some(uid) if uid != PLAYER_SOURCE && taken.insert(uid) => uid,
                _ => {
                    let uid = next_uid;
                    next_uid += 1;
                    taken.insert(uid);
                    uid
                }
            };
            let entity = entity.to_entity(&catalog, uid);
            if entity.size.x <= 0.0 || entity.size.y <= 0.0 {
                return Err(LoadError::Validation(format!(
                    "entity '{}' in room ({}, {}) has a non-positive box",
                    entity.id(),
                    saved.rx,
                    saved.ry
                )));
            }
            room.entities.push(entity);
        }
        rooms.push(room);
    }

    log::info!(
        "Loaded {} room(s), player in ({}, {})",
        rooms.len(),
        record.rx,
        record.ry
    );
    Ok(Arena::from_parts(player, rooms, record.seed, catalog, settings))
}

/// Snapshot an arena. Dying entities, particles and lights are not kept.
pub fn save(arena: &Arena) -> SaveRecord {
    let player = &arena.player;
    let rooms: Vec<RoomRecord> = arena
        .rooms()
        .iter()
        .map(|room| RoomRecord {
            rx: room.rx,
            ry: room.ry,
            w: room.w,
            h: room.h,
            kind: room.kind,
            doors: room.doors,
            blocks: room.layout.iter().map(BlockRecord::from).collect(),
            entities: room
                .entities
                .iter()
                .filter(|e| !e.destroy)
                .map(EntityRecord::from_entity)
                .collect(),
        })
        .collect();

    log::info!("Saved {} room(s)", rooms.len());
    SaveRecord {
        seed: arena.seed(),
        x: player.pos.x,
        y: player.pos.y,
        rx: player.rx,
        ry: player.ry,
        hp: Some(player.hp),
        item: player.item.as_ref().map(|item| ItemRecord {
            id: item.id().to_string(),
            ammo: (item.max_ammo > 0).then_some(item.ammo),
        }),
        rooms,
    }
}
