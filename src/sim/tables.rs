//! Weighted tables for the room generator and chest loot
//!
//! Each entry is `(candidate, rolls)`; see `roll::roll`.

use super::room::RoomKind;

/// Enemies and hazards placed in a dungeon room
pub const DUNGEON_SPAWNS: &[(&str, u32)] = &[
    ("spider", 6),
    ("explosive_spider", 3),
    ("methane_can", 2),
];

/// Number of spawns in a dungeon room
pub const ENEMY_COUNTS: &[(usize, u32)] = &[
    (5, 3),
    (6, 4),
    (7, 4),
    (8, 3),
    (9, 2),
    (10, 2),
    (11, 1),
    (12, 1),
];

/// Items found on the floor of passages and in chests
pub const LOOT_ITEMS: &[(&str, u32)] = &[
    ("pistol", 5),
    ("rifle", 2),
    ("dagger", 4),
    ("rocket_launcher", 1),
    ("flamethrower", 2),
    ("aura_blade", 1),
    ("grenade", 5),
    ("methane_can", 3),
    ("turret", 2),
    ("medkit", 5),
];

/// Number of pickups dropped by a chest
pub const LOOT_COUNTS: &[(usize, u32)] = &[(1, 3), (2, 2), (3, 1)];

/// Spawn table for a room kind (passages spawn no enemies)
pub fn spawn_table(kind: RoomKind) -> &'static [(&'static str, u32)] {
    match kind {
        RoomKind::Dungeon => DUNGEON_SPAWNS,
        RoomKind::Passage => &[],
    }
}
