//! Static per-type configuration for entities and items
//!
//! Loaded once at startup and shared read-only (`Arc<Catalog>`). Lookups for
//! ids the catalog does not know fall back to a neutral default record
//! instead of failing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BOX;
use crate::error::{LoadError, Result};

/// Capability flags carried by every entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityFlags {
    /// Moved by knockback (otherwise immovable)
    pub ghostlike: bool,
    /// Reacts to the player's interact intent
    pub interactable: bool,
    /// Destroyed when the player leaves the room
    pub temporary: bool,
    /// Counts toward the room-clear check
    pub opponent: bool,
    /// Ignores damage and knockback
    pub immune: bool,
}

/// Static record for one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySpec {
    pub name: String,
    pub w: f32,
    pub h: f32,
    pub max_hp: i32,
    pub flags: EntityFlags,
}

impl Default for EntitySpec {
    fn default() -> Self {
        Self {
            name: "???".to_string(),
            w: DEFAULT_BOX,
            h: DEFAULT_BOX,
            max_hp: 0,
            flags: EntityFlags::default(),
        }
    }
}

/// How an item is spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// Single use, destroyed afterwards
    Consume,
    /// Reusable, optionally ammunition-limited
    #[default]
    Shooter,
}

/// Static record for one item type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSpec {
    pub name: String,
    pub class: ItemClass,
    /// Cooldown ticks after a use
    pub delay: u32,
    /// Continuous use while held
    pub automatic: bool,
    /// Magazine size (0 = no ammunition tracked)
    pub max_ammo: u32,
    /// Ticks to refill the magazine
    pub reload_time: u32,
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            name: "???".to_string(),
            class: ItemClass::Shooter,
            delay: 0,
            automatic: false,
            max_ammo: 0,
            reload_time: 0,
        }
    }
}

/// Entity and item tables keyed by type id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub entities: HashMap<String, EntitySpec>,
    #[serde(default)]
    pub items: HashMap<String, ItemSpec>,
    #[serde(skip)]
    fallback_entity: EntitySpec,
    #[serde(skip)]
    fallback_item: ItemSpec,
}

impl Catalog {
    /// The shipped tables
    pub fn builtin() -> Self {
        let mut catalog = Self::default();

        let enemy = EntityFlags {
            ghostlike: true,
            opponent: true,
            ..Default::default()
        };
        let missile = EntityFlags {
            temporary: true,
            immune: true,
            ..Default::default()
        };
        let prop = EntityFlags {
            immune: true,
            ..Default::default()
        };

        for (id, name, w, h, max_hp, flags) in [
            ("spider", "Spider", 0.75, 0.75, 3, enemy),
            ("explosive_spider", "Explosive Spider", 0.75, 0.75, 2, enemy),
            (
                "methane_can",
                "Methane Can",
                0.6,
                0.8,
                1,
                EntityFlags {
                    interactable: true,
                    ..Default::default()
                },
            ),
            ("grenade", "Grenade", 0.4, 0.4, 1, missile),
            ("bullet", "Bullet", 0.25, 0.25, 1, missile),
            ("dagger", "Dagger", 0.4, 0.4, 1, missile),
            ("flameball", "Flameball", 0.3, 0.3, 1, missile),
            ("rocket", "Rocket", 0.4, 0.4, 1, missile),
            ("web", "Web", 0.4, 0.4, 1, missile),
            (
                "item",
                "Item",
                0.6,
                0.6,
                1,
                EntityFlags {
                    interactable: true,
                    immune: true,
                    ..Default::default()
                },
            ),
            (
                "turret",
                "Turret",
                0.75,
                0.75,
                5,
                EntityFlags {
                    interactable: true,
                    ..Default::default()
                },
            ),
            ("dungeon_chest", "Chest", 1.0, 0.8, 1, prop),
            ("barricade", "Barricade", DEFAULT_BOX, DEFAULT_BOX, 1, prop),
            ("aura_wisp", "Aura Wisp", 0.4, 0.4, 1, missile),
        ] {
            catalog.entities.insert(
                id.to_string(),
                EntitySpec {
                    name: name.to_string(),
                    w,
                    h,
                    max_hp,
                    flags,
                },
            );
        }

        use ItemClass::{Consume, Shooter};
        for (id, name, class, delay, automatic, max_ammo, reload_time) in [
            ("pistol", "Pistol", Shooter, 12, false, 8, 60),
            ("rifle", "Rifle", Shooter, 5, true, 30, 120),
            ("dagger", "Throwing Daggers", Shooter, 15, false, 3, 90),
            ("rocket_launcher", "Rocket Launcher", Shooter, 30, false, 1, 150),
            ("flamethrower", "Flamethrower", Shooter, 3, true, 40, 120),
            ("aura_blade", "Aura Blade", Shooter, 20, false, 0, 0),
            ("grenade", "Grenade", Consume, 0, false, 0, 0),
            ("methane_can", "Methane Can", Consume, 0, false, 0, 0),
            ("turret", "Turret", Consume, 0, false, 0, 0),
            ("medkit", "Medkit", Consume, 0, false, 0, 0),
        ] {
            catalog.items.insert(
                id.to_string(),
                ItemSpec {
                    name: name.to_string(),
                    class,
                    delay,
                    automatic,
                    max_ammo,
                    reload_time,
                },
            );
        }

        catalog
    }

    /// Built-in tables with the records from a JSON document layered on top
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: Catalog = serde_json::from_str(json)?;
        let mut catalog = Self::builtin();
        for (id, spec) in overrides.entities {
            if spec.w <= 0.0 || spec.h <= 0.0 {
                return Err(LoadError::Catalog(format!(
                    "entity '{id}' has a non-positive box"
                )));
            }
            catalog.entities.insert(id, spec);
        }
        catalog.items.extend(overrides.items);
        log::info!(
            "Catalog loaded: {} entity types, {} item types",
            catalog.entities.len(),
            catalog.items.len()
        );
        Ok(catalog)
    }

    /// Entity record, or the neutral default for unknown ids
    pub fn entity(&self, id: &str) -> &EntitySpec {
        self.entities.get(id).unwrap_or(&self.fallback_entity)
    }

    /// Item record, or the neutral default for unknown ids
    pub fn item(&self, id: &str) -> &ItemSpec {
        self.items.get(id).unwrap_or(&self.fallback_item)
    }
}
