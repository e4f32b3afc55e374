//! Roomcrawl headless driver
//!
//! Loads a save record, runs the simulation for a number of frames with no
//! input and writes the record back.
//!
//! Usage: `roomcrawl <save.json> [frames] [catalog.json]`
//!
//! `ROOMCRAWL_SEED` fixes the seed of a new world and `ROOMCRAWL_SETTINGS`
//! names a settings file.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, fs};

use anyhow::{Context, Result, bail};

use roomcrawl::catalog::Catalog;
use roomcrawl::consts::FRAMERATE;
use roomcrawl::persistence;
use roomcrawl::settings::Settings;
use roomcrawl::sim::Arena;

const DEFAULT_FRAMES: u64 = 600;

fn seed() -> u64 {
    if let Some(seed) = env::var("ROOMCRAWL_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.first() else {
        bail!("usage: roomcrawl <save.json> [frames] [catalog.json]");
    };
    let frames = match args.get(1) {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("invalid frame count '{n}'"))?,
        None => DEFAULT_FRAMES,
    };
    let catalog = match args.get(2) {
        Some(file) => {
            let json = fs::read_to_string(file)
                .with_context(|| format!("failed to read catalog {file}"))?;
            Catalog::from_json(&json).with_context(|| format!("bad catalog {file}"))?
        }
        None => Catalog::builtin(),
    };
    let catalog = Arc::new(catalog);
    let settings = match env::var("ROOMCRAWL_SETTINGS") {
        Ok(file) => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read settings {file}"))?;
            Settings::from_json(&json)
        }
        Err(_) => Settings::default(),
    };
    log::debug!("Quality preset: {}", settings.quality.as_str());

    let mut arena = match fs::read_to_string(path) {
        Ok(json) => {
            let record = persistence::from_json(&json)
                .with_context(|| format!("failed to parse {path}"))?;
            persistence::load(&record, catalog, settings)
                .with_context(|| format!("failed to load {path}"))?
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let seed = seed();
            log::info!("No save at {path}, starting a new world (seed {seed})");
            Arena::new(seed, catalog, settings)
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {path}")),
    };

    log::info!(
        "Running {} frames ({:.1}s of game time)",
        frames,
        frames as f32 / FRAMERATE as f32
    );
    for _ in 0..frames {
        arena.tick();
        if arena.player.eliminated {
            log::info!("Player eliminated after {} ticks", arena.time_ticks);
            break;
        }
    }

    let record = persistence::save(&arena);
    fs::write(path, persistence::to_json(&record)?)
        .with_context(|| format!("failed to write {path}"))?;
    log::info!(
        "Saved room ({}, {}) with {} room(s) to {}",
        arena.player.rx,
        arena.player.ry,
        record.rooms.len(),
        path
    );
    Ok(())
}
