//! Headless driver for the blob simulation
//!
//! Runs the world at a fixed step: blobs spawn on a countdown, the target
//! blob switches on another, and periodic pokes stand in for click input.
//! The world autosaves while running and writes a manual save on exit.
//! Save and load never interleave a tick; this loop is the single writer.

use blobsim::blob::InteractOutcome;
use blobsim::config::SimConfig;
use blobsim::random::WorldRng;
use blobsim::save::{SaveFile, SaveManager, SaveMetadata, SaveType, CURRENT_SAVE_VERSION};
use blobsim::world::{BlobWorld, LogHighlight};

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Fixed simulation step, in seconds.
const DT: f32 = 1.0 / 60.0;

struct CliArgs {
    slot: u8,
    steps: u32,
    config: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = CliArgs {
        slot: 1,
        steps: 3600,
        config: None,
        save_dir: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--slot" => {
                args.slot = next_value(&mut iter, "--slot")?
                    .parse()
                    .map_err(|e| format!("bad --slot value: {}", e))?;
            }
            "--steps" => {
                args.steps = next_value(&mut iter, "--steps")?
                    .parse()
                    .map_err(|e| format!("bad --steps value: {}", e))?;
            }
            "--config" => {
                args.config = Some(PathBuf::from(next_value(&mut iter, "--config")?));
            }
            "--save-dir" => {
                args.save_dir = Some(PathBuf::from(next_value(&mut iter, "--save-dir")?));
            }
            other => {
                return Err(format!(
                    "unknown argument: {} (expected --slot, --steps, --config, --save-dir)",
                    other
                ));
            }
        }
    }

    Ok(args)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn default_save_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".blobsim/saves"))
        .unwrap_or_else(|| PathBuf::from("./saves"))
}

fn build_save_file(world: &BlobWorld, slot: u8, save_type: SaveType, playtime: f64) -> SaveFile {
    SaveFile {
        version: CURRENT_SAVE_VERSION,
        timestamp: SystemTime::now(),
        metadata: SaveMetadata {
            game_version: env!("CARGO_PKG_VERSION").to_string(),
            playtime_seconds: playtime as u64,
            save_type,
            save_slot: slot,
        },
        world: world.snapshot(),
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => SimConfig::load_from_file(path)
            .map_err(|e| format!("failed to load config {}: {}", path.display(), e))?,
        None => SimConfig::default(),
    };

    let save_dir = args.save_dir.clone().unwrap_or_else(default_save_dir);
    let mut save_manager = SaveManager::new(&save_dir)
        .map_err(|e| format!("failed to create save manager: {}", e))?;
    save_manager.set_save_slot(args.slot);
    save_manager.set_autosave_interval(Duration::from_secs(config.autosave_secs));

    let rng = match config.seed {
        Some(seed) => WorldRng::seeded(seed),
        None => WorldRng::from_entropy(),
    };
    let mut world = BlobWorld::new(
        config.spawn_area(),
        config.tuning(),
        rng,
        Box::new(LogHighlight),
    );

    // Playtime carries across sessions through the save metadata.
    let mut playtime = 0.0f64;

    if save_manager.save_exists(args.slot) {
        let file = save_manager
            .load_game(args.slot)
            .map_err(|e| format!("failed to load slot {}: {}", args.slot, e))?;
        world
            .restore(&file.world)
            .map_err(|e| format!("failed to restore slot {}: {}", args.slot, e))?;
        playtime = file.metadata.playtime_seconds as f64;
        log::info!(
            "loaded slot {}: {} blobs, {} s played",
            args.slot,
            world.len(),
            file.metadata.playtime_seconds
        );
    } else {
        log::info!("no save in slot {}, starting a fresh world", args.slot);
        let first = world.spawn();
        world.set_active(first).map_err(|e| e.to_string())?;
    }

    let mut poke_countdown = config.poke_time_max;

    for _ in 0..args.steps {
        world.tick(DT);
        playtime += DT as f64;

        {
            let timers = world.timers_mut();
            timers.spawn_countdown -= DT;
            timers.switch_countdown -= DT;
        }

        // Spawn blobs every spawn_time_max seconds.
        while world.timers().spawn_countdown < 0.0 {
            world.timers_mut().spawn_countdown += config.spawn_time_max;
            let id = world.spawn();
            log::debug!("spawned blob {} ({} alive)", id, world.len());
        }

        // Switch the target every switch_time_max seconds.
        if world.timers().switch_countdown < 0.0 {
            world.timers_mut().switch_countdown = config.switch_time_max;
            if let Some(id) = world.random_blob() {
                world.set_active(id).map_err(|e| e.to_string())?;
            }
        }

        // Poke a random blob every poke_time_max seconds.
        poke_countdown -= DT;
        if poke_countdown < 0.0 {
            poke_countdown = config.poke_time_max;
            if let Some(id) = world.random_blob() {
                match world.interact(id).map_err(|e| e.to_string())? {
                    InteractOutcome::ShrunkToNothing => {
                        log::info!("blob {} shrank to nothing ({} alive)", id, world.len());
                    }
                    InteractOutcome::Resized => {}
                }
            }
        }

        if !world.is_empty() && save_manager.should_autosave() {
            let file = build_save_file(&world, args.slot, SaveType::Auto, playtime);
            if let Err(e) = save_manager.save_game(&file) {
                log::warn!("autosave failed: {}", e);
            }
        }
    }

    if world.is_empty() {
        log::warn!("every blob shrank to nothing; nothing to save");
    } else {
        let file = build_save_file(&world, args.slot, SaveType::Manual, playtime);
        save_manager
            .save_game(&file)
            .map_err(|e| format!("final save failed: {}", e))?;
    }
    save_manager
        .cleanup_autosaves(config.autosave_keep)
        .map_err(|e| format!("autosave cleanup failed: {}", e))?;

    log::info!(
        "run complete: {} blobs alive after {} steps",
        world.len(),
        args.steps
    );
    Ok(())
}
