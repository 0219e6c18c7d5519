//! Simulation configuration
//!
//! All driver-level tunables live in one JSON-loadable struct. Every field
//! has a default, so a config file only needs the values it overrides.

use crate::blob::BlobTuning;
use crate::world::SpawnArea;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Spawn area extents, in world units.
    pub area_width: f32,
    pub area_height: f32,
    /// Fraction of each axis kept clear at the edges.
    pub border: f32,

    /// Seconds between spawns.
    pub spawn_time_max: f32,
    /// Seconds between target switches.
    pub switch_time_max: f32,
    /// Seconds between simulated pokes. Stand-in for click input in the
    /// headless driver.
    pub poke_time_max: f32,

    /// Number of size steps until a poked target blob is destroyed.
    pub max_size_step: u32,
    /// Movement lerp speed.
    pub move_speed: f32,
    /// How fast blobs scale up or down.
    pub scale_speed: f32,

    /// Seconds between autosaves.
    pub autosave_secs: u64,
    /// Autosaves kept per slot after cleanup.
    pub autosave_keep: usize,

    /// Fixed RNG seed for replayable runs; omit for an entropy seed.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            area_width: 16.0,
            area_height: 9.0,
            border: 0.1,
            spawn_time_max: 1.0,
            switch_time_max: 3.0,
            poke_time_max: 0.75,
            max_size_step: 3,
            move_speed: 0.3,
            scale_speed: 1.0,
            autosave_secs: 300,
            autosave_keep: 3,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.max_size_step == 0 {
            return Err("max_size_step must be at least 1".into());
        }
        if self.spawn_time_max <= 0.0 || self.switch_time_max <= 0.0 || self.poke_time_max <= 0.0 {
            return Err("spawn, switch and poke periods must be positive".into());
        }
        Ok(())
    }

    pub fn tuning(&self) -> BlobTuning {
        BlobTuning {
            max_size_step: self.max_size_step,
            move_speed: self.move_speed,
            scale_speed: self.scale_speed,
        }
    }

    pub fn spawn_area(&self) -> SpawnArea {
        SpawnArea {
            width: self.area_width,
            height: self.area_height,
            border: self.border,
        }
    }
}
