//! Save data types for blobsim
//!
//! This module defines all the data structures used for saving and loading
//! world state, plus the save error taxonomy. Serde handles the mapping to
//! and from JSON.

use crate::blob::{BlobId, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// The root save file structure.
///
/// Field order is the on-disk order: envelope first (version, timestamp,
/// metadata), then the world document.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub timestamp: SystemTime,
    pub metadata: SaveMetadata,
    pub world: WorldDocument,
}

/// Metadata about the save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub game_version: String,
    pub playtime_seconds: u64,
    pub save_type: SaveType,
    pub save_slot: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SaveType {
    Manual,
    Auto,
    QuickSave,
}

/// Serializable projection of the whole world: registry timers, one record
/// per live blob, and the stable id of the active blob.
///
/// Record order mirrors the live collection so reconstruction is
/// order-stable. `active_id`, when present, must match exactly one record;
/// a document violating that is corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    pub timers: TimerData,
    pub records: Vec<BlobRecord>,
    pub active_id: Option<BlobId>,
}

/// Spawner countdowns owned by the world, not by any blob.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimerData {
    pub spawn_countdown: f32,
    pub switch_countdown: f32,
}

/// Serializable projection of one blob.
///
/// Runtime-only state (the highlight signal, tuning shared with the rest of
/// the world) is never stored; it is re-derived on reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobRecord {
    pub id: BlobId,
    pub transform: TransformRecord,
    pub size_step: u32,
    pub scale_to: f32,
    pub cur_scale: f32,
    pub scaling: bool,
    pub lerp_time: f32,
    pub start: [f32; 3],
    pub end: [f32; 3],
}

impl BlobRecord {
    /// True when every stored float is an ordinary finite value.
    pub fn is_finite(&self) -> bool {
        self.transform.is_finite()
            && [self.scale_to, self.cur_scale, self.lerp_time]
                .iter()
                .all(|v| v.is_finite())
            && self
                .start
                .iter()
                .chain(self.end.iter())
                .all(|v| v.is_finite())
    }
}

/// A transform frozen into plain float arrays.
///
/// Engine math types never cross the serialization boundary; `freeze` and
/// `thaw` are the only two places where the conversion happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl TransformRecord {
    /// Freezes a live transform for storage.
    pub fn freeze(transform: &Transform) -> Self {
        TransformRecord {
            position: transform.position.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale.to_array(),
        }
    }

    /// Rebuilds the live transform from stored floats.
    pub fn thaw(&self) -> Transform {
        Transform {
            position: Vec3::from_array(self.position),
            rotation: Quat::from_array(self.rotation),
            scale: Vec3::from_array(self.scale),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter())
            .all(|v| v.is_finite())
    }
}

/// Error types for save/load operations
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    /// Read of a path that does not exist.
    NotFound(String),
    /// Truncated or otherwise unparseable bytes.
    Serialization(serde_json::Error),
    InvalidVersion(u32),
    /// A record field outside its declared range, or a non-finite float.
    MalformedRecord(String),
    /// A document that parses but violates a registry invariant, such as an
    /// active id with no matching record.
    CorruptSnapshot(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::NotFound(path) => write!(f, "save file not found: {}", path),
            SaveError::Serialization(e) => write!(f, "serialization error: {}", e),
            SaveError::InvalidVersion(v) => write!(f, "unsupported save version: {}", v),
            SaveError::MalformedRecord(msg) => write!(f, "malformed record: {}", msg),
            SaveError::CorruptSnapshot(msg) => write!(f, "corrupt snapshot: {}", msg),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        SaveError::Io(err)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::Serialization(err)
    }
}

/// Current save file version
pub const CURRENT_SAVE_VERSION: u32 = 1;
