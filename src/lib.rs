//! blobsim - blobs that drift, grow, shrink, and survive save/load
//!
//! Core modules:
//! - `blob`: One simulation entity and its animation state machine
//! - `world`: The registry owning all live blobs and the active target
//! - `save`: Snapshot codec, byte store, and the slot/autosave manager
//! - `random`: Seeded deterministic randomness
//! - `config`: File-driven simulation tuning

pub mod blob;
pub mod config;
pub mod random;
pub mod save;
pub mod world;

pub use blob::{Blob, BlobId, BlobTuning, InteractOutcome};
pub use config::SimConfig;
pub use world::{BlobWorld, WorldError};
