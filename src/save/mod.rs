//! Save/Load system for blobsim
//!
//! This module provides a complete save/load system with:
//! - JSON-based save files (human-readable, debuggable)
//! - Multiple save slots (1-5)
//! - Periodic autosaves with cleanup
//! - A format version tag checked on load
//! - Stable-id references that survive reconstruction
//!
//! # Architecture
//!
//! - `types`: Save document structures and error types
//! - `codec`: Pure document ⇄ bytes conversion and invariant validation
//! - `store`: Byte-oriented storage backend (filesystem)
//! - `manager`: SaveManager for slots, autosaves, and file bookkeeping
//! - `saveable`: Saveable trait for entities
//!
//! # Example Usage
//!
//! ```ignore
//! let mut save_manager = SaveManager::new("~/.blobsim/saves")?;
//!
//! // Save
//! let save_file = SaveFile {
//!     version: CURRENT_SAVE_VERSION,
//!     timestamp: SystemTime::now(),
//!     metadata: SaveMetadata { /* ... */ },
//!     world: world.snapshot(),
//! };
//! save_manager.save_game(&save_file)?;
//!
//! // Load
//! let loaded = save_manager.load_game(1)?; // Load slot 1
//! world.restore(&loaded.world)?;
//! ```

pub mod codec;
pub mod manager;
pub mod saveable;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use manager::SaveManager;
pub use saveable::Saveable;
pub use store::{FileStore, Store};
pub use types::*;
