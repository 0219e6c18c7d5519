//! Byte-oriented storage backend for save files
//!
//! The codec produces and consumes whole byte buffers; the store only
//! moves them to and from durable storage. Open and close are folded into
//! each call, so there is no handle to leak. Single-threaded, blocking,
//! no retries.

use super::types::SaveError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Minimal durable byte container consumed by the save manager.
pub trait Store {
    /// Reads the entire contents at `path`. A missing path fails with
    /// `NotFound`; every other failure is `Io`.
    fn read_all(&mut self, path: &Path) -> Result<Vec<u8>, SaveError>;

    /// Replaces the entire contents at `path`.
    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SaveError>;

    fn exists(&self, path: &Path) -> bool;
}

/// Store backed by the local filesystem.
pub struct FileStore;

impl Store for FileStore {
    fn read_all(&mut self, path: &Path) -> Result<Vec<u8>, SaveError> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SaveError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(SaveError::Io(e)),
        }
    }

    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
        fs::write(path, bytes).map_err(SaveError::Io)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory store for tests.
#[cfg(test)]
pub(crate) struct MemStore {
    files: std::collections::HashMap<std::path::PathBuf, Vec<u8>>,
}

#[cfg(test)]
impl MemStore {
    pub(crate) fn new() -> Self {
        MemStore {
            files: std::collections::HashMap::new(),
        }
    }
}

#[cfg(test)]
impl Store for MemStore {
    fn read_all(&mut self, path: &Path) -> Result<Vec<u8>, SaveError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SaveError::NotFound(path.display().to_string()))
    }

    fn write_all(&mut self, path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
