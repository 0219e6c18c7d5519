//! Snapshot codec: pure conversion between save documents and bytes
//!
//! The codec owns no state between calls. Encoding writes pretty JSON
//! (human-readable, debuggable) with a deterministic field order: envelope
//! first, then timers, records, and the active id, in struct order.
//! Decoding validates the registry invariants before the document is
//! handed to anyone, so a corrupt file is rejected before any live state
//! gets torn down.

use super::types::{SaveError, SaveFile, CURRENT_SAVE_VERSION};

/// Encodes a save file to bytes.
///
/// Never fails on a valid in-memory document; the error path exists for
/// the serializer contract only.
pub fn encode(file: &SaveFile) -> Result<Vec<u8>, SaveError> {
    Ok(serde_json::to_vec_pretty(file)?)
}

/// Decodes and validates a save file.
///
/// Truncated or unparseable input fails with `Serialization`; a document
/// that parses but violates an invariant fails with `InvalidVersion` or
/// `CorruptSnapshot`.
pub fn decode(bytes: &[u8]) -> Result<SaveFile, SaveError> {
    let file: SaveFile = serde_json::from_slice(bytes)?;
    validate(&file)?;
    Ok(file)
}

/// Checks the document invariants that do not need world context.
///
/// - the format version must not be newer than this build understands
/// - record ids must be unique
/// - `active_id`, if present, must match exactly one record
pub fn validate(file: &SaveFile) -> Result<(), SaveError> {
    if file.version > CURRENT_SAVE_VERSION {
        return Err(SaveError::InvalidVersion(file.version));
    }

    let document = &file.world;

    for (i, record) in document.records.iter().enumerate() {
        if document.records[..i].iter().any(|r| r.id == record.id) {
            return Err(SaveError::CorruptSnapshot(format!(
                "duplicate blob id {}",
                record.id
            )));
        }
    }

    if let Some(active_id) = document.active_id {
        if !document.records.iter().any(|r| r.id == active_id) {
            return Err(SaveError::CorruptSnapshot(format!(
                "active id {} missing from records",
                active_id
            )));
        }
    }

    Ok(())
}
