//! Saveable trait for entities that can be saved/loaded
//!
//! This trait provides a generic interface for converting live objects
//! to/from their serializable records. Any entity that needs to be saved
//! should implement this trait.

use super::types::SaveError;

/// Trait for entities that can be saved and loaded
///
/// # Design Pattern: Record Projection
///
/// Each live type pairs with a plain serializable `Record` type. Conversion
/// is lossless in both directions except for runtime-only state, which the
/// caller supplies through `Context` when reconstructing.
///
/// # Example
///
/// ```ignore
/// impl Saveable for Blob {
///     type Record = BlobRecord;
///     type Context = BlobTuning;
///
///     fn to_record(&self) -> BlobRecord {
///         // Freeze live state into the record
///     }
///
///     fn from_record(record: &BlobRecord, tuning: &BlobTuning) -> Result<Self, SaveError> {
///         // Validate the record and rebuild the live entity
///     }
/// }
/// ```
pub trait Saveable: Sized {
    /// The serializable projection of this type.
    type Record;

    /// Runtime-only state the record does not carry, provided on
    /// reconstruction.
    type Context;

    /// Convert the entity to its record. Must not mutate the entity.
    fn to_record(&self) -> Self::Record;

    /// Create an entity from a stored record.
    ///
    /// Fails with `MalformedRecord` if any field is outside its declared
    /// range.
    fn from_record(record: &Self::Record, context: &Self::Context) -> Result<Self, SaveError>;
}
