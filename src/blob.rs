//! Blob entity and its animation state machine
//!
//! Blobs drift back and forth between two anchor points. The current
//! target blob shrinks one size step when poked; every other blob grows
//! one step, up to a maximum. A blob that shrinks to nothing reports a
//! terminal outcome and is destroyed by the world that owns it.
//!
//! # State Split
//!
//! Everything a blob needs to survive a save/load round trip lives in
//! plain fields that project losslessly into a `BlobRecord`. Tuning values
//! shared by every blob in a world (`BlobTuning`) are deliberately not
//! part of the record; reconstruction receives them as context, the same
//! way the live spawner hands them to `spawn`.

use crate::random::WorldRng;
use crate::save::{BlobRecord, SaveError, Saveable, TransformRecord};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of one leg of the back-and-forth oscillation, in phase units.
/// The accumulator runs over two legs, `[0, 2 * OSC_PERIOD)`.
pub const OSC_PERIOD: f32 = 1.0;

/// Stable identifier for one blob.
///
/// Ids are random 64-bit tokens, unique within a world and stable across
/// save/load. They are never positional: removing a blob does not shift
/// anyone else's identity, which is what makes the saved active-blob
/// reference safe to resolve after a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(u64);

impl BlobId {
    pub fn from_raw(raw: u64) -> Self {
        BlobId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Tuning shared by every blob in a world.
#[derive(Debug, Clone, Copy)]
pub struct BlobTuning {
    /// Number of size steps until a poked target blob is destroyed.
    pub max_size_step: u32,
    /// Movement lerp speed, in phase units per second.
    pub move_speed: f32,
    /// How fast blobs scale up or down, in scale units per second.
    pub scale_speed: f32,
}

impl Default for BlobTuning {
    fn default() -> Self {
        BlobTuning {
            max_size_step: 3,
            move_speed: 0.3,
            scale_speed: 1.0,
        }
    }
}

/// Live transform state.
///
/// Engine math types stay on this side of the serialization boundary;
/// `TransformRecord::freeze`/`thaw` are the only conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Outcome of poking a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractOutcome {
    /// The blob changed size and keeps living.
    Resized,
    /// The blob's size step just reached zero. The owner must remove it,
    /// exactly once.
    ShrunkToNothing,
}

#[derive(Debug)]
pub struct Blob {
    id: BlobId,
    transform: Transform,
    tuning: BlobTuning,

    // Scaling state
    size_step: u32,
    scale_to: f32,
    cur_scale: f32,
    scaling: bool,

    // Oscillation state
    lerp_time: f32,
    start: Vec3,
    end: Vec3,
}

impl Blob {
    /// Creates a freshly spawned blob at the given position.
    ///
    /// The movement pattern runs from the spawn position to a second anchor
    /// a random direction and distance (1 to 5 units) away. The blob starts
    /// at full size and is not scaling.
    pub fn spawn(id: BlobId, position: Vec3, tuning: BlobTuning, rng: &mut WorldRng) -> Self {
        let start = position;
        let end = start + rng.unit_direction() * rng.uniform(1.0, 5.0);

        Blob {
            id,
            transform: Transform {
                position,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
            },
            tuning,
            size_step: tuning.max_size_step,
            scale_to: 1.0,
            cur_scale: 1.0,
            scaling: false,
            lerp_time: 0.0,
            start,
            end,
        }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn size_step(&self) -> u32 {
        self.size_step
    }

    pub fn is_scaling(&self) -> bool {
        self.scaling
    }

    pub fn cur_scale(&self) -> f32 {
        self.cur_scale
    }

    pub fn phase(&self) -> f32 {
        self.lerp_time
    }

    pub fn anchors(&self) -> (Vec3, Vec3) {
        (self.start, self.end)
    }

    /// Advances the blob by `dt` seconds.
    ///
    /// The oscillation phase moves by `dt * move_speed` and resets to zero
    /// past two periods; position is always the interpolation of the
    /// current phase, outbound during the first period and back during the
    /// second. While a scale change is in progress, the current scale steps
    /// toward the target and snaps exactly onto it on the tick that reaches
    /// or crosses it.
    pub fn tick(&mut self, dt: f32) {
        // Advance the phase first so position always reflects it.
        self.lerp_time += dt * self.tuning.move_speed;
        if self.lerp_time > 2.0 * OSC_PERIOD {
            self.lerp_time = 0.0;
        }

        self.transform.position = if self.lerp_time < OSC_PERIOD {
            self.start.lerp(self.end, self.lerp_time / OSC_PERIOD)
        } else {
            self.end
                .lerp(self.start, (self.lerp_time - OSC_PERIOD) / OSC_PERIOD)
        };

        if self.scaling {
            let step = self.tuning.scale_speed * dt;

            if self.cur_scale < self.scale_to {
                self.cur_scale += step;
                if self.cur_scale >= self.scale_to {
                    self.cur_scale = self.scale_to;
                    self.scaling = false;
                }
            } else if self.cur_scale > self.scale_to {
                self.cur_scale -= step;
                if self.cur_scale <= self.scale_to {
                    self.cur_scale = self.scale_to;
                    self.scaling = false;
                }
            } else {
                self.scaling = false;
            }

            self.transform.scale = Vec3::new(self.cur_scale, self.cur_scale, 1.0);
        }
    }

    /// Handles a poke.
    ///
    /// The target blob shrinks one step (floor 0); any other blob grows one
    /// step (ceiling `max_size_step`). Either way the scale target is
    /// recomputed from the new step and a scale change begins.
    ///
    /// Returns `ShrunkToNothing` iff the step just reached zero.
    pub fn on_interact(&mut self, is_active: bool) -> InteractOutcome {
        if is_active {
            self.size_step = self.size_step.saturating_sub(1);
        } else if self.size_step < self.tuning.max_size_step {
            self.size_step += 1;
        }

        self.scale_to = self.size_step as f32 / self.tuning.max_size_step as f32;
        self.scaling = true;

        if self.size_step == 0 {
            InteractOutcome::ShrunkToNothing
        } else {
            InteractOutcome::Resized
        }
    }
}

impl Saveable for Blob {
    type Record = BlobRecord;
    type Context = BlobTuning;

    fn to_record(&self) -> BlobRecord {
        BlobRecord {
            id: self.id,
            transform: TransformRecord::freeze(&self.transform),
            size_step: self.size_step,
            scale_to: self.scale_to,
            cur_scale: self.cur_scale,
            scaling: self.scaling,
            lerp_time: self.lerp_time,
            start: self.start.to_array(),
            end: self.end.to_array(),
        }
    }

    fn from_record(record: &BlobRecord, tuning: &BlobTuning) -> Result<Self, SaveError> {
        if record.size_step > tuning.max_size_step {
            return Err(SaveError::MalformedRecord(format!(
                "blob {}: size step {} exceeds maximum {}",
                record.id, record.size_step, tuning.max_size_step
            )));
        }
        if !record.is_finite() {
            return Err(SaveError::MalformedRecord(format!(
                "blob {}: non-finite float field",
                record.id
            )));
        }

        Ok(Blob {
            id: record.id,
            transform: record.transform.thaw(),
            tuning: *tuning,
            size_step: record.size_step,
            scale_to: record.scale_to,
            cur_scale: record.cur_scale,
            scaling: record.scaling,
            lerp_time: record.lerp_time,
            start: Vec3::from_array(record.start),
            end: Vec3::from_array(record.end),
        })
    }
}
