// BlobWorld struct and blob lifecycle management
//
// This module contains the BlobWorld struct which owns all live blobs, the
// active-target reference, and the spawner countdowns. It provides methods
// for spawning blobs, ticking the simulation, handling pokes, and
// capturing/restoring the whole world as a snapshot document.

use crate::blob::{Blob, BlobId, BlobTuning, InteractOutcome};
use crate::random::WorldRng;
use crate::save::{SaveError, Saveable, TimerData, WorldDocument};
use glam::Vec3;

/// Rectangular spawn region centred on the origin.
///
/// `border` is the fraction of each axis kept clear at the edges, so blobs
/// never spawn right at the rim of the play area.
#[derive(Debug, Clone, Copy)]
pub struct SpawnArea {
    pub width: f32,
    pub height: f32,
    pub border: f32,
}

impl Default for SpawnArea {
    fn default() -> Self {
        SpawnArea {
            width: 16.0,
            height: 9.0,
            border: 0.1,
        }
    }
}

/// Receives visual feedback when a blob gains or loses target status.
///
/// Rendering lives outside this crate; the world only reports transitions.
pub trait HighlightSink {
    fn highlight(&mut self, id: BlobId, active: bool);
}

/// Discards every highlight event. Useful default for tests and tools.
pub struct NoHighlight;

impl HighlightSink for NoHighlight {
    fn highlight(&mut self, _id: BlobId, _active: bool) {}
}

/// Logs highlight transitions, for the headless driver.
pub struct LogHighlight;

impl HighlightSink for LogHighlight {
    fn highlight(&mut self, id: BlobId, active: bool) {
        if active {
            log::debug!("blob {} is now the target", id);
        } else {
            log::debug!("blob {} released", id);
        }
    }
}

/// Error types for world operations on blob references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    /// The caller referenced a blob that is not in the world. The
    /// operation was aborted with no state change.
    UnknownId(BlobId),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldError::UnknownId(id) => write!(f, "unknown blob id: {}", id),
        }
    }
}

impl std::error::Error for WorldError {}

/// BlobWorld owns the live blob collection and the active-target reference.
///
/// There is exactly one writer: the driver thread. `tick`, `snapshot` and
/// `restore` are never interleaved; the driver serializes them. A restore
/// invalidates every previously handed-out `BlobId` that is not present in
/// the restored document.
pub struct BlobWorld {
    blobs: Vec<Blob>,
    active: Option<BlobId>,
    timers: TimerData,
    tuning: BlobTuning,
    area: SpawnArea,
    rng: WorldRng,
    highlight: Box<dyn HighlightSink>,
}

impl BlobWorld {
    pub fn new(
        area: SpawnArea,
        tuning: BlobTuning,
        rng: WorldRng,
        highlight: Box<dyn HighlightSink>,
    ) -> Self {
        BlobWorld {
            blobs: Vec::new(),
            active: None,
            timers: TimerData::default(),
            tuning,
            area,
            rng,
            highlight,
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, id: BlobId) -> bool {
        self.blobs.iter().any(|b| b.id() == id)
    }

    pub fn blob(&self, id: BlobId) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = BlobId> + '_ {
        self.blobs.iter().map(Blob::id)
    }

    /// The current target blob, if any. Becomes `None` when the target is
    /// destroyed, until the driver's next scheduled switch.
    pub fn active(&self) -> Option<BlobId> {
        self.active
    }

    pub fn timers(&self) -> &TimerData {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut TimerData {
        &mut self.timers
    }

    /// Creates a new blob at a random position inside the bordered spawn
    /// area and returns its id. The active reference is not changed.
    pub fn spawn(&mut self) -> BlobId {
        let half_border = self.area.border / 2.0;
        let fx = self.rng.uniform(half_border, 1.0 - half_border);
        let fy = self.rng.uniform(half_border, 1.0 - half_border);
        let position = Vec3::new(
            (fx - 0.5) * self.area.width,
            (fy - 0.5) * self.area.height,
            0.0,
        );

        let id = self.fresh_id();
        self.blobs
            .push(Blob::spawn(id, position, self.tuning, &mut self.rng));
        id
    }

    /// Random ids collide with astronomically low probability, but an id
    /// must be unique within its world, so check anyway.
    fn fresh_id(&mut self) -> BlobId {
        loop {
            let id = BlobId::from_raw(self.rng.next_u64());
            if !self.contains(id) {
                return id;
            }
        }
    }

    /// Makes `id` the target and signals the highlight sink for both the
    /// previously- and newly-targeted blob.
    pub fn set_active(&mut self, id: BlobId) -> Result<(), WorldError> {
        if !self.contains(id) {
            return Err(WorldError::UnknownId(id));
        }

        if let Some(prev) = self.active {
            self.highlight.highlight(prev, false);
        }
        self.active = Some(id);
        self.highlight.highlight(id, true);
        Ok(())
    }

    /// Picks a uniformly random live blob, or `None` if the world is empty.
    pub fn random_blob(&mut self) -> Option<BlobId> {
        let idx = self.rng.pick(self.blobs.len())?;
        Some(self.blobs[idx].id())
    }

    /// Advances every blob by `dt` seconds.
    ///
    /// Ticking alone never destroys a blob; terminal outcomes only arise
    /// from pokes, which `interact` handles.
    pub fn tick(&mut self, dt: f32) {
        for blob in self.blobs.iter_mut() {
            blob.tick(dt);
        }
    }

    /// Applies a poke to the blob with the given id.
    ///
    /// The poked blob shrinks if it is the target and grows otherwise. A
    /// blob that shrinks to nothing is removed; if it was the target, the
    /// active reference stays unset until the next scheduled switch.
    pub fn interact(&mut self, id: BlobId) -> Result<InteractOutcome, WorldError> {
        let is_active = self.active == Some(id);
        let blob = self
            .blobs
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or(WorldError::UnknownId(id))?;

        let outcome = blob.on_interact(is_active);

        if outcome == InteractOutcome::ShrunkToNothing {
            self.blobs.retain(|b| b.id() != id);
            if is_active {
                self.active = None;
            }
            log::debug!("blob {} shrank to nothing and was removed", id);
        }

        Ok(outcome)
    }

    /// Captures the whole world as a snapshot document.
    ///
    /// Read-only O(n) pass: records appear in collection order, transforms
    /// are frozen into plain arrays, and the registry timers ride along.
    pub fn snapshot(&self) -> WorldDocument {
        WorldDocument {
            timers: self.timers,
            records: self.blobs.iter().map(Saveable::to_record).collect(),
            active_id: self.active,
        }
    }

    /// Replaces the entire world state with the document's contents.
    ///
    /// Every record is validated and rebuilt, and the active reference is
    /// resolved, BEFORE any live state is touched; on failure the current
    /// collection, active reference and timers are left exactly as they
    /// were. All previously handed-out ids not present in the document are
    /// invalid after a successful restore.
    pub fn restore(&mut self, document: &WorldDocument) -> Result<(), SaveError> {
        if document.records.is_empty() {
            return Err(SaveError::CorruptSnapshot(
                "snapshot holds no blobs".to_string(),
            ));
        }

        let mut rebuilt = Vec::with_capacity(document.records.len());
        for record in &document.records {
            rebuilt.push(Blob::from_record(record, &self.tuning)?);
        }

        for (i, blob) in rebuilt.iter().enumerate() {
            if rebuilt[..i].iter().any(|other| other.id() == blob.id()) {
                return Err(SaveError::CorruptSnapshot(format!(
                    "duplicate blob id {}",
                    blob.id()
                )));
            }
        }

        if let Some(active_id) = document.active_id {
            if !rebuilt.iter().any(|b| b.id() == active_id) {
                return Err(SaveError::CorruptSnapshot(format!(
                    "active blob {} has no matching record",
                    active_id
                )));
            }
        }

        // Validation passed: tear down the old collection wholesale.
        self.blobs = rebuilt;
        self.timers = document.timers;
        self.active = document.active_id;

        if let Some(id) = self.active {
            self.highlight.highlight(id, true);
        }

        log::info!(
            "world restored: {} blobs, target {:?}",
            self.blobs.len(),
            self.active.map(|id| id.to_string())
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{codec, SaveFile, SaveMetadata, SaveType, CURRENT_SAVE_VERSION};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use std::time::SystemTime;

    /// Sink that records every highlight event for assertions.
    struct RecordingSink(Rc<RefCell<Vec<(BlobId, bool)>>>);

    impl HighlightSink for RecordingSink {
        fn highlight(&mut self, id: BlobId, active: bool) {
            self.0.borrow_mut().push((id, active));
        }
    }

    fn test_world() -> BlobWorld {
        BlobWorld::new(
            SpawnArea::default(),
            BlobTuning::default(),
            WorldRng::seeded(99),
            Box::new(NoHighlight),
        )
    }

    fn recording_world() -> (BlobWorld, Rc<RefCell<Vec<(BlobId, bool)>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let world = BlobWorld::new(
            SpawnArea::default(),
            BlobTuning::default(),
            WorldRng::seeded(99),
            Box::new(RecordingSink(Rc::clone(&events))),
        );
        (world, events)
    }

    /// Shrinks the given blob to nothing via three active pokes.
    fn destroy(world: &mut BlobWorld, id: BlobId) {
        world.set_active(id).unwrap();
        while world.contains(id) {
            world.interact(id).unwrap();
        }
    }

    fn wrap(document: WorldDocument) -> SaveFile {
        SaveFile {
            version: CURRENT_SAVE_VERSION,
            timestamp: SystemTime::now(),
            metadata: SaveMetadata {
                game_version: env!("CARGO_PKG_VERSION").to_string(),
                playtime_seconds: 0,
                save_type: SaveType::Manual,
                save_slot: 1,
            },
            world: document,
        }
    }

    #[test]
    fn test_spawn_leaves_active_untouched() {
        let mut world = test_world();
        let first = world.spawn();
        world.set_active(first).unwrap();

        let second = world.spawn();
        assert_ne!(first, second);
        assert_eq!(world.len(), 2);
        assert_eq!(world.active(), Some(first));
    }

    #[test]
    fn test_set_active_unknown_id_fails() {
        let mut world = test_world();
        world.spawn();

        let bogus = BlobId::from_raw(0xdead_beef);
        assert_eq!(world.set_active(bogus), Err(WorldError::UnknownId(bogus)));
        assert_eq!(world.active(), None);
    }

    #[test]
    fn test_set_active_signals_both_blobs() {
        let (mut world, events) = recording_world();
        let a = world.spawn();
        let b = world.spawn();

        world.set_active(a).unwrap();
        world.set_active(b).unwrap();

        assert_eq!(
            events.borrow().as_slice(),
            &[(a, true), (a, false), (b, true)]
        );
    }

    #[test]
    fn test_interact_unknown_id_fails() {
        let mut world = test_world();
        world.spawn();

        let bogus = BlobId::from_raw(1);
        assert_eq!(world.interact(bogus), Err(WorldError::UnknownId(bogus)));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_terminal_poke_removes_blob_and_unsets_active() {
        let mut world = test_world();
        let id = world.spawn();
        world.set_active(id).unwrap();

        assert_eq!(world.interact(id).unwrap(), InteractOutcome::Resized);
        assert_eq!(world.interact(id).unwrap(), InteractOutcome::Resized);
        assert_eq!(
            world.interact(id).unwrap(),
            InteractOutcome::ShrunkToNothing
        );

        assert!(!world.contains(id));
        assert_eq!(world.active(), None);
    }

    #[test]
    fn test_grow_poke_never_removes() {
        let mut world = test_world();
        let target = world.spawn();
        let other = world.spawn();
        world.set_active(target).unwrap();

        for _ in 0..5 {
            assert_eq!(world.interact(other).unwrap(), InteractOutcome::Resized);
        }
        assert_eq!(world.len(), 2);
        assert_eq!(world.blob(other).unwrap().size_step(), 3);
    }

    #[test]
    fn test_identity_stable_across_removal_and_reload() {
        let mut world = test_world();
        let ids: Vec<BlobId> = (0..5).map(|_| world.spawn()).collect();

        destroy(&mut world, ids[2]);
        let survivors: BTreeSet<BlobId> = world.ids().collect();
        assert_eq!(survivors.len(), 4);

        let document = world.snapshot();

        let mut reloaded = test_world();
        reloaded.restore(&document).unwrap();

        let restored: BTreeSet<BlobId> = reloaded.ids().collect();
        assert_eq!(restored, survivors);
        assert!(!restored.contains(&ids[2]));
    }

    #[test]
    fn test_snapshot_encode_decode_restore_round_trip() {
        let mut world = test_world();
        for _ in 0..4 {
            world.spawn();
        }
        let target = world.random_blob().unwrap();
        world.set_active(target).unwrap();
        world.tick(0.35);
        world.timers_mut().spawn_countdown = 0.4;
        world.timers_mut().switch_countdown = 1.2;

        let document = world.snapshot();
        let bytes = codec::encode(&wrap(document.clone())).unwrap();
        let decoded = codec::decode(&bytes).unwrap();
        assert_eq!(decoded.world, document);

        let mut reloaded = test_world();
        reloaded.restore(&decoded.world).unwrap();

        assert_eq!(reloaded.snapshot(), document);
        assert_eq!(reloaded.active(), Some(target));
        assert_eq!(reloaded.timers().spawn_countdown, 0.4);
    }

    #[test]
    fn test_restore_rejects_unresolvable_active_id() {
        let mut world = test_world();
        let id = world.spawn();
        world.set_active(id).unwrap();
        world.spawn();

        let mut document = world.snapshot();
        document.active_id = Some(BlobId::from_raw(0xbad));

        let before = world.snapshot();
        let err = world.restore(&document).unwrap_err();
        assert!(matches!(err, SaveError::CorruptSnapshot(_)));

        // Prior state untouched.
        assert_eq!(world.snapshot(), before);
        assert_eq!(world.active(), Some(id));
    }

    #[test]
    fn test_restore_rejects_empty_document() {
        let mut world = test_world();
        let id = world.spawn();

        let document = WorldDocument {
            timers: TimerData::default(),
            records: Vec::new(),
            active_id: None,
        };

        let err = world.restore(&document).unwrap_err();
        assert!(matches!(err, SaveError::CorruptSnapshot(_)));
        assert!(world.contains(id));
    }

    #[test]
    fn test_restore_rejects_malformed_record_before_teardown() {
        let mut world = test_world();
        let id = world.spawn();

        let mut document = world.snapshot();
        document.records[0].size_step = 99;

        let err = world.restore(&document).unwrap_err();
        assert!(matches!(err, SaveError::MalformedRecord(_)));
        assert!(world.contains(id));
    }

    #[test]
    fn test_restore_overwrites_timers() {
        let mut world = test_world();
        world.spawn();
        let mut document = world.snapshot();
        document.timers = TimerData {
            spawn_countdown: 2.5,
            switch_countdown: 0.75,
        };

        world.timers_mut().spawn_countdown = 9.0;
        world.restore(&document).unwrap();

        assert_eq!(world.timers().spawn_countdown, 2.5);
        assert_eq!(world.timers().switch_countdown, 0.75);
    }

    #[test]
    fn test_restore_signals_restored_target() {
        let (mut world, events) = recording_world();
        let id = world.spawn();
        world.set_active(id).unwrap();
        let document = world.snapshot();

        events.borrow_mut().clear();
        world.restore(&document).unwrap();

        assert_eq!(events.borrow().as_slice(), &[(id, true)]);
    }

    /// Save before the final poke, replay it after a reload, and end in the
    /// same terminal state as the uninterrupted run.
    #[test]
    fn test_reload_replays_to_same_terminal_outcome() {
        let mut world = test_world();
        let id = world.spawn();
        world.set_active(id).unwrap();

        assert_eq!(world.interact(id).unwrap(), InteractOutcome::Resized);
        assert_eq!(world.interact(id).unwrap(), InteractOutcome::Resized);
        let checkpoint = world.snapshot();

        // Uninterrupted run reaches the terminal outcome.
        assert_eq!(
            world.interact(id).unwrap(),
            InteractOutcome::ShrunkToNothing
        );
        assert!(world.is_empty());

        // Reload the checkpoint and replay the final poke.
        let mut reloaded = test_world();
        reloaded.restore(&checkpoint).unwrap();
        assert_eq!(reloaded.blob(id).unwrap().size_step(), 1);
        assert_eq!(reloaded.active(), Some(id));

        assert_eq!(
            reloaded.interact(id).unwrap(),
            InteractOutcome::ShrunkToNothing
        );
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.active(), None);
    }
}
