use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU8, AtomicU32, Ordering};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tessera_blocks::Block;
use tessera_mesh_cpu::MeshCursor;

use crate::state::{ChunkState, Stage};
use crate::{CHUNK_VOLUME, voxel_index};

/// Outcome of [`Chunk::apply_edit`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EditApplied {
    /// Written in place; carries the previous block.
    Immediate(Block),
    /// Queued until decoration completes.
    Deferred,
}

/// One preallocated chunk slot.
///
/// Voxel layers are arrays of atomics written by exactly one stage body at a
/// time and published by the release store of the completed state. Readers
/// acquire the state first and only read layers that state guarantees.
pub struct Chunk {
    slot: u32,
    generation: AtomicU32,
    state: AtomicU8,
    density: Box<[AtomicI16]>,
    blocks: Box<[AtomicU8]>,
    stage_lock: Mutex<()>,
    stage_cv: Condvar,
    pending: Mutex<Vec<(u16, Block)>>,
    mesh: Mutex<MeshCursor>,
    mesh_dirty: AtomicBool,
    renderable: AtomicBool,
}

impl Chunk {
    pub(crate) fn new(slot: u32) -> Self {
        Self {
            slot,
            generation: AtomicU32::new(0),
            state: AtomicU8::new(ChunkState::Free as u8),
            density: (0..CHUNK_VOLUME).map(|_| AtomicI16::new(0)).collect(),
            blocks: (0..CHUNK_VOLUME).map(|_| AtomicU8::new(0)).collect(),
            stage_lock: Mutex::new(()),
            stage_cv: Condvar::new(),
            pending: Mutex::new(Vec::new()),
            mesh: Mutex::new(MeshCursor::new()),
            mesh_dirty: AtomicBool::new(false),
            renderable: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Panics when a layer is read before the stage that writes it finished.
    #[inline]
    #[track_caller]
    pub fn require(&self, at_least: ChunkState) {
        let state = self.state();
        assert!(
            state >= at_least,
            "chunk slot {} read at {:?}, needs {:?}",
            self.slot,
            state,
            at_least
        );
    }

    // --- lifecycle (store only) ---

    /// Prepares a `Free` slot for a new coordinate. Called under the store
    /// index lock on an unpinned slot.
    pub(crate) fn assign(&self) {
        debug_assert_eq!(self.state(), ChunkState::Free);
        for d in self.density.iter() {
            d.store(0, Ordering::Relaxed);
        }
        for b in self.blocks.iter() {
            b.store(0, Ordering::Relaxed);
        }
        self.pending.lock().clear();
        self.mesh.lock().reset();
        self.mesh_dirty.store(false, Ordering::Relaxed);
        self.renderable.store(false, Ordering::Relaxed);
        self.state
            .store(ChunkState::Allocated as u8, Ordering::Release);
    }

    /// Ends the slot's current generation. Called under the store index lock.
    pub(crate) fn retire(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.state.store(ChunkState::Free as u8, Ordering::Release);
        self.renderable.store(false, Ordering::Release);
    }

    // --- stage transitions ---

    /// Claims `stage` by moving the completed marker before it to the
    /// running marker. Only one caller wins.
    pub fn try_begin(&self, stage: Stage) -> bool {
        self.state
            .compare_exchange(
                stage.from_state() as u8,
                stage.running() as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Publishes the completed marker for a stage this thread is running.
    pub fn complete(&self, stage: Stage) {
        debug_assert_eq!(self.state(), stage.running());
        if stage == Stage::Decorate {
            // Pending edits land atomically with the state change so
            // `apply_edit` never sees Decorated without them.
            let mut pending = self.pending.lock();
            for (i, block) in pending.drain(..) {
                self.blocks[i as usize].store(block.id(), Ordering::Relaxed);
            }
            self.state.store(stage.done() as u8, Ordering::Release);
        } else {
            self.state.store(stage.done() as u8, Ordering::Release);
        }
        let _guard = self.stage_lock.lock();
        self.stage_cv.notify_all();
    }

    /// Blocks while a stage body runs elsewhere and returns the settled state.
    pub fn wait_settled(&self) -> ChunkState {
        let mut guard = self.stage_lock.lock();
        loop {
            let state = self.state();
            if !state.in_progress() {
                return state;
            }
            self.stage_cv.wait(&mut guard);
        }
    }

    // --- voxel layers ---

    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> Block {
        self.block_at(voxel_index(x, y, z))
    }

    #[inline]
    pub fn block_at(&self, i: usize) -> Block {
        Block::from_id(self.blocks[i].load(Ordering::Relaxed)).unwrap_or(Block::Null)
    }

    /// Stage-body write. `Unloaded` is never stored.
    #[inline]
    pub fn set_block_at(&self, i: usize, block: Block) {
        debug_assert_ne!(block, Block::Unloaded);
        self.blocks[i].store(block.id(), Ordering::Relaxed);
    }

    #[inline]
    pub fn density(&self, x: usize, y: usize, z: usize) -> i16 {
        self.density[voxel_index(x, y, z)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_density_at(&self, i: usize, d: i16) {
        self.density[i].store(d, Ordering::Relaxed);
    }

    /// Applies an external edit in place once decorated, otherwise queues it
    /// to be applied when decoration completes.
    pub fn apply_edit(&self, x: usize, y: usize, z: usize, block: Block) -> EditApplied {
        debug_assert_ne!(block, Block::Unloaded);
        let i = voxel_index(x, y, z);
        let mut pending = self.pending.lock();
        if self.state() == ChunkState::Decorated {
            let prev = self.blocks[i].swap(block.id(), Ordering::AcqRel);
            EditApplied::Immediate(Block::from_id(prev).unwrap_or(Block::Null))
        } else {
            pending.push((i as u16, block));
            EditApplied::Deferred
        }
    }

    pub fn pending_edits(&self) -> usize {
        self.pending.lock().len()
    }

    // --- meshing ---

    /// The persisted mesh cursor, if no other mesh attempt holds it.
    pub fn try_lock_mesh(&self) -> Option<MutexGuard<'_, MeshCursor>> {
        self.mesh.try_lock()
    }

    pub fn mark_mesh_dirty(&self) {
        self.mesh_dirty.store(true, Ordering::Release);
    }

    pub fn take_mesh_dirty(&self) -> bool {
        self.mesh_dirty.swap(false, Ordering::AcqRel)
    }

    pub fn is_renderable(&self) -> bool {
        self.renderable.load(Ordering::Acquire)
    }

    pub fn set_renderable(&self, on: bool) {
        self.renderable.store(on, Ordering::Release);
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("slot", &self.slot)
            .field("generation", &self.generation())
            .field("state", &self.state())
            .finish()
    }
}
