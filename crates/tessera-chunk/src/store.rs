//! Capacity-bounded chunk store.
//!
//! All slots are allocated up front. A single mutex guards the spatial
//! index: bucket heads and chains, slot coordinates, the free list, the
//! least-recently-visited order and the load area. Links are slot indices,
//! and a per-slot generation makes stale handles detectable after reuse.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::chunk::Chunk;
use crate::coord::ChunkCoord;
use crate::error::StoreError;
use crate::hash::chunk_hash;

const NIL: u32 = u32::MAX;

/// Stable identity of one occupancy of a slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChunkHandle {
    pub slot: u32,
    pub generation: u32,
}

/// Region that must stay resident: chunks within `radius` (Chebyshev, in
/// chunks) of `center` are never evicted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LoadArea {
    pub center: ChunkCoord,
    pub radius: i32,
}

impl LoadArea {
    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        coord.chebyshev(self.center) <= self.radius
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StoreStats {
    pub capacity: usize,
    pub resident: usize,
    pub retired_pending: usize,
}

/// A pinned reference to a resident chunk. While any `ChunkRef` to a slot is
/// alive the slot cannot be evicted.
#[derive(Clone)]
pub struct ChunkRef {
    chunk: Arc<Chunk>,
    handle: ChunkHandle,
    coord: ChunkCoord,
}

impl ChunkRef {
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn handle(&self) -> ChunkHandle {
        self.handle
    }
}

impl Deref for ChunkRef {
    type Target = Chunk;
    #[inline]
    fn deref(&self) -> &Chunk {
        &self.chunk
    }
}

impl std::fmt::Debug for ChunkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkRef")
            .field("coord", &self.coord)
            .field("handle", &self.handle)
            .field("state", &self.chunk.state())
            .finish()
    }
}

struct StoreIndex {
    buckets: Box<[u32]>,
    chain: Box<[u32]>,
    coords: Box<[Option<ChunkCoord>]>,
    free: Vec<u32>,
    lru_prev: Box<[u32]>,
    lru_next: Box<[u32]>,
    // Most recently visited.
    lru_head: u32,
    lru_tail: u32,
    area: LoadArea,
    // At most one entry per slot; the oldest go first when nobody drains.
    retired: VecDeque<ChunkHandle>,
    retired_overflow: bool,
    resident: usize,
}

impl StoreIndex {
    #[inline]
    fn bucket(&self, coord: ChunkCoord) -> usize {
        chunk_hash(coord.cx, coord.cy, coord.cz) as usize & (self.buckets.len() - 1)
    }

    fn lookup(&self, coord: ChunkCoord) -> Option<u32> {
        let mut s = self.buckets[self.bucket(coord)];
        while s != NIL {
            if self.coords[s as usize] == Some(coord) {
                return Some(s);
            }
            s = self.chain[s as usize];
        }
        None
    }

    fn link(&mut self, slot: u32, coord: ChunkCoord) {
        let b = self.bucket(coord);
        self.chain[slot as usize] = self.buckets[b];
        self.buckets[b] = slot;
        self.coords[slot as usize] = Some(coord);
        self.lru_push_front(slot);
        self.resident += 1;
    }

    fn unlink(&mut self, slot: u32) {
        let Some(coord) = self.coords[slot as usize].take() else {
            return;
        };
        let b = self.bucket(coord);
        if self.buckets[b] == slot {
            self.buckets[b] = self.chain[slot as usize];
        } else {
            let mut s = self.buckets[b];
            while s != NIL {
                let next = self.chain[s as usize];
                if next == slot {
                    self.chain[s as usize] = self.chain[slot as usize];
                    break;
                }
                s = next;
            }
        }
        self.chain[slot as usize] = NIL;
        self.lru_remove(slot);
        self.resident -= 1;
    }

    fn lru_push_front(&mut self, slot: u32) {
        let s = slot as usize;
        self.lru_prev[s] = NIL;
        self.lru_next[s] = self.lru_head;
        if self.lru_head != NIL {
            self.lru_prev[self.lru_head as usize] = slot;
        }
        self.lru_head = slot;
        if self.lru_tail == NIL {
            self.lru_tail = slot;
        }
    }

    fn lru_remove(&mut self, slot: u32) {
        let s = slot as usize;
        let (prev, next) = (self.lru_prev[s], self.lru_next[s]);
        if prev != NIL {
            self.lru_next[prev as usize] = next;
        } else {
            self.lru_head = next;
        }
        if next != NIL {
            self.lru_prev[next as usize] = prev;
        } else {
            self.lru_tail = prev;
        }
        self.lru_prev[s] = NIL;
        self.lru_next[s] = NIL;
    }

    fn touch(&mut self, slot: u32) {
        if self.lru_head != slot {
            self.lru_remove(slot);
            self.lru_push_front(slot);
        }
    }
}

pub struct ChunkStore {
    slots: Box<[Arc<Chunk>]>,
    index: Mutex<StoreIndex>,
}

impl ChunkStore {
    /// `buckets` is rounded up to a power of two.
    pub fn new(capacity: usize, buckets: usize) -> Self {
        let capacity = capacity.clamp(1, NIL as usize - 1);
        let buckets = buckets.max(1).next_power_of_two();
        let slots: Box<[Arc<Chunk>]> = (0..capacity as u32)
            .map(|i| Arc::new(Chunk::new(i)))
            .collect();
        let index = StoreIndex {
            buckets: vec![NIL; buckets].into_boxed_slice(),
            chain: vec![NIL; capacity].into_boxed_slice(),
            coords: vec![None; capacity].into_boxed_slice(),
            // Popped from the back, so slot 0 is handed out first.
            free: (0..capacity as u32).rev().collect(),
            lru_prev: vec![NIL; capacity].into_boxed_slice(),
            lru_next: vec![NIL; capacity].into_boxed_slice(),
            lru_head: NIL,
            lru_tail: NIL,
            area: LoadArea {
                center: ChunkCoord::default(),
                radius: 0,
            },
            retired: VecDeque::with_capacity(capacity),
            retired_overflow: false,
            resident: 0,
        };
        log::debug!("chunk store: {capacity} slots, {buckets} buckets");
        Self {
            slots,
            index: Mutex::new(index),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn pin(&self, slot: u32, coord: ChunkCoord) -> ChunkRef {
        let chunk = Arc::clone(&self.slots[slot as usize]);
        let handle = ChunkHandle {
            slot,
            generation: chunk.generation(),
        };
        ChunkRef {
            chunk,
            handle,
            coord,
        }
    }

    #[inline]
    fn pinned(&self, slot: u32) -> bool {
        Arc::strong_count(&self.slots[slot as usize]) > 1
    }

    /// Looks up a resident chunk and marks it visited.
    pub fn find(&self, coord: ChunkCoord) -> Option<ChunkRef> {
        let mut idx = self.index.lock();
        let slot = idx.lookup(coord)?;
        idx.touch(slot);
        Some(self.pin(slot, coord))
    }

    /// Returns the resident chunk at `coord` or allocates one.
    ///
    /// Allocation takes a free slot if there is one, else evicts the least
    /// recently visited unpinned chunk outside the load area.
    pub fn find_or_create(&self, coord: ChunkCoord) -> Result<ChunkRef, StoreError> {
        let mut idx = self.index.lock();
        if let Some(slot) = idx.lookup(coord) {
            idx.touch(slot);
            return Ok(self.pin(slot, coord));
        }
        let slot = match idx.free.pop() {
            Some(slot) => slot,
            None => self.evict_lru(&mut idx).ok_or(StoreError::Exhausted(coord))?,
        };
        self.slots[slot as usize].assign();
        idx.link(slot, coord);
        Ok(self.pin(slot, coord))
    }

    fn evict_lru(&self, idx: &mut StoreIndex) -> Option<u32> {
        let mut s = idx.lru_tail;
        while s != NIL {
            let prev = idx.lru_prev[s as usize];
            let outside = idx.coords[s as usize].is_some_and(|c| !idx.area.contains(c));
            if outside && !self.pinned(s) {
                if let Some(coord) = idx.coords[s as usize] {
                    log::trace!("evicting chunk {coord} from slot {s}");
                }
                self.retire_locked(idx, s);
                return Some(s);
            }
            s = prev;
        }
        None
    }

    fn retire_locked(&self, idx: &mut StoreIndex, slot: u32) {
        let chunk = &self.slots[slot as usize];
        if idx.retired.len() >= self.slots.len() {
            idx.retired.pop_front();
            idx.retired_overflow = true;
        }
        idx.retired.push_back(ChunkHandle {
            slot,
            generation: chunk.generation(),
        });
        idx.unlink(slot);
        chunk.retire();
    }

    /// Evicts an unpinned resident chunk.
    pub fn unload(&self, coord: ChunkCoord) -> Result<(), StoreError> {
        let mut idx = self.index.lock();
        let slot = idx.lookup(coord).ok_or(StoreError::NotResident(coord))?;
        if self.pinned(slot) {
            return Err(StoreError::Pinned(coord));
        }
        self.retire_locked(&mut idx, slot);
        idx.free.push(slot);
        Ok(())
    }

    /// Releases the occupancy named by `handle`. A stale handle or a slot
    /// that is already free is a double free.
    pub fn release(&self, handle: ChunkHandle) -> Result<(), StoreError> {
        let mut idx = self.index.lock();
        let slot = handle.slot;
        let live = self
            .slots
            .get(slot as usize)
            .is_some_and(|c| c.generation() == handle.generation);
        let Some(coord) = idx.coords.get(slot as usize).copied().flatten().filter(|_| live) else {
            return Err(StoreError::DoubleFree(handle));
        };
        if self.pinned(slot) {
            return Err(StoreError::Pinned(coord));
        }
        self.retire_locked(&mut idx, slot);
        idx.free.push(slot);
        Ok(())
    }

    pub fn set_load_area(&self, area: LoadArea) {
        self.index.lock().area = area;
    }

    pub fn load_area(&self) -> LoadArea {
        self.index.lock().area
    }

    pub fn in_load_area(&self, coord: ChunkCoord) -> bool {
        self.index.lock().area.contains(coord)
    }

    /// Handles whose occupancy ended since the last call, oldest first.
    /// Holds at most `capacity` handles; older ones are discarded.
    pub fn drain_retired(&self) -> Vec<ChunkHandle> {
        self.index.lock().retired.drain(..).collect()
    }

    /// Whether retired handles were discarded since the last call. Holders
    /// of per-slot resources must then revalidate them against
    /// [`ChunkStore::generation`].
    pub fn take_retired_overflow(&self) -> bool {
        std::mem::take(&mut self.index.lock().retired_overflow)
    }

    /// Current generation of a slot.
    pub fn generation(&self, slot: u32) -> Option<u32> {
        self.slots.get(slot as usize).map(|c| c.generation())
    }

    /// Coordinates of all resident chunks in most-recently-visited order.
    pub fn resident(&self) -> Vec<ChunkCoord> {
        let idx = self.index.lock();
        let mut out = Vec::with_capacity(idx.resident);
        let mut s = idx.lru_head;
        while s != NIL {
            if let Some(c) = idx.coords[s as usize] {
                out.push(c);
            }
            s = idx.lru_next[s as usize];
        }
        out
    }

    pub fn stats(&self) -> StoreStats {
        let idx = self.index.lock();
        StoreStats {
            capacity: self.slots.len(),
            resident: idx.resident,
            retired_pending: idx.retired.len(),
        }
    }
}
