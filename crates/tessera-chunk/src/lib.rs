//! Chunk records, lifecycle states and the capacity-bounded chunk store.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod coord;
pub mod error;
pub mod hash;
pub mod neighborhood;
pub mod state;
pub mod store;

pub use chunk::{Chunk, EditApplied};
pub use coord::ChunkCoord;
pub use error::StoreError;
pub use neighborhood::ChunkNeighborhood;
pub use state::{ChunkState, Stage};
pub use store::{ChunkHandle, ChunkRef, ChunkStore, LoadArea, StoreStats};

/// Edge length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;
/// `log2(CHUNK_SIZE)`, for shifting world coordinates into chunk coordinates.
pub const CHUNK_BITS: u32 = 4;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Linear voxel index inside a chunk.
#[inline]
pub const fn voxel_index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
}
