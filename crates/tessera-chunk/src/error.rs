use thiserror::Error;

use crate::coord::ChunkCoord;
use crate::store::ChunkHandle;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Every slot is in use and within the load radius. Backpressure: retry
    /// once the load center moves or chunks are released.
    #[error("chunk store exhausted while allocating {0}")]
    Exhausted(ChunkCoord),
    #[error("chunk slot {} released twice (generation {})", .0.slot, .0.generation)]
    DoubleFree(ChunkHandle),
    #[error("chunk {0} is pinned by an in-flight user")]
    Pinned(ChunkCoord),
    #[error("chunk {0} is not resident")]
    NotResident(ChunkCoord),
}
