use tessera_chunk::{ChunkCoord, ChunkState, StoreError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("chunk {coord} has not reached {needed:?}")]
    NotReady { coord: ChunkCoord, needed: ChunkState },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("block cannot be stored in the world")]
    UnstorableBlock,
}
