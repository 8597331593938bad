//! Records passed from workers to the thread that owns the GPU.

use tessera_chunk::{ChunkCoord, ChunkHandle};
use tessera_mesh_cpu::MeshBuild;

/// Finished geometry for one chunk generation.
#[derive(Debug)]
pub struct MeshUpload {
    pub handle: ChunkHandle,
    pub coord: ChunkCoord,
    pub opaque: MeshBuild,
    pub translucent: MeshBuild,
}

#[derive(Debug)]
pub enum HandoffItem {
    Mesh(MeshUpload),
    /// A load or mesh request that was abandoned, usually on store
    /// backpressure. The requester may ask again later.
    Dropped(ChunkCoord),
}

impl HandoffItem {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            HandoffItem::Mesh(up) => up.coord,
            HandoffItem::Dropped(coord) => *coord,
        }
    }
}
