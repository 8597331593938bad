use std::cell::OnceCell;

use tessera_blocks::{Block, Face};
use tessera_mesh_cpu::{Unavailable, VoxelSource};

use crate::CHUNK_SIZE;
use crate::coord::ChunkCoord;
use crate::state::ChunkState;
use crate::store::{ChunkRef, ChunkStore};

/// Store-backed [`VoxelSource`] for meshing one decorated chunk.
///
/// Face neighbors are looked up lazily and never waited on: a neighbor that
/// is absent or not yet decorated reads as unavailable.
pub struct ChunkNeighborhood<'a> {
    store: &'a ChunkStore,
    center: &'a ChunkRef,
    neighbors: [OnceCell<Option<ChunkRef>>; 6],
}

impl<'a> ChunkNeighborhood<'a> {
    pub fn new(store: &'a ChunkStore, center: &'a ChunkRef) -> Self {
        center.require(ChunkState::Decorated);
        Self {
            store,
            center,
            neighbors: Default::default(),
        }
    }

    /// Coordinate of the neighbor across `face`.
    pub fn neighbor_coord(&self, face: Face) -> ChunkCoord {
        self.center.coord().step(face)
    }

    fn neighbor_chunk(&self, face: Face) -> Option<&ChunkRef> {
        self.neighbors[face.index()]
            .get_or_init(|| {
                self.store
                    .find(self.neighbor_coord(face))
                    .filter(|c| c.state() >= ChunkState::Decorated)
            })
            .as_ref()
    }
}

impl VoxelSource for ChunkNeighborhood<'_> {
    fn size(&self) -> usize {
        CHUNK_SIZE
    }

    fn local(&self, x: usize, y: usize, z: usize) -> Block {
        self.center.block(x, y, z)
    }

    fn neighbor(&self, x: i32, y: i32, z: i32) -> Result<Block, Unavailable> {
        let n = CHUNK_SIZE as i32;
        let face = if x < 0 {
            Face::NegX
        } else if x >= n {
            Face::PosX
        } else if y < 0 {
            Face::NegY
        } else if y >= n {
            Face::PosY
        } else if z < 0 {
            Face::NegZ
        } else if z >= n {
            Face::PosZ
        } else {
            return Ok(self.center.block(x as usize, y as usize, z as usize));
        };
        let chunk = self.neighbor_chunk(face).ok_or(Unavailable)?;
        let (lx, ly, lz) = ((x + n) % n, (y + n) % n, (z + n) % n);
        Ok(chunk.block(lx as usize, ly as usize, lz as usize))
    }
}
