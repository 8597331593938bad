use tessera_blocks::{Block, Face};

use crate::cursor::{Unavailable, VoxelSource};

/// Owned snapshot of a chunk plus a one-voxel shell of its face neighbors.
///
/// Each of the six shell faces can be marked unavailable, which makes the
/// mesher suspend when it reaches that side.
#[derive(Clone, Debug)]
pub struct PaddedVoxels {
    n: usize,
    blocks: Vec<Block>,
    available: [bool; 6],
}

impl PaddedVoxels {
    /// An all-air chunk of edge `n` with every neighbor available.
    pub fn new(n: usize) -> Self {
        let p = n + 2;
        Self {
            n,
            blocks: vec![Block::Null; p * p * p],
            available: [true; 6],
        }
    }

    #[inline]
    fn idx(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let p = self.n as i32 + 2;
        let (px, py, pz) = (x + 1, y + 1, z + 1);
        if px < 0 || py < 0 || pz < 0 || px >= p || py >= p || pz >= p {
            return None;
        }
        Some(((py * p + pz) * p + px) as usize)
    }

    /// Sets a voxel; coordinates range over `-1..=n` on each axis.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if let Some(i) = self.idx(x, y, z) {
            self.blocks[i] = block;
        }
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Block {
        self.idx(x, y, z)
            .map(|i| self.blocks[i])
            .unwrap_or(Block::Unloaded)
    }

    pub fn set_available(&mut self, face: Face, available: bool) {
        self.available[face.index()] = available;
    }

    pub fn set_all_available(&mut self, available: bool) {
        self.available = [available; 6];
    }

    /// Which shell face a coordinate just outside the chunk belongs to.
    fn shell_face(&self, x: i32, y: i32, z: i32) -> Option<Face> {
        let n = self.n as i32;
        if x < 0 {
            Some(Face::NegX)
        } else if x >= n {
            Some(Face::PosX)
        } else if y < 0 {
            Some(Face::NegY)
        } else if y >= n {
            Some(Face::PosY)
        } else if z < 0 {
            Some(Face::NegZ)
        } else if z >= n {
            Some(Face::PosZ)
        } else {
            None
        }
    }
}

impl VoxelSource for PaddedVoxels {
    fn size(&self) -> usize {
        self.n
    }

    fn local(&self, x: usize, y: usize, z: usize) -> Block {
        self.get(x as i32, y as i32, z as i32)
    }

    fn neighbor(&self, x: i32, y: i32, z: i32) -> Result<Block, Unavailable> {
        match self.shell_face(x, y, z) {
            Some(face) if !self.available[face.index()] => Err(Unavailable),
            _ => Ok(self.get(x, y, z)),
        }
    }
}
