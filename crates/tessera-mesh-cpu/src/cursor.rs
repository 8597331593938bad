//! Resumable face-culling mesher.
//!
//! A pass walks every voxel of a chunk (y, z, x order, x fastest) and tests
//! each of its six faces against the neighbor voxel. Neighbors outside the
//! chunk come from the [`VoxelSource`] and may be unavailable; the pass then
//! stops without consuming the test and picks up at the same voxel and face
//! on the next call.

use std::mem;

use tessera_blocks::{Block, Face, TextureAtlas};
use tessera_geom::Vec3;

use crate::mesh_build::{MeshBuild, WATER_OFFSET};

/// A neighbor voxel lives in a chunk that cannot be read yet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Unavailable;

/// Voxel access for one chunk and the shell of voxels around it.
pub trait VoxelSource {
    /// Edge length of the chunk being meshed.
    fn size(&self) -> usize;

    /// A voxel inside the chunk; always available.
    fn local(&self, x: usize, y: usize, z: usize) -> Block;

    /// A voxel at chunk-local coordinates that may lie one step outside the
    /// chunk on a single axis.
    fn neighbor(&self, x: i32, y: i32, z: i32) -> Result<Block, Unavailable>;
}

/// Whether `face` of `block` is visible next to `neighbor`.
#[inline]
pub fn face_visible(block: Block, neighbor: Block, face: Face) -> bool {
    if block.is_water() {
        face == Face::PosY || (neighbor.is_transparent() && !neighbor.is_water())
    } else {
        neighbor.is_transparent()
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    pub opaque: MeshBuild,
    pub translucent: MeshBuild,
}

impl ChunkMesh {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.translucent.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.opaque.quad_count() + self.translucent.quad_count()
    }
}

#[derive(Debug)]
pub enum MeshStep {
    /// One face test (or one whole voxel) was consumed.
    Advanced,
    /// The neighbor across `Face` is unavailable; nothing was consumed.
    Blocked(Face),
    /// The pass is complete. The cursor is back at the start.
    Finished(ChunkMesh),
}

/// Saved position of an in-progress mesh pass plus the geometry built so far.
#[derive(Default, Debug)]
pub struct MeshCursor {
    x: u16,
    y: u16,
    z: u16,
    face: u8,
    out: ChunkMesh,
}

impl MeshCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops partial output and rewinds to the first voxel.
    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.z = 0;
        self.face = 0;
        self.out.opaque.clear_keep_capacity();
        self.out.translucent.clear_keep_capacity();
    }

    /// True when no voxel of the current pass has been consumed yet.
    pub fn at_start(&self) -> bool {
        self.x == 0 && self.y == 0 && self.z == 0 && self.face == 0
    }

    /// Current voxel and the next face to test.
    pub fn position(&self) -> (usize, usize, usize, Face) {
        let face = Face::from_index(self.face as usize).unwrap_or(Face::PosY);
        (self.x as usize, self.y as usize, self.z as usize, face)
    }

    pub fn step<S: VoxelSource + ?Sized>(&mut self, src: &S, atlas: &TextureAtlas) -> MeshStep {
        let n = src.size();
        if self.y as usize >= n {
            return MeshStep::Finished(self.finish());
        }
        let (x, y, z) = (self.x as usize, self.y as usize, self.z as usize);
        let block = src.local(x, y, z);
        let origin = Vec3::new(x as f32, y as f32, z as f32);

        if block.is_air() {
            self.next_voxel(n);
            return MeshStep::Advanced;
        }
        if block.is_flora() {
            self.out
                .opaque
                .add_cross(origin, atlas.uv(block, Face::PosX));
            self.next_voxel(n);
            return MeshStep::Advanced;
        }

        let Some(face) = Face::from_index(self.face as usize) else {
            self.next_voxel(n);
            return MeshStep::Advanced;
        };
        let visible = if block.is_water() && face == Face::PosY {
            true
        } else {
            let (dx, dy, dz) = face.delta();
            match src.neighbor(x as i32 + dx, y as i32 + dy, z as i32 + dz) {
                Ok(nb) => face_visible(block, nb, face),
                Err(Unavailable) => return MeshStep::Blocked(face),
            }
        };
        if visible {
            let uv = atlas.uv(block, face);
            if block.is_water() {
                self.out
                    .translucent
                    .add_cube_face(face, origin, uv, WATER_OFFSET);
            } else {
                self.out.opaque.add_cube_face(face, origin, uv, 0.0);
            }
        }
        self.next_face(n);
        MeshStep::Advanced
    }

    /// Runs the pass until it finishes or hits an unavailable neighbor.
    pub fn resume<S: VoxelSource + ?Sized>(
        &mut self,
        src: &S,
        atlas: &TextureAtlas,
    ) -> Result<ChunkMesh, Face> {
        loop {
            match self.step(src, atlas) {
                MeshStep::Advanced => {}
                MeshStep::Blocked(face) => return Err(face),
                MeshStep::Finished(mesh) => return Ok(mesh),
            }
        }
    }

    #[inline]
    fn next_face(&mut self, n: usize) {
        self.face += 1;
        if self.face as usize >= Face::ALL.len() {
            self.next_voxel(n);
        }
    }

    #[inline]
    fn next_voxel(&mut self, n: usize) {
        self.face = 0;
        self.x += 1;
        if self.x as usize >= n {
            self.x = 0;
            self.z += 1;
            if self.z as usize >= n {
                self.z = 0;
                self.y += 1;
            }
        }
    }

    fn finish(&mut self) -> ChunkMesh {
        let mesh = mem::take(&mut self.out);
        self.x = 0;
        self.y = 0;
        self.z = 0;
        self.face = 0;
        log::trace!(
            "mesh pass finished: {} opaque quads, {} translucent quads",
            mesh.opaque.quad_count(),
            mesh.translucent.quad_count()
        );
        mesh
    }
}
