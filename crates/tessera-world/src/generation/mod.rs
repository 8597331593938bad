//! Terrain stages. Each stage writes one layer of the chunk it runs on and
//! may read lower-stage layers of a fixed set of neighbors.

mod decorate;
mod shape;
mod surface;

use std::sync::Arc;

use tessera_chunk::{CHUNK_SIZE, Chunk, ChunkCoord, ChunkRef, ChunkState, Stage};

use crate::gen_ctx::GenCtx;
use crate::seed::WorldSeeds;
use crate::worldgen::WorldGenParams;

pub use decorate::is_root;

const SURFACE_DEPS: [(i32, i32, i32); 1] = [(0, 1, 0)];

const DECORATE_DEPS: [(i32, i32, i32); 17] = [
    (-1, -1, -1),
    (0, -1, -1),
    (1, -1, -1),
    (-1, -1, 0),
    (0, -1, 0),
    (1, -1, 0),
    (-1, -1, 1),
    (0, -1, 1),
    (1, -1, 1),
    (-1, 0, -1),
    (0, 0, -1),
    (1, 0, -1),
    (-1, 0, 0),
    (1, 0, 0),
    (-1, 0, 1),
    (0, 0, 1),
    (1, 0, 1),
];

pub struct TerrainGenerator {
    params: Arc<WorldGenParams>,
    seeds: WorldSeeds,
}

impl TerrainGenerator {
    pub fn new(params: WorldGenParams) -> Self {
        let seeds = WorldSeeds::from_seed(&params.seed);
        Self {
            params: Arc::new(params),
            seeds,
        }
    }

    pub fn params(&self) -> &WorldGenParams {
        &self.params
    }

    pub fn seeds(&self) -> WorldSeeds {
        self.seeds
    }

    pub fn make_gen_ctx(&self) -> GenCtx {
        GenCtx::new(Arc::clone(&self.params), self.seeds)
    }

    /// Neighbor offsets a stage reads, all of which must be at least `Shaped`.
    pub fn dependencies(stage: Stage) -> &'static [(i32, i32, i32)] {
        match stage {
            Stage::Shape => &[],
            Stage::Surface => &SURFACE_DEPS,
            Stage::Decorate => &DECORATE_DEPS,
        }
    }

    /// Runs one stage body. The caller holds the stage's running marker and
    /// pins every dependency.
    pub fn run(&self, stage: Stage, chunk: &ChunkRef, deps: &[ChunkRef]) {
        debug_assert_eq!(chunk.state(), stage.running());
        let ctx = self.make_gen_ctx();
        match stage {
            Stage::Shape => shape::run(&ctx, chunk),
            Stage::Surface => surface::run(&ctx, chunk, &Window::new(chunk, deps)),
            Stage::Decorate => decorate::run(&ctx, chunk, &Window::new(chunk, deps)),
        }
    }
}

/// The 3x3x3 block of chunks around a chunk being generated, as far as the
/// running stage pinned them.
pub(crate) struct Window<'a> {
    base: ChunkCoord,
    cells: [Option<&'a Chunk>; 27],
}

impl<'a> Window<'a> {
    pub(crate) fn new(center: &'a ChunkRef, deps: &'a [ChunkRef]) -> Self {
        let base = center.coord();
        let mut cells = [None; 27];
        cells[13] = Some(&**center);
        for d in deps {
            let c = d.coord();
            let (dx, dy, dz) = (c.cx - base.cx, c.cy - base.cy, c.cz - base.cz);
            debug_assert!(dx.abs() <= 1 && dy.abs() <= 1 && dz.abs() <= 1);
            cells[Self::cell(dx, dy, dz)] = Some(&**d);
        }
        Self { base, cells }
    }

    #[inline]
    fn cell(dx: i32, dy: i32, dz: i32) -> usize {
        ((dy + 1) * 9 + (dz + 1) * 3 + (dx + 1)) as usize
    }

    fn chunk_at(&self, x: i32, y: i32, z: i32) -> &'a Chunk {
        let c = ChunkCoord::from_world(x, y, z);
        let (dx, dy, dz) = (c.cx - self.base.cx, c.cy - self.base.cy, c.cz - self.base.cz);
        let cell = if dx.abs() <= 1 && dy.abs() <= 1 && dz.abs() <= 1 {
            self.cells[Self::cell(dx, dy, dz)]
        } else {
            None
        };
        match cell {
            Some(chunk) => chunk,
            None => panic!(
                "voxel ({x}, {y}, {z}) outside the pinned neighborhood of chunk {}",
                self.base
            ),
        }
    }

    /// Shaped density at a world voxel.
    #[inline]
    pub(crate) fn density(&self, x: i32, y: i32, z: i32) -> i16 {
        let chunk = self.chunk_at(x, y, z);
        chunk.require(ChunkState::Shaped);
        let (lx, ly, lz) = ChunkCoord::local(x, y, z);
        chunk.density(lx, ly, lz)
    }
}

#[inline]
pub(crate) fn chunk_extent() -> i32 {
    CHUNK_SIZE as i32
}
