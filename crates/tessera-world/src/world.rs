use std::sync::Arc;
use std::time::Instant;

use tessera_blocks::Block;
use tessera_chunk::{CHUNK_SIZE, ChunkCoord, ChunkRef, ChunkState, ChunkStore, EditApplied, LoadArea, Stage};
use tessera_geom::Vec3;

use crate::error::WorldError;
use crate::generation::TerrainGenerator;
use crate::raycast::{BlockQuery, RaycastState, begin_raycast};
use crate::worldgen::WorldGenParams;

/// Whether a caller may block on stages another thread is running.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StagePolicy {
    Wait,
    NoWait,
}

/// The generated voxel world: a chunk store plus the stage pipeline that
/// fills it on demand.
pub struct World {
    store: Arc<ChunkStore>,
    generator: TerrainGenerator,
}

impl World {
    pub fn new(store: Arc<ChunkStore>, params: WorldGenParams) -> Self {
        Self {
            store,
            generator: TerrainGenerator::new(params),
        }
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn params(&self) -> &WorldGenParams {
        self.generator.params()
    }

    /// Brings a chunk up to `target`, running whatever stages are missing on
    /// this thread. Stages only ever wait on lower stages of other chunks,
    /// which keeps concurrent callers free of cycles.
    pub fn advance(
        &self,
        coord: ChunkCoord,
        target: ChunkState,
        policy: StagePolicy,
    ) -> Result<ChunkRef, WorldError> {
        let chunk = self.store.find_or_create(coord)?;
        loop {
            let state = chunk.state();
            if state >= target {
                return Ok(chunk);
            }
            if state.in_progress() {
                match policy {
                    StagePolicy::Wait => {
                        chunk.wait_settled();
                        continue;
                    }
                    StagePolicy::NoWait => {
                        return Err(WorldError::NotReady {
                            coord,
                            needed: target,
                        });
                    }
                }
            }
            let Some(stage) = state.next_stage() else {
                unreachable!("pinned chunk {coord} observed in state {state:?}");
            };
            let deps = self.acquire_dependencies(coord, stage, policy)?;
            if !chunk.try_begin(stage) {
                continue;
            }
            let started = Instant::now();
            self.generator.run(stage, &chunk, &deps);
            chunk.complete(stage);
            log::trace!(
                "{} {coord} in {:.2?}",
                stage.name(),
                started.elapsed()
            );
        }
    }

    fn acquire_dependencies(
        &self,
        coord: ChunkCoord,
        stage: Stage,
        policy: StagePolicy,
    ) -> Result<Vec<ChunkRef>, WorldError> {
        TerrainGenerator::dependencies(stage)
            .iter()
            .map(|&(dx, dy, dz)| self.advance(coord.offset(dx, dy, dz), ChunkState::Shaped, policy))
            .collect()
    }

    /// Block at a world voxel, generating on demand. Voxels outside the load
    /// area, or whose chunk cannot be allocated, read as `Unloaded`.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        let coord = ChunkCoord::from_world(x, y, z);
        if !self.store.in_load_area(coord) {
            return Block::Unloaded;
        }
        match self.try_get_block(x, y, z, StagePolicy::Wait) {
            Ok(block) => block,
            Err(err) => {
                log::debug!("get_block({x}, {y}, {z}): {err}");
                Block::Unloaded
            }
        }
    }

    pub fn try_get_block(
        &self,
        x: i32,
        y: i32,
        z: i32,
        policy: StagePolicy,
    ) -> Result<Block, WorldError> {
        let chunk = self.advance(ChunkCoord::from_world(x, y, z), ChunkState::Decorated, policy)?;
        let (lx, ly, lz) = ChunkCoord::local(x, y, z);
        Ok(chunk.block(lx, ly, lz))
    }

    /// Writes a block and returns the chunks whose meshes it affects. Edits
    /// to chunks still generating are applied when decoration completes.
    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<Vec<ChunkCoord>, WorldError> {
        if block == Block::Unloaded {
            return Err(WorldError::UnstorableBlock);
        }
        let coord = ChunkCoord::from_world(x, y, z);
        let chunk = self.store.find_or_create(coord)?;
        let (lx, ly, lz) = ChunkCoord::local(x, y, z);
        match chunk.apply_edit(lx, ly, lz, block) {
            EditApplied::Immediate(prev) if prev == block => Ok(Vec::new()),
            EditApplied::Immediate(_) => Ok(affected_chunks(x, y, z)),
            // Neighbors only mesh against decorated chunks, so nothing
            // built so far has seen this voxel.
            EditApplied::Deferred => Ok(Vec::new()),
        }
    }

    /// Recenters the load area on a world position, with `radius` in chunks.
    pub fn set_load_center(&self, x: i32, y: i32, z: i32, radius: i32) {
        let area = LoadArea {
            center: ChunkCoord::from_world(x, y, z),
            radius: radius.max(0),
        };
        if area != self.store.load_area() {
            log::debug!("load area now {} r{}", area.center, area.radius);
        }
        self.store.set_load_area(area);
    }

    pub fn load_area(&self) -> LoadArea {
        self.store.load_area()
    }

    pub fn begin_raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> RaycastState {
        begin_raycast(origin, dir, max_distance)
    }

    /// Steps a cast against this world's blocks.
    pub fn raycast(&self, state: &mut RaycastState) -> bool {
        state.step(self)
    }
}

impl BlockQuery for World {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        self.get_block(x, y, z)
    }
}

/// The chunk holding a voxel plus any neighbor whose boundary faces touch it.
pub fn affected_chunks(x: i32, y: i32, z: i32) -> Vec<ChunkCoord> {
    let coord = ChunkCoord::from_world(x, y, z);
    let (lx, ly, lz) = ChunkCoord::local(x, y, z);
    let last = CHUNK_SIZE - 1;
    let mut out = vec![coord];
    for (axis, l) in [lx, ly, lz].into_iter().enumerate() {
        let mut d = [0i32; 3];
        if l == 0 {
            d[axis] = -1;
        } else if l == last {
            d[axis] = 1;
        } else {
            continue;
        }
        out.push(coord.offset(d[0], d[1], d[2]));
    }
    out
}
