//! Worker-side handling of chunk tasks.

use std::sync::Arc;
use std::time::Instant;

use tessera_blocks::TextureAtlas;
use tessera_chunk::{ChunkCoord, ChunkNeighborhood, ChunkRef, ChunkState, StoreError};
use tessera_world::{StagePolicy, World, WorldError};

use crate::handoff::{HandoffItem, MeshUpload};
use crate::queue::{TrySendError, WorkQueue};
use crate::task::{ChunkTask, TaskMode};

pub(crate) struct Pipeline {
    pub(crate) world: Arc<World>,
    pub(crate) atlas: Arc<TextureAtlas>,
    pub(crate) tasks: Arc<WorkQueue<ChunkTask>>,
    pub(crate) handoff: Arc<WorkQueue<HandoffItem>>,
}

impl Pipeline {
    pub(crate) fn run(&self, task: ChunkTask) {
        if self.tasks.is_shutdown() {
            log::trace!("skipping {task:?} during shutdown");
            self.abandon(task);
            return;
        }
        match task.mode {
            TaskMode::Load => self.load(task.coord),
            TaskMode::Mesh => self.mesh(task.coord),
            TaskMode::Generate { then_mesh } => self.generate(task.coord, then_mesh),
        }
    }

    /// Follow-up work goes back on the queue, or runs here when the queue is
    /// full so a worker never blocks on a queue only workers drain.
    fn dispatch(&self, task: ChunkTask) {
        match self.tasks.try_send(task) {
            Ok(()) => {}
            Err(TrySendError::Full(task)) => self.run(task),
            Err(TrySendError::Shutdown(task)) => {
                log::trace!("dropping {task:?}: shut down");
                self.abandon(task);
            }
        }
    }

    /// Answers a task that will not run, so whoever waits on the coordinate
    /// hears back.
    fn abandon(&self, task: ChunkTask) {
        let target = match task.mode {
            TaskMode::Load | TaskMode::Mesh => Some(task.coord),
            TaskMode::Generate { then_mesh } => then_mesh,
        };
        if let Some(coord) = target {
            self.publish(HandoffItem::Dropped(coord));
        }
    }

    fn publish(&self, item: HandoffItem) {
        if let Err(err) = self.handoff.send(item) {
            log::trace!("handoff closed, dropping {:?}", err.into_inner().coord());
        }
    }

    fn load(&self, coord: ChunkCoord) {
        if self.generate_to_decorated(coord) {
            self.mesh(coord);
        } else {
            self.publish(HandoffItem::Dropped(coord));
        }
    }

    fn generate(&self, coord: ChunkCoord, then_mesh: Option<ChunkCoord>) {
        match (self.generate_to_decorated(coord), then_mesh) {
            (true, Some(target)) => self.dispatch(ChunkTask::mesh(target)),
            (false, Some(target)) => self.publish(HandoffItem::Dropped(target)),
            (_, None) => {}
        }
    }

    fn generate_to_decorated(&self, coord: ChunkCoord) -> bool {
        let started = Instant::now();
        match self
            .world
            .advance(coord, ChunkState::Decorated, StagePolicy::Wait)
        {
            Ok(_) => {
                log::trace!("{coord} decorated in {:.2?}", started.elapsed());
                true
            }
            Err(WorldError::Store(StoreError::Exhausted(at))) => {
                log::debug!("store exhausted at {at} while generating {coord}");
                false
            }
            Err(err) => {
                log::debug!("generating {coord} failed: {err}");
                false
            }
        }
    }

    fn mesh(&self, coord: ChunkCoord) {
        let store = self.world.store();
        let Some(chunk) = store.find(coord) else {
            log::trace!("mesh {coord}: not resident");
            self.publish(HandoffItem::Dropped(coord));
            return;
        };
        if chunk.state() < ChunkState::Decorated {
            self.dispatch(ChunkTask::generate(coord, Some(coord)));
            return;
        }
        let Some(mut cursor) = chunk.try_lock_mesh() else {
            // The holder restarts its pass when it sees the flag.
            chunk.mark_mesh_dirty();
            return;
        };
        let started = Instant::now();
        loop {
            if chunk.take_mesh_dirty() {
                cursor.reset();
            }
            let source = ChunkNeighborhood::new(store, &chunk);
            match cursor.resume(&source, &self.atlas) {
                Ok(mesh) => {
                    if chunk.take_mesh_dirty() {
                        cursor.reset();
                        continue;
                    }
                    drop(cursor);
                    log::trace!(
                        "meshed {coord}: {} quads in {:.2?}",
                        mesh.quad_count(),
                        started.elapsed()
                    );
                    self.publish(HandoffItem::Mesh(MeshUpload {
                        handle: chunk.handle(),
                        coord,
                        opaque: mesh.opaque,
                        translucent: mesh.translucent,
                    }));
                    self.remesh_if_dirty(&chunk);
                    return;
                }
                Err(face) => {
                    let blocker = source.neighbor_coord(face);
                    drop(cursor);
                    log::trace!("mesh {coord} waits on {blocker}");
                    self.dispatch(ChunkTask::generate(blocker, Some(coord)));
                    return;
                }
            }
        }
    }

    /// An edit that lands between the last dirty check and releasing the
    /// cursor finds it locked and leaves only the flag, so the holder looks
    /// once more after letting go.
    pub(crate) fn remesh_if_dirty(&self, chunk: &ChunkRef) {
        if chunk.take_mesh_dirty() {
            log::trace!("{} edited during its pass; meshing again", chunk.coord());
            self.dispatch(ChunkTask::mesh(chunk.coord()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_blocks::Block;
    use tessera_chunk::{CHUNK_SIZE, ChunkStore};
    use tessera_world::{WorldGenConfig, WorldGenParams};

    fn inline_pipeline() -> Pipeline {
        let mut cfg = WorldGenConfig::default();
        cfg.seed = "pipeline".into();
        cfg.terrain.octaves = 3;
        let world = World::new(Arc::new(ChunkStore::new(512, 1024)), WorldGenParams::from_config(&cfg));
        world.set_load_center(8, 80, 8, 3);
        Pipeline {
            world: Arc::new(world),
            atlas: Arc::new(TextureAtlas::default()),
            tasks: Arc::new(WorkQueue::new(64)),
            handoff: Arc::new(WorkQueue::new(64)),
        }
    }

    /// Runs queued follow-ups on this thread until a mesh for `coord` comes out.
    fn drain_until_mesh(p: &Pipeline, coord: ChunkCoord) -> MeshUpload {
        loop {
            if let Ok(item) = p.handoff.try_recv() {
                match item {
                    HandoffItem::Mesh(up) if up.coord == coord => return up,
                    HandoffItem::Dropped(c) if c == coord => panic!("{coord} was dropped"),
                    _ => continue,
                }
            }
            let task = p.tasks.try_recv().expect("pipeline stalled without a mesh");
            p.run(task);
        }
    }

    /// World position of an air voxel whose six neighbors are air too.
    fn open_air(p: &Pipeline) -> (ChunkCoord, [i32; 3]) {
        let air = |x, y, z| p.world.try_get_block(x, y, z, StagePolicy::Wait) == Ok(Block::Null);
        for cy in 4..=7 {
            let coord = ChunkCoord::new(0, cy, 0);
            let (ox, oy, oz) = coord.origin();
            for ly in 1..CHUNK_SIZE as i32 - 1 {
                for lz in 1..CHUNK_SIZE as i32 - 1 {
                    for lx in 1..CHUNK_SIZE as i32 - 1 {
                        let (x, y, z) = (ox + lx, oy + ly, oz + lz);
                        let open = air(x, y, z)
                            && [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)]
                                .iter()
                                .all(|&(dx, dy, dz)| air(x + dx, y + dy, z + dz));
                        if open {
                            return (coord, [x, y, z]);
                        }
                    }
                }
            }
        }
        panic!("no open air above the origin");
    }

    fn quads(up: &MeshUpload) -> usize {
        up.opaque.quad_count() + up.translucent.quad_count()
    }

    #[test]
    fn edit_while_the_cursor_is_held_is_meshed_after_release() {
        let p = inline_pipeline();
        let (coord, [x, y, z]) = open_air(&p);
        p.run(ChunkTask::load(coord));
        let before = quads(&drain_until_mesh(&p, coord));
        let chunk = p.world.store().find(coord).unwrap();

        // Another pass owns the cursor when the edit and its re-mesh arrive.
        let held = chunk.try_lock_mesh().unwrap();
        p.world.set_block(x, y, z, Block::Glass).unwrap();
        p.run(ChunkTask::mesh(coord));
        assert!(p.handoff.try_recv().is_err());
        assert!(p.tasks.try_recv().is_err());

        drop(held);
        p.remesh_if_dirty(&chunk);
        let after = drain_until_mesh(&p, coord);
        assert!(quads(&after) > before, "{} !> {before}", quads(&after));
        assert!(!chunk.take_mesh_dirty());
    }

    #[test]
    fn tasks_seen_after_shutdown_are_answered() {
        let p = inline_pipeline();
        p.tasks.shutdown();
        let (a, b) = (ChunkCoord::new(0, 4, 0), ChunkCoord::new(1, 4, 0));
        p.run(ChunkTask::load(a));
        p.run(ChunkTask::mesh(b));
        p.run(ChunkTask::generate(ChunkCoord::new(2, 4, 0), None));
        let answered: Vec<_> = std::iter::from_fn(|| p.handoff.try_recv().ok())
            .map(|item| item.coord())
            .collect();
        assert_eq!(answered, vec![a, b]);
        assert!(p.world.store().find(a).is_none());
    }
}
