use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_blocks::{Block, TextureAtlas};
use tessera_chunk::{ChunkCoord, ChunkState, ChunkStore, StoreError};
use tessera_geom::Vec3;
use tessera_world::{RaycastState, StagePolicy, World, WorldError, WorldGenParams, affected_chunks};

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;
use crate::handoff::HandoffItem;
use crate::pipeline::Pipeline;
use crate::pool::WorkerPool;
use crate::queue::{TrySendError, WorkQueue};
use crate::task::{ChunkTask, TaskMode};

/// Owns the world, the task queue, the worker pool and the render handoff.
///
/// Methods are meant for the consumer thread. None of them block on the
/// task queue: loads that do not fit are refused and re-meshes that do not
/// fit wait in a backlog flushed on the next submission.
pub struct WorldContext {
    world: Arc<World>,
    atlas: Arc<TextureAtlas>,
    tasks: Arc<WorkQueue<ChunkTask>>,
    handoff: Arc<WorkQueue<HandoffItem>>,
    pool: Mutex<Option<WorkerPool>>,
    backlog: Mutex<VecDeque<ChunkTask>>,
}

impl WorldContext {
    pub fn init(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let atlas = match &config.atlas {
            Some(path) => {
                TextureAtlas::from_path(path).map_err(|e| RuntimeError::Atlas(e.to_string()))?
            }
            None => TextureAtlas::default(),
        };
        let atlas = Arc::new(atlas);
        let store = Arc::new(ChunkStore::new(config.chunk_capacity, config.hash_buckets));
        let params = WorldGenParams::from_config(&config.worldgen);
        log::info!(
            "world seed {:?}, sea level {}, {} chunk slots",
            params.seed,
            params.sea_level,
            store.capacity()
        );
        let world = Arc::new(World::new(store, params));
        let tasks = Arc::new(WorkQueue::new(config.task_capacity));
        let handoff = Arc::new(WorkQueue::new(config.handoff_capacity));
        let pipeline = Pipeline {
            world: Arc::clone(&world),
            atlas: Arc::clone(&atlas),
            tasks: Arc::clone(&tasks),
            handoff: Arc::clone(&handoff),
        };
        let pool = WorkerPool::spawn(config.workers, Arc::clone(&tasks), move |task| {
            pipeline.run(task)
        })?;
        Ok(Self {
            world,
            atlas,
            tasks,
            handoff,
            pool: Mutex::new(Some(pool)),
            backlog: Mutex::new(VecDeque::new()),
        })
    }

    /// Closes the task queue, waits for workers to drain it and exit, then
    /// closes the handoff. Loads and meshes still queued are answered with
    /// [`HandoffItem::Dropped`]. Safe to call more than once.
    pub fn shutdown(&self) {
        let Some(mut pool) = self.pool.lock().take() else {
            return;
        };
        self.tasks.shutdown();
        let handoff = &self.handoff;
        pool.join(|| {
            // Workers may be parked on a full handoff nobody is draining.
            while handoff.len() >= handoff.capacity() {
                match handoff.try_recv() {
                    Ok(item) => log::trace!("shutdown discarding handoff for {}", item.coord()),
                    Err(_) => break,
                }
            }
        });
        self.handoff.shutdown();
        self.backlog.lock().clear();
        log::info!("world context shut down");
    }

    pub fn is_shutdown(&self) -> bool {
        self.tasks.is_shutdown()
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        self.world.store()
    }

    pub fn atlas(&self) -> &Arc<TextureAtlas> {
        &self.atlas
    }

    /// Finished meshes and dropped requests, for the GPU-owning thread.
    pub fn handoff(&self) -> &Arc<WorkQueue<HandoffItem>> {
        &self.handoff
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        self.world.get_block(x, y, z)
    }

    /// Never waits on a stage another thread is running.
    pub fn try_get_block(&self, x: i32, y: i32, z: i32) -> Result<Block, WorldError> {
        self.world.try_get_block(x, y, z, StagePolicy::NoWait)
    }

    pub fn set_block(&self, x: i32, y: i32, z: i32, block: Block) -> Result<(), WorldError> {
        for coord in self.world.set_block(x, y, z, block)? {
            self.schedule_remesh(coord);
        }
        Ok(())
    }

    pub fn set_load_center(&self, x: i32, y: i32, z: i32, radius: i32) {
        self.world.set_load_center(x, y, z, radius);
    }

    pub fn begin_raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> RaycastState {
        self.world.begin_raycast(origin, dir, max_distance)
    }

    pub fn raycast(&self, state: &mut RaycastState) -> bool {
        self.world.raycast(state)
    }

    /// Re-meshes the chunk holding a voxel and the neighbors sharing its
    /// boundary faces.
    pub fn request_update(&self, x: i32, y: i32, z: i32) {
        for coord in affected_chunks(x, y, z) {
            self.schedule_remesh(coord);
        }
    }

    /// Queues generation and meshing of a chunk. `Ok(false)` when the queue
    /// is full; ask again later.
    pub fn request_load(&self, coord: ChunkCoord) -> Result<bool, RuntimeError> {
        self.submit(ChunkTask::load(coord))
    }

    pub fn unload(&self, coord: ChunkCoord) -> Result<(), StoreError> {
        self.world.store().unload(coord)
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len() + self.backlog.lock().len()
    }

    fn schedule_remesh(&self, coord: ChunkCoord) {
        let Some(chunk) = self.world.store().find(coord) else {
            return;
        };
        if chunk.state() != ChunkState::Decorated {
            return;
        }
        chunk.mark_mesh_dirty();
        if let Err(err) = self.submit(ChunkTask::mesh(coord)) {
            log::trace!("re-mesh of {coord} skipped: {err}");
        }
    }

    fn submit(&self, task: ChunkTask) -> Result<bool, RuntimeError> {
        self.flush_backlog();
        match self.tasks.try_send(task) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(task)) if task.mode == TaskMode::Mesh => {
                self.backlog.lock().push_back(task);
                Ok(true)
            }
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Shutdown(_)) => Err(RuntimeError::ShutdownInProgress),
        }
    }

    /// Moves backlogged re-meshes onto the task queue as space allows.
    pub fn flush_backlog(&self) {
        let mut backlog = self.backlog.lock();
        while let Some(task) = backlog.pop_front() {
            if let Err(err) = self.tasks.try_send(task) {
                if let TrySendError::Full(task) = err {
                    backlog.push_front(task);
                }
                break;
            }
        }
    }
}

impl Drop for WorldContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
