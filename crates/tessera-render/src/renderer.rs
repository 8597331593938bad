use std::sync::Arc;

use glam::Vec3;
use hashbrown::{HashMap, HashSet};
use tessera_chunk::{CHUNK_SIZE, ChunkCoord, ChunkHandle};
use tessera_runtime::{HandoffItem, MeshUpload, WorldContext};

use crate::camera::{Camera, RenderConfig};
use crate::gpu::{GpuBackend, Pass};

struct GpuChunk<B> {
    handle: ChunkHandle,
    coord: ChunkCoord,
    opaque: Option<B>,
    translucent: Option<B>,
    vertices: usize,
    indices: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn_opaque: usize,
    pub drawn_translucent: usize,
    pub resident_meshes: usize,
    pub vertices: usize,
    pub indices: usize,
    pub inflight: usize,
}

/// Owns every GPU buffer. Lives on the single thread that talks to the
/// backend.
pub struct ChunkRenderer<G: GpuBackend> {
    gpu: G,
    ctx: Arc<WorldContext>,
    camera: Camera,
    radius: i32,
    chunks: HashMap<u32, GpuChunk<G::Buffer>>,
    inflight: HashSet<ChunkCoord>,
    offsets: Vec<(i32, i32, i32)>,
}

impl<G: GpuBackend> ChunkRenderer<G> {
    pub fn new(gpu: G, ctx: Arc<WorldContext>, cfg: &RenderConfig) -> Self {
        Self {
            gpu,
            ctx,
            camera: Camera::new(cfg),
            radius: -1,
            chunks: HashMap::new(),
            inflight: HashSet::new(),
            offsets: Vec::new(),
        }
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// `radius` is in chunks and bounds both drawing and load requests.
    pub fn set_camera(&mut self, position: Vec3, look_at: Vec3, aspect: f32, radius: i32) {
        self.camera.position = position;
        self.camera.look_at = look_at;
        self.camera.aspect = aspect;
        let radius = radius.max(0);
        if radius != self.radius {
            self.radius = radius;
            self.offsets = nearest_first_offsets(radius);
        }
    }

    pub fn camera_chunk(&self) -> ChunkCoord {
        let p = self.camera.position.floor();
        ChunkCoord::from_world(p.x as i32, p.y as i32, p.z as i32)
    }

    /// Pushes the view and projection to the backend.
    pub fn update(&mut self) {
        self.gpu.set_view(self.camera.view(), self.camera.projection());
    }

    /// Draws resident chunks within the radius: the opaque pass first, then
    /// translucent geometry back to front.
    pub fn render(&mut self) -> FrameStats {
        self.compact();
        let center = self.camera_chunk();
        let mut stats = FrameStats {
            resident_meshes: self.chunks.len(),
            inflight: self.inflight.len(),
            ..FrameStats::default()
        };
        let mut blended: Vec<(f32, u32)> = Vec::new();
        for (&slot, chunk) in &self.chunks {
            if chunk.coord.chebyshev(center) > self.radius {
                continue;
            }
            stats.vertices += chunk.vertices;
            stats.indices += chunk.indices;
            if let Some(buf) = &chunk.opaque {
                self.gpu.draw(buf, chunk_origin(chunk.coord), Pass::Opaque);
                stats.drawn_opaque += 1;
            }
            if chunk.translucent.is_some() {
                let mid = chunk_origin(chunk.coord) + Vec3::splat(CHUNK_SIZE as f32 * 0.5);
                blended.push((mid.distance_squared(self.camera.position), slot));
            }
        }
        blended.sort_by(|a, b| b.0.total_cmp(&a.0));
        for (_, slot) in blended {
            if let Some(chunk) = self.chunks.get(&slot) {
                if let Some(buf) = &chunk.translucent {
                    self.gpu.draw(buf, chunk_origin(chunk.coord), Pass::Translucent);
                    stats.drawn_translucent += 1;
                }
            }
        }
        stats
    }

    /// Takes up to `budget` finished items off the handoff. Returns how
    /// many meshes were uploaded.
    pub fn upload_finished(&mut self, budget: usize) -> usize {
        let mut uploaded = 0;
        for _ in 0..budget {
            let Ok(item) = self.ctx.handoff().try_recv() else {
                break;
            };
            match item {
                HandoffItem::Mesh(up) => {
                    self.inflight.remove(&up.coord);
                    if self.upload(up) {
                        uploaded += 1;
                    }
                }
                HandoffItem::Dropped(coord) => {
                    log::trace!("request for {coord} dropped");
                    self.inflight.remove(&coord);
                }
            }
        }
        uploaded
    }

    fn upload(&mut self, up: MeshUpload) -> bool {
        let store = Arc::clone(self.ctx.store());
        if store.generation(up.handle.slot) != Some(up.handle.generation) {
            log::trace!("discarding stale mesh for {}", up.coord);
            return false;
        }
        if let Some(old) = self.chunks.remove(&up.handle.slot) {
            self.release(old);
        }
        let opaque = (!up.opaque.is_empty()).then(|| self.gpu.upload(&up.opaque));
        let translucent = (!up.translucent.is_empty()).then(|| self.gpu.upload(&up.translucent));
        self.chunks.insert(
            up.handle.slot,
            GpuChunk {
                handle: up.handle,
                coord: up.coord,
                opaque,
                translucent,
                vertices: up.opaque.vertex_count() + up.translucent.vertex_count(),
                indices: up.opaque.idx.len() + up.translucent.idx.len(),
            },
        );
        if let Some(chunk) = store.find(up.coord) {
            if chunk.handle() == up.handle {
                chunk.set_renderable(true);
            }
        }
        true
    }

    fn release(&mut self, chunk: GpuChunk<G::Buffer>) {
        if let Some(buf) = chunk.opaque {
            self.gpu.release(buf);
        }
        if let Some(buf) = chunk.translucent {
            self.gpu.release(buf);
        }
    }

    /// Releases buffers of chunks the store has retired. Returns how many
    /// chunk meshes were dropped.
    pub fn compact(&mut self) -> usize {
        let mut dropped = 0;
        for handle in self.ctx.store().drain_retired() {
            let stale = self
                .chunks
                .get(&handle.slot)
                .is_some_and(|c| c.handle.generation <= handle.generation);
            if stale {
                if let Some(chunk) = self.chunks.remove(&handle.slot) {
                    log::trace!("releasing buffers of {}", chunk.coord);
                    self.release(chunk);
                    dropped += 1;
                }
            }
        }
        if self.ctx.store().take_retired_overflow() {
            // Some retirements were never reported; check every slot.
            let store = Arc::clone(self.ctx.store());
            let stale: Vec<u32> = self
                .chunks
                .iter()
                .filter(|(slot, c)| store.generation(**slot) != Some(c.handle.generation))
                .map(|(slot, _)| *slot)
                .collect();
            for slot in stale {
                if let Some(chunk) = self.chunks.remove(&slot) {
                    self.release(chunk);
                    dropped += 1;
                }
            }
        }
        dropped
    }

    /// Re-meshes around an edited voxel.
    pub fn request_update(&self, x: i32, y: i32, z: i32) {
        self.ctx.request_update(x, y, z);
    }

    /// Requests loads for chunks within the radius that have no mesh yet,
    /// nearest first. Returns how many requests were queued.
    pub fn request_visible(&mut self, budget: usize) -> usize {
        let center = self.camera_chunk();
        let store = self.ctx.store();
        let mut issued = 0;
        for &(dx, dy, dz) in &self.offsets {
            if issued >= budget {
                break;
            }
            let coord = center.offset(dx, dy, dz);
            if self.inflight.contains(&coord) || !store.in_load_area(coord) {
                continue;
            }
            if let Some(chunk) = store.find(coord) {
                let meshed = self
                    .chunks
                    .get(&chunk.slot())
                    .is_some_and(|g| g.handle == chunk.handle());
                if meshed {
                    continue;
                }
            }
            match self.ctx.request_load(coord) {
                Ok(true) => {
                    self.inflight.insert(coord);
                    issued += 1;
                }
                Ok(false) => break,
                Err(err) => {
                    log::debug!("load requests stopped: {err}");
                    break;
                }
            }
        }
        issued
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn resident_meshes(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_meshed(&self, coord: ChunkCoord) -> bool {
        self.chunks.values().any(|c| c.coord == coord)
    }

    /// Releases every buffer.
    pub fn clear(&mut self) {
        let chunks: Vec<_> = self.chunks.drain().map(|(_, c)| c).collect();
        for chunk in chunks {
            self.release(chunk);
        }
        self.inflight.clear();
    }
}

fn chunk_origin(coord: ChunkCoord) -> Vec3 {
    let (x, y, z) = coord.origin();
    Vec3::new(x as f32, y as f32, z as f32)
}

/// Every offset in the cube of `radius`, nearest first.
fn nearest_first_offsets(radius: i32) -> Vec<(i32, i32, i32)> {
    let mut out = Vec::new();
    for dy in -radius..=radius {
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                out.push((dx, dy, dz));
            }
        }
    }
    out.sort_by_key(|&(dx, dy, dz)| (dx * dx + dy * dy + dz * dz, dy, dz, dx));
    out
}
