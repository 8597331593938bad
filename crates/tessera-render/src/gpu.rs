//! The graphics API seam. A backend owns its buffers; the renderer only
//! holds the handles it returns.

use glam::{Mat4, Vec3};
use hashbrown::HashSet;
use tessera_mesh_cpu::MeshBuild;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Pass {
    Opaque,
    /// Alpha blended, drawn after every opaque chunk.
    Translucent,
}

pub trait GpuBackend {
    type Buffer;

    fn upload(&mut self, mesh: &MeshBuild) -> Self::Buffer;
    fn release(&mut self, buffer: Self::Buffer);
    fn set_view(&mut self, view: Mat4, projection: Mat4);
    fn draw(&mut self, buffer: &Self::Buffer, origin: Vec3, pass: Pass);
}

#[derive(Debug)]
pub struct HeadlessBuffer {
    pub id: u64,
    pub vertices: usize,
    pub indices: usize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub buffer: u64,
    pub origin: Vec3,
    pub pass: Pass,
    pub indices: usize,
}

/// Records what a real backend would have been asked to do.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    next_id: u64,
    live: HashSet<u64>,
    pub uploads: usize,
    pub releases: usize,
    pub view: Mat4,
    pub projection: Mat4,
    pub draws: Vec<DrawCall>,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_buffers(&self) -> usize {
        self.live.len()
    }

    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }
}

impl GpuBackend for HeadlessGpu {
    type Buffer = HeadlessBuffer;

    fn upload(&mut self, mesh: &MeshBuild) -> HeadlessBuffer {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.uploads += 1;
        HeadlessBuffer {
            id: self.next_id,
            vertices: mesh.vertex_count(),
            indices: mesh.idx.len(),
        }
    }

    fn release(&mut self, buffer: HeadlessBuffer) {
        let was_live = self.live.remove(&buffer.id);
        debug_assert!(was_live, "buffer {} released twice", buffer.id);
        self.releases += 1;
    }

    fn set_view(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }

    fn draw(&mut self, buffer: &HeadlessBuffer, origin: Vec3, pass: Pass) {
        debug_assert!(self.live.contains(&buffer.id));
        self.draws.push(DrawCall {
            buffer: buffer.id,
            origin,
            pass,
            indices: buffer.indices,
        });
    }
}
