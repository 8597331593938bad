//! GPU-side chunk management: uploads finished meshes, releases buffers of
//! retired chunks, draws the opaque then translucent pass and asks the
//! runtime for chunks that are still missing.
#![forbid(unsafe_code)]

pub mod camera;
pub mod gpu;
pub mod renderer;

pub use camera::{Camera, RenderConfig};
pub use gpu::{DrawCall, GpuBackend, HeadlessBuffer, HeadlessGpu, Pass};
pub use renderer::{ChunkRenderer, FrameStats};
