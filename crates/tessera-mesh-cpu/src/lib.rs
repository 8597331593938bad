//! CPU meshing crate: resumable face-culling mesher producing an opaque and a
//! translucent vertex stream per chunk.
#![forbid(unsafe_code)]

pub mod cursor;
pub mod mesh_build;
pub mod padded;

pub use cursor::{ChunkMesh, MeshCursor, MeshStep, Unavailable, VoxelSource, face_visible};
pub use mesh_build::{MeshBuild, WATER_OFFSET};
pub use padded::PaddedVoxels;
