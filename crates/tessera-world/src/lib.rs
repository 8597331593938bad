//! Terrain generation and the on-demand world built over the chunk store.
#![forbid(unsafe_code)]

pub mod error;
pub mod gen_ctx;
pub mod generation;
pub mod raycast;
pub mod seed;
pub mod world;
pub mod worldgen;

pub use error::WorldError;
pub use gen_ctx::{DENSITY_ONE, GenCtx};
pub use generation::TerrainGenerator;
pub use raycast::{BlockQuery, RaycastState, begin_raycast, cast};
pub use seed::WorldSeeds;
pub use world::{StagePolicy, World, affected_chunks};
pub use worldgen::{WorldGenConfig, WorldGenParams};
