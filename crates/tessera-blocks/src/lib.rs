//! Block ids, per-block property table, cube faces and texture-atlas lookup.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod block;
pub mod face;

pub use atlas::{AtlasConfig, TextureAtlas, UvRect, get_cube_face};
pub use block::{Block, BlockProperties};
pub use face::Face;
