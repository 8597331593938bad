#![allow(dead_code)]

use std::sync::Arc;

use tessera_chunk::{CHUNK_VOLUME, ChunkCoord, ChunkRef, ChunkStore};
use tessera_world::{World, WorldGenConfig, WorldGenParams};

/// Default terrain with fewer octaves so debug builds stay quick.
pub fn light_config() -> WorldGenConfig {
    let mut cfg = WorldGenConfig::default();
    cfg.seed = "fixture".into();
    cfg.terrain.octaves = 3;
    cfg
}

pub fn world_with(cfg: &WorldGenConfig, capacity: usize) -> World {
    let store = Arc::new(ChunkStore::new(capacity, capacity * 2));
    World::new(store, WorldGenParams::from_config(cfg))
}

pub fn snapshot(chunk: &ChunkRef) -> Vec<u8> {
    (0..CHUNK_VOLUME).map(|i| chunk.block_at(i).id()).collect()
}

/// Chunks straddling the default ground height.
pub fn surface_band() -> Vec<ChunkCoord> {
    let mut out = Vec::new();
    for cy in 3..=4 {
        for cz in -1..=1 {
            for cx in -1..=1 {
                out.push(ChunkCoord::new(cx, cy, cz));
            }
        }
    }
    out
}
