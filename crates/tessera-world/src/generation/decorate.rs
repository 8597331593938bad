use tessera_blocks::Block;
use tessera_chunk::hash::hash_seeded;
use tessera_chunk::{ChunkCoord, ChunkRef, voxel_index};

use super::{Window, chunk_extent};
use crate::gen_ctx::GenCtx;
use crate::worldgen::WorldGenParams;

/// A decoration root is an exposed voxel standing on solid ground above the
/// beach band. Judged on shaped density alone so every chunk that can see a
/// root agrees on it.
pub fn is_root(params: &WorldGenParams, density: impl Fn(i32, i32, i32) -> i16, x: i32, y: i32, z: i32) -> bool {
    y - 1 > params.sea_level + params.beach_height && density(x, y - 1, z) > 0 && density(x, y, z) <= 0
}

/// Places trees and flora. Roots are visited in global (y, z, x) order over
/// every position whose structure could reach this chunk, and only writes
/// inside this chunk land, so overlapping structures resolve the same way in
/// every chunk.
pub(super) fn run(ctx: &GenCtx, chunk: &ChunkRef, window: &Window<'_>) {
    let (ox, oy, oz) = chunk.coord().origin();
    let n = chunk_extent();
    let p = &ctx.params;
    let reach = p.leaf_radius;
    let density = |x: i32, y: i32, z: i32| window.density(x, y, z);
    let mut placed = 0usize;
    for y in (oy - p.trunk_max)..(oy + n) {
        for z in (oz - reach)..(oz + n + reach) {
            for x in (ox - reach)..(ox + n + reach) {
                if !is_root(p, density, x, y, z) {
                    continue;
                }
                let h = hash_seeded(x, y, z, ctx.seeds.decoration);
                let roll = h % 1000;
                if roll < p.tree_per_mille {
                    let span = (p.trunk_max - p.trunk_min) as u32;
                    let height = p.trunk_min + ((h >> 10) % (span + 1)) as i32;
                    place_tree(chunk, p, x, y, z, height);
                    placed += 1;
                } else if roll < p.tree_per_mille + p.flora_per_mille {
                    let kind = if (h >> 12) & 7 == 0 {
                        Block::Rose
                    } else {
                        Block::GrassBlades
                    };
                    put(chunk, x, y, z, kind);
                    placed += 1;
                }
            }
        }
    }
    log::trace!("decorate {}: {placed} structures placed", chunk.coord());
}

fn place_tree(chunk: &ChunkRef, p: &WorldGenParams, x: i32, y: i32, z: i32, height: i32) {
    let top = y + height - 1;
    for ty in y..=top {
        put(chunk, x, ty, z, Block::Wood);
    }
    let radius = p.leaf_radius;
    for ly in (top - 2)..=(top + 1) {
        let r = if ly <= top - 1 { radius } else { 1 };
        for dz in -r..=r {
            for dx in -r..=r {
                if r > 1 && dx.abs() == r && dz.abs() == r {
                    continue;
                }
                if dx == 0 && dz == 0 && ly <= top {
                    continue;
                }
                put(chunk, x + dx, ly, z + dz, Block::Leaves);
            }
        }
    }
}

/// Clipped write: only voxels of this chunk, only over replaceable blocks,
/// except that wood may displace leaves.
fn put(chunk: &ChunkRef, x: i32, y: i32, z: i32, block: Block) {
    if ChunkCoord::from_world(x, y, z) != chunk.coord() {
        return;
    }
    let (lx, ly, lz) = ChunkCoord::local(x, y, z);
    let i = voxel_index(lx, ly, lz);
    let current = chunk.block_at(i);
    if current.is_replaceable() || (block == Block::Wood && current == Block::Leaves) {
        chunk.set_block_at(i, block);
    }
}
