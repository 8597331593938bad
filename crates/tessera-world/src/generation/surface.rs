use tessera_blocks::Block;
use tessera_chunk::{ChunkRef, voxel_index};

use super::{Window, chunk_extent};
use crate::gen_ctx::GenCtx;

/// Turns stone near an exposed voxel above into grass, dirt or sand. The
/// probe reads shaped density only, crossing into the chunk above.
pub(super) fn run(ctx: &GenCtx, chunk: &ChunkRef, window: &Window<'_>) {
    let (ox, oy, oz) = chunk.coord().origin();
    let n = chunk_extent();
    let p = &ctx.params;
    for y in 0..n {
        for z in 0..n {
            for x in 0..n {
                let i = voxel_index(x as usize, y as usize, z as usize);
                if chunk.block_at(i) != Block::Stone {
                    continue;
                }
                let (wx, wy, wz) = (ox + x, oy + y, oz + z);
                let Some(k) = (1..=p.surface_depth + 1).find(|k| window.density(wx, wy + k, wz) <= 0)
                else {
                    continue;
                };
                let top = wy + k - 1;
                let block = if top <= p.sea_level + p.beach_height {
                    Block::Sand
                } else if k == 1 {
                    Block::Grass
                } else {
                    Block::Dirt
                };
                chunk.set_block_at(i, block);
            }
        }
    }
}
