use tessera_blocks::Block;
use tessera_chunk::{ChunkRef, voxel_index};

use super::chunk_extent;
use crate::gen_ctx::{GenCtx, density_to_fixed};

/// Fills density and the provisional block layer.
pub(super) fn run(ctx: &GenCtx, chunk: &ChunkRef) {
    let (ox, oy, oz) = chunk.coord().origin();
    let n = chunk_extent();
    let sea = ctx.params.sea_level;
    for z in 0..n {
        for x in 0..n {
            let (wx, wz) = (ox + x, oz + z);
            let height = ctx.height(wx, wz);
            for y in 0..n {
                let wy = oy + y;
                let d = density_to_fixed(ctx.density(wx, wy, wz, height));
                let block = if d > 0 {
                    Block::Stone
                } else if wy < sea {
                    Block::Water
                } else {
                    Block::Null
                };
                let i = voxel_index(x as usize, y as usize, z as usize);
                chunk.set_density_at(i, d);
                chunk.set_block_at(i, block);
            }
        }
    }
}
