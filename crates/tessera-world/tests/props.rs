use proptest::prelude::*;
use tessera_blocks::Block;
use tessera_chunk::ChunkCoord;
use tessera_geom::Vec3;
use tessera_world::{affected_chunks, begin_raycast};

proptest! {
    // Every extra chunk is the face neighbor reached by stepping the voxel
    // one block across a chunk boundary.
    #[test]
    fn affected_chunks_are_face_neighbors(x in -100i32..100, y in -40i32..120, z in -100i32..100) {
        let home = ChunkCoord::from_world(x, y, z);
        let out = affected_chunks(x, y, z);
        prop_assert_eq!(out[0], home);
        let mut boundary_axes = 0;
        for (dx, dy, dz) in [(1, 0, 0), (0, 1, 0), (0, 0, 1)] {
            let lo = ChunkCoord::from_world(x - dx, y - dy, z - dz);
            let hi = ChunkCoord::from_world(x + dx, y + dy, z + dz);
            for n in [lo, hi] {
                if n != home {
                    boundary_axes += 1;
                    prop_assert!(out.contains(&n));
                }
            }
        }
        prop_assert_eq!(out.len(), 1 + boundary_axes);
    }

    #[test]
    fn ray_aimed_at_a_lone_block_hits_it(
        ox in -8.0f32..8.0,
        oy in -8.0f32..8.0,
        oz in -8.0f32..8.0,
    ) {
        let inside = (0.0..1.0).contains(&ox) && (0.0..1.0).contains(&oy) && (0.0..1.0).contains(&oz);
        prop_assume!(!inside);
        let lone = |x: i32, y: i32, z: i32| {
            if (x, y, z) == (0, 0, 0) { Block::Stone } else { Block::Null }
        };
        let origin = Vec3::new(ox, oy, oz);
        let to_center = Vec3::new(0.5, 0.5, 0.5) - origin;
        let mut ray = begin_raycast(origin, to_center, to_center.length() + 1.0);
        prop_assert!(ray.step(&lone));
        prop_assert_eq!(ray.voxel, [0, 0, 0]);
        prop_assert_eq!(ray.block, Block::Stone);
        prop_assert!(ray.face.is_some());
        prop_assert!(ray.distance <= to_center.length() + 1e-3);
    }
}
