use proptest::prelude::*;
use tessera_blocks::{Block, Face, TextureAtlas};
use tessera_mesh_cpu::{ChunkMesh, MeshCursor, MeshStep, PaddedVoxels};

const N: usize = 8;

fn terrain(seed: u64) -> PaddedVoxels {
    let mut src = PaddedVoxels::new(N);
    let mut s = seed | 1;
    let mut next = || {
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        s
    };
    let palette = [
        Block::Null,
        Block::Null,
        Block::Stone,
        Block::Grass,
        Block::Water,
        Block::Glass,
        Block::Rose,
        Block::Leaves,
    ];
    let n = N as i32;
    for y in -1..=n {
        for z in -1..=n {
            for x in -1..=n {
                let b = palette[(next() % palette.len() as u64) as usize];
                src.set(x, y, z, b);
            }
        }
    }
    src
}

fn uninterrupted(src: &PaddedVoxels) -> ChunkMesh {
    MeshCursor::new()
        .resume(src, &TextureAtlas::default())
        .expect("complete")
}

#[test]
fn blocked_step_consumes_nothing() {
    let mut src = PaddedVoxels::new(N);
    src.set(0, 0, 0, Block::Stone);
    src.set_available(Face::NegY, false);
    let atlas = TextureAtlas::default();
    let mut cursor = MeshCursor::new();
    // PosY is tested first, then NegY blocks.
    assert!(matches!(cursor.step(&src, &atlas), MeshStep::Advanced));
    let before = cursor.position();
    for _ in 0..3 {
        assert!(matches!(cursor.step(&src, &atlas), MeshStep::Blocked(Face::NegY)));
        assert_eq!(cursor.position(), before);
    }
    src.set_available(Face::NegY, true);
    let mesh = cursor.resume(&src, &atlas).expect("now ready");
    assert_eq!(mesh.opaque.quad_count(), 6);
    assert!(cursor.at_start());
}

#[test]
fn reset_discards_partial_output() {
    let mut src = terrain(7);
    src.set_available(Face::PosZ, false);
    let atlas = TextureAtlas::default();
    let mut cursor = MeshCursor::new();
    let _ = cursor.resume(&src, &atlas);
    cursor.reset();
    src.set_all_available(true);
    assert_eq!(cursor.resume(&src, &atlas).expect("ready"), uninterrupted(&src));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Suspending on any sequence of unavailable sides and resuming yields
    // the same bytes as a single uninterrupted pass.
    #[test]
    fn resumed_pass_matches_uninterrupted(
        seed in any::<u64>(),
        outages in proptest::collection::vec(0usize..6, 0..12),
    ) {
        let expected = uninterrupted(&terrain(seed));
        let mut src = terrain(seed);
        let atlas = TextureAtlas::default();
        let mut cursor = MeshCursor::new();
        let mut result = None;
        for face in outages {
            src.set_all_available(true);
            src.set_available(Face::ALL[face], false);
            match cursor.resume(&src, &atlas) {
                Ok(mesh) => {
                    result = Some(mesh);
                    break;
                }
                Err(blocked) => prop_assert_eq!(blocked, Face::ALL[face]),
            }
        }
        src.set_all_available(true);
        let mesh = match result {
            Some(m) => m,
            None => cursor.resume(&src, &atlas).expect("all available"),
        };
        prop_assert_eq!(mesh, expected);
    }
}
