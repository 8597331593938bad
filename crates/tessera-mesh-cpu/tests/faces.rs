use tessera_blocks::{Block, Face, TextureAtlas};
use tessera_mesh_cpu::{ChunkMesh, MeshCursor, PaddedVoxels, WATER_OFFSET};

const N: usize = 16;

fn mesh(src: &PaddedVoxels) -> ChunkMesh {
    let atlas = TextureAtlas::default();
    MeshCursor::new().resume(src, &atlas).expect("all neighbors available")
}

fn top_ys(m: &tessera_mesh_cpu::MeshBuild) -> Vec<f32> {
    m.pos.chunks(3).map(|p| p[1]).collect()
}

#[test]
fn empty_chunk_has_no_geometry() {
    let src = PaddedVoxels::new(N);
    assert!(mesh(&src).is_empty());
}

#[test]
fn isolated_solid_emits_six_faces() {
    let mut src = PaddedVoxels::new(N);
    src.set(5, 5, 5, Block::Stone);
    let m = mesh(&src);
    assert_eq!(m.opaque.quad_count(), 6);
    assert_eq!(m.opaque.vertex_count(), 24);
    assert!(m.translucent.is_empty());
}

#[test]
fn adjacent_solids_share_a_hidden_face() {
    let mut src = PaddedVoxels::new(N);
    src.set(5, 5, 5, Block::Stone);
    src.set(6, 5, 5, Block::Dirt);
    assert_eq!(mesh(&src).opaque.quad_count(), 10);
}

#[test]
fn adjacent_water_suppresses_shared_side_keeps_tops() {
    let mut src = PaddedVoxels::new(N);
    src.set(5, 5, 5, Block::Water);
    src.set(5, 5, 6, Block::Water);
    let m = mesh(&src);
    assert!(m.opaque.is_empty());
    assert_eq!(m.translucent.quad_count(), 10);
    let lowered = top_ys(&m.translucent)
        .iter()
        .filter(|y| (**y - (6.0 - WATER_OFFSET)).abs() < 1e-5)
        .count();
    // Two top faces (4 each) plus the raised edge of 6 side faces (2 each).
    assert_eq!(lowered, 2 * 4 + 6 * 2);
}

#[test]
fn water_top_is_emitted_even_under_water() {
    let mut src = PaddedVoxels::new(N);
    src.set(3, 3, 3, Block::Water);
    src.set(3, 4, 3, Block::Water);
    let m = mesh(&src);
    // 4 sides each, 1 bottom for the lower, and both tops.
    assert_eq!(m.translucent.quad_count(), 4 + 4 + 1 + 2);
}

#[test]
fn solid_face_next_to_water_is_visible() {
    let mut src = PaddedVoxels::new(N);
    src.set(5, 5, 5, Block::Stone);
    src.set(5, 6, 5, Block::Water);
    let m = mesh(&src);
    assert_eq!(m.opaque.quad_count(), 6);
    // Water: four sides and top; its bottom faces stone.
    assert_eq!(m.translucent.quad_count(), 5);
}

#[test]
fn glass_is_opaque_stream_and_shows_neighbors() {
    let mut src = PaddedVoxels::new(N);
    src.set(1, 1, 1, Block::Glass);
    src.set(2, 1, 1, Block::Stone);
    let m = mesh(&src);
    // Glass hides nothing behind it; stone keeps its face towards the glass.
    assert_eq!(m.opaque.quad_count(), 5 + 6);
}

#[test]
fn flora_is_a_cross_of_two_quads() {
    let mut src = PaddedVoxels::new(N);
    src.set(7, 0, 7, Block::Rose);
    src.set(7, -1, 7, Block::Grass);
    let m = mesh(&src);
    assert_eq!(m.opaque.quad_count(), 2);
}

#[test]
fn faces_against_neighbor_chunks_are_culled() {
    let mut src = PaddedVoxels::new(N);
    src.set(0, 0, 0, Block::Stone);
    src.set(-1, 0, 0, Block::Stone);
    src.set(0, -1, 0, Block::Stone);
    src.set(0, 0, -1, Block::Stone);
    assert_eq!(mesh(&src).opaque.quad_count(), 3);
}

#[test]
fn unavailable_side_blocks_only_when_reached() {
    let mut src = PaddedVoxels::new(N);
    src.set(8, 8, 8, Block::Stone);
    src.set_available(Face::PosX, false);
    // The voxel never touches the +x shell.
    assert_eq!(mesh(&src).opaque.quad_count(), 6);

    src.set(N as i32 - 1, 0, 0, Block::Stone);
    let atlas = TextureAtlas::default();
    let mut cursor = MeshCursor::new();
    assert_eq!(cursor.resume(&src, &atlas), Err(Face::PosX));
}
