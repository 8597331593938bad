use tessera_blocks::{Block, Face, TextureAtlas};
use tessera_chunk::{ChunkCoord, ChunkNeighborhood, ChunkRef, ChunkStore, LoadArea, Stage, voxel_index};
use tessera_mesh_cpu::MeshCursor;

fn decorate(chunk: &ChunkRef) {
    for stage in [Stage::Shape, Stage::Surface, Stage::Decorate] {
        assert!(chunk.try_begin(stage));
        chunk.complete(stage);
    }
}

#[test]
fn blocked_pass_resumes_once_the_neighbor_is_decorated() {
    let store = ChunkStore::new(16, 64);
    store.set_load_area(LoadArea {
        center: ChunkCoord::new(0, 0, 0),
        radius: 1,
    });
    let atlas = TextureAtlas::default();
    let center = store.find_or_create(ChunkCoord::new(0, 0, 0)).unwrap();
    center.set_block_at(voxel_index(0, 0, 0), Block::Stone);
    decorate(&center);

    let mut late = None;
    for face in Face::ALL {
        let n = store.find_or_create(center.coord().step(face)).unwrap();
        if face == Face::NegX {
            late = Some(n);
        } else {
            decorate(&n);
        }
    }
    let late = late.unwrap();

    let mut cursor = MeshCursor::new();
    let blocked = cursor.resume(&ChunkNeighborhood::new(&store, &center), &atlas);
    assert_eq!(blocked.unwrap_err(), Face::NegX);
    assert!(!cursor.at_start());

    decorate(&late);
    let resumed = cursor
        .resume(&ChunkNeighborhood::new(&store, &center), &atlas)
        .unwrap();
    assert_eq!(resumed.opaque.quad_count(), 6);
    assert!(resumed.translucent.is_empty());

    let mut fresh = MeshCursor::new();
    let whole = fresh
        .resume(&ChunkNeighborhood::new(&store, &center), &atlas)
        .unwrap();
    assert_eq!(resumed, whole);
}
