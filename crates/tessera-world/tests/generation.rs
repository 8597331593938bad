mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{light_config, snapshot, surface_band, world_with};
use tessera_blocks::Block;
use tessera_chunk::{CHUNK_VOLUME, ChunkCoord, ChunkState, voxel_index};
use tessera_world::{StagePolicy, World};

fn decorate_all(world: &World, coords: &[ChunkCoord]) -> HashMap<ChunkCoord, Vec<u8>> {
    coords
        .iter()
        .map(|&c| {
            let chunk = world
                .advance(c, ChunkState::Decorated, StagePolicy::Wait)
                .expect("capacity covers the band");
            (c, snapshot(&chunk))
        })
        .collect()
}

#[test]
fn output_does_not_depend_on_request_order() {
    let cfg = light_config();
    let band = surface_band();
    let forward = decorate_all(&world_with(&cfg, 512), &band);
    let mut reversed_band = band.clone();
    reversed_band.reverse();
    let reversed = decorate_all(&world_with(&cfg, 512), &reversed_band);
    for c in &band {
        assert_eq!(forward[c], reversed[c], "chunk {c} differs");
    }
}

#[test]
fn output_does_not_depend_on_thread_count() {
    let cfg = light_config();
    let band = surface_band();
    let serial = decorate_all(&world_with(&cfg, 512), &band);

    let world = world_with(&cfg, 512);
    std::thread::scope(|s| {
        for t in 0..4 {
            let world = &world;
            let band = &band;
            s.spawn(move || {
                let n = band.len();
                for k in 0..n {
                    let c = band[(k * 7 + t * 5) % n];
                    world
                        .advance(c, ChunkState::Decorated, StagePolicy::Wait)
                        .expect("capacity covers the band");
                }
            });
        }
    });
    let parallel = decorate_all(&world, &band);
    for c in &band {
        assert_eq!(serial[c], parallel[c], "chunk {c} differs");
    }
}

#[test]
fn states_only_move_forward() {
    let cfg = light_config();
    let world = world_with(&cfg, 256);
    let target = ChunkCoord::new(0, 4, 0);
    let watched = world.store().find_or_create(target).expect("empty store");
    let done = AtomicBool::new(false);
    let seen = std::thread::scope(|s| {
        let watcher = s.spawn(|| {
            let mut seen = vec![watched.state()];
            while !done.load(Ordering::Acquire) {
                let state = watched.state();
                if Some(&state) != seen.last() {
                    seen.push(state);
                }
                std::hint::spin_loop();
            }
            seen.push(watched.state());
            seen
        });
        for t in 0..3 {
            let world = &world;
            s.spawn(move || {
                let c = target.offset(t - 1, 0, 0);
                world
                    .advance(c, ChunkState::Decorated, StagePolicy::Wait)
                    .expect("capacity");
            });
        }
        world
            .advance(target, ChunkState::Decorated, StagePolicy::Wait)
            .expect("capacity");
        done.store(true, Ordering::Release);
        watcher.join().expect("watcher")
    });
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert_eq!(seen.last(), Some(&ChunkState::Decorated));
}

#[test]
fn deep_rock_and_open_sky() {
    let world = world_with(&light_config(), 64);
    let deep = world
        .try_get_block(3, -500, 3, StagePolicy::Wait)
        .expect("deep chunk");
    assert_eq!(deep, Block::Stone);
    let sky = world
        .try_get_block(3, 600, 3, StagePolicy::Wait)
        .expect("sky chunk");
    assert_eq!(sky, Block::Null);
}

#[test]
fn surface_layers_appear() {
    let world = world_with(&light_config(), 512);
    let snaps = decorate_all(&world, &surface_band());
    let count = |b: Block| {
        snaps
            .values()
            .flat_map(|v| v.iter())
            .filter(|&&id| id == b.id())
            .count()
    };
    assert!(count(Block::Stone) > 0);
    assert!(count(Block::Grass) + count(Block::Sand) > 0);
}

#[test]
fn grass_sits_under_open_density() {
    let world = world_with(&light_config(), 512);
    let band = surface_band();
    decorate_all(&world, &band);
    let params = world.params();
    for c in band {
        let chunk = world
            .advance(c, ChunkState::Decorated, StagePolicy::Wait)
            .expect("resident");
        let (ox, oy, oz) = c.origin();
        for i in 0..CHUNK_VOLUME {
            if chunk.block_at(i) != Block::Grass {
                continue;
            }
            let (x, y, z) = (i % 16, i / 256, (i / 16) % 16);
            let wy = oy + y as i32;
            assert!(wy > params.sea_level + params.beach_height);
            let above = world
                .try_get_block(ox + x as i32, wy + 1, oz + z as i32, StagePolicy::Wait)
                .expect("above");
            assert_ne!(above, Block::Stone, "grass at {c} {x},{y},{z} is buried");
        }
    }
}

#[test]
fn decoration_follows_rates() {
    let mut cfg = light_config();
    cfg.terrain.sea_level = -64;
    cfg.decoration.tree_per_mille = 0;
    cfg.decoration.flora_per_mille = 0;
    let bare = decorate_all(&world_with(&cfg, 512), &surface_band());
    for snap in bare.values() {
        for &id in snap {
            assert!(
                ![Block::Wood, Block::Leaves, Block::GrassBlades, Block::Rose]
                    .iter()
                    .any(|b| b.id() == id)
            );
        }
    }

    cfg.decoration.tree_per_mille = 1000;
    let forest = decorate_all(&world_with(&cfg, 512), &surface_band());
    let wood: usize = forest
        .values()
        .map(|v| v.iter().filter(|&&id| id == Block::Wood.id()).count())
        .sum();
    let leaves: usize = forest
        .values()
        .map(|v| v.iter().filter(|&&id| id == Block::Leaves.id()).count())
        .sum();
    assert!(wood > 0 && leaves > 0);
}

#[test]
fn canopies_continue_across_chunk_seams() {
    let mut cfg = light_config();
    cfg.terrain.sea_level = -64;
    cfg.decoration.tree_per_mille = 1000;
    cfg.decoration.leaf_radius = 0;
    let forest = decorate_all(&world_with(&cfg, 512), &surface_band());
    let block = |x: i32, y: i32, z: i32| {
        let snap = forest.get(&ChunkCoord::from_world(x, y, z))?;
        let (lx, ly, lz) = ChunkCoord::local(x, y, z);
        Block::from_id(snap[voxel_index(lx, ly, lz)])
    };

    let mut crossings = 0;
    for (&c, snap) in &forest {
        let (ox, oy, oz) = c.origin();
        for (i, &id) in snap.iter().enumerate() {
            if id != Block::Wood.id() {
                continue;
            }
            let (x, y, z) = (ox + (i % 16) as i32, oy + (i / 256) as i32, oz + ((i / 16) % 16) as i32);
            // A trunk top carries its leaf cap directly above.
            if block(x, y + 1, z) != Some(Block::Leaves) {
                continue;
            }
            for dz in -1..=1 {
                for dx in -1..=1 {
                    let (cx, cy, cz) = (x + dx, y + 1, z + dz);
                    let Some(cap) = block(cx, cy, cz) else {
                        continue;
                    };
                    if ChunkCoord::from_world(cx, cy, cz) != c {
                        crossings += 1;
                    }
                    assert!(!cap.is_replaceable(), "cap voxel {cx},{cy},{cz} of trunk {x},{y},{z} is {cap:?}");
                }
            }
        }
    }
    assert!(crossings > 0, "no canopy reached a seam");
}
