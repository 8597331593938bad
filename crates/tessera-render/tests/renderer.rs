use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;
use tessera_chunk::{ChunkCoord, ChunkHandle};
use tessera_mesh_cpu::MeshBuild;
use tessera_render::{ChunkRenderer, HeadlessGpu, Pass, RenderConfig};
use tessera_runtime::{HandoffItem, MeshUpload, RuntimeConfig, WorldContext};

fn context() -> Arc<WorldContext> {
    context_with_capacity(2048)
}

fn context_with_capacity(chunk_capacity: usize) -> Arc<WorldContext> {
    let mut cfg = RuntimeConfig {
        workers: 2,
        task_capacity: 256,
        handoff_capacity: 256,
        chunk_capacity,
        hash_buckets: 4096,
        ..RuntimeConfig::default()
    };
    cfg.worldgen.seed = "render".into();
    cfg.worldgen.terrain.octaves = 3;
    Arc::new(WorldContext::init(&cfg).unwrap())
}

fn stream_until(
    r: &mut ChunkRenderer<HeadlessGpu>,
    mut done: impl FnMut(&ChunkRenderer<HeadlessGpu>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(300);
    while !done(r) {
        assert!(Instant::now() < deadline, "streaming did not settle");
        r.request_visible(16);
        r.upload_finished(32);
        std::thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn streams_the_radius_and_draws_opaque_before_translucent() {
    let ctx = context();
    ctx.set_load_center(8, 56, 8, 1);
    let mut r = ChunkRenderer::new(HeadlessGpu::new(), Arc::clone(&ctx), &RenderConfig::default());
    r.set_camera(Vec3::new(8.0, 56.0, 8.0), Vec3::new(20.0, 56.0, 8.0), 1.5, 1);
    stream_until(&mut r, |r| r.resident_meshes() == 27);
    assert_eq!(r.inflight(), 0);

    r.update();
    assert_eq!(r.gpu().view, r.camera().view());
    let stats = r.render();
    assert!(stats.drawn_opaque > 0);
    let draws = r.gpu_mut().take_draws();
    assert_eq!(draws.len(), stats.drawn_opaque + stats.drawn_translucent);
    let first_blend = draws
        .iter()
        .position(|d| d.pass == Pass::Translucent)
        .unwrap_or(draws.len());
    assert!(draws[first_blend..].iter().all(|d| d.pass == Pass::Translucent));

    assert_eq!(r.request_visible(16), 0);
}

#[test]
fn nothing_outside_the_radius_is_drawn() {
    let ctx = context();
    ctx.set_load_center(8, 56, 8, 1);
    let mut r = ChunkRenderer::new(HeadlessGpu::new(), Arc::clone(&ctx), &RenderConfig::default());
    r.set_camera(Vec3::new(8.0, 56.0, 8.0), Vec3::new(8.0, 56.0, 20.0), 1.0, 0);
    stream_until(&mut r, |r| r.is_meshed(ChunkCoord::new(0, 3, 0)));

    r.set_camera(Vec3::new(200.0, 56.0, 8.0), Vec3::new(220.0, 56.0, 8.0), 1.0, 0);
    let stats = r.render();
    assert_eq!(stats.drawn_opaque + stats.drawn_translucent, 0);
}

#[test]
fn stale_generation_is_not_uploaded() {
    let ctx = context();
    let mut r = ChunkRenderer::new(HeadlessGpu::new(), Arc::clone(&ctx), &RenderConfig::default());
    let mesh = MeshBuild {
        pos: vec![0.0; 12],
        norm: vec![0.0; 12],
        uv: vec![0.0; 8],
        idx: vec![0, 1, 2, 2, 3, 0],
    };
    ctx.handoff()
        .try_send(HandoffItem::Mesh(MeshUpload {
            handle: ChunkHandle {
                slot: 0,
                generation: 99,
            },
            coord: ChunkCoord::new(40, 0, 0),
            opaque: mesh,
            translucent: MeshBuild::default(),
        }))
        .unwrap();
    assert_eq!(r.upload_finished(4), 0);
    assert_eq!(r.gpu().uploads, 0);
    assert_eq!(r.resident_meshes(), 0);
}

#[test]
fn compaction_releases_retired_chunks() {
    let ctx = context();
    ctx.set_load_center(8, 56, 8, 0);
    let mut r = ChunkRenderer::new(HeadlessGpu::new(), Arc::clone(&ctx), &RenderConfig::default());
    r.set_camera(Vec3::new(8.0, 56.0, 8.0), Vec3::new(8.0, 56.0, 20.0), 1.0, 0);
    let coord = ChunkCoord::new(0, 3, 0);
    stream_until(&mut r, |r| r.is_meshed(coord));
    assert!(ctx.store().find(coord).is_some_and(|c| c.is_renderable()));

    let deadline = Instant::now() + Duration::from_secs(10);
    while ctx.unload(coord).is_err() {
        assert!(Instant::now() < deadline, "chunk stayed pinned");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(r.compact(), 1);
    assert_eq!(r.resident_meshes(), 0);
    assert_eq!(r.gpu().live_buffers(), 0);
    assert_eq!(r.gpu().uploads, r.gpu().releases);
}

#[test]
fn compaction_catches_retirements_that_were_never_reported() {
    let ctx = context_with_capacity(256);
    ctx.set_load_center(8, 56, 8, 0);
    let mut r = ChunkRenderer::new(HeadlessGpu::new(), Arc::clone(&ctx), &RenderConfig::default());
    r.set_camera(Vec3::new(8.0, 56.0, 8.0), Vec3::new(8.0, 56.0, 20.0), 1.0, 0);
    stream_until(&mut r, |r| r.is_meshed(ChunkCoord::new(0, 3, 0)));

    while ctx.pending_tasks() > 0 {
        std::thread::sleep(Duration::from_millis(5));
    }
    std::thread::sleep(Duration::from_millis(50));
    // Churn far away until the retired list has overflowed many times over.
    ctx.set_load_center(100_000, 56, 0, 0);
    for x in 0..600 {
        let _ = ctx.store().find_or_create(ChunkCoord::new(x, -50, 0));
    }
    r.compact();
    assert_eq!(r.resident_meshes(), 0);
    assert_eq!(r.gpu().live_buffers(), 0);
}
