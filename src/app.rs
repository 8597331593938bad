use std::error::Error;
use std::sync::Arc;

use tessera_blocks::Block;
use tessera_geom::Vec3;
use tessera_render::{ChunkRenderer, FrameStats, HeadlessGpu};
use tessera_runtime::WorldContext;

use crate::config::AppConfig;
use crate::player::Walker;

const DT: f32 = 1.0 / 60.0;
/// Frames of no horizontal progress before the walker digs ahead.
const DIG_AFTER: u32 = 30;
const REACH: f32 = 4.0;

/// A headless streaming session: a walker wanders through the world while
/// the renderer keeps the chunks around it generated, meshed and uploaded.
pub struct App {
    ctx: Arc<WorldContext>,
    renderer: ChunkRenderer<HeadlessGpu>,
    walker: Walker,
    cfg: AppConfig,
    heading: Vec3,
    frame: u64,
    blocked_frames: u32,
    dug: u32,
    last: FrameStats,
}

impl App {
    pub fn new(cfg: AppConfig) -> Result<Self, Box<dyn Error>> {
        let ctx = Arc::new(WorldContext::init(&cfg.runtime)?);
        let renderer = ChunkRenderer::new(HeadlessGpu::default(), ctx.clone(), &cfg.render);

        let (sx, sz) = (cfg.session.spawn_x, cfg.session.spawn_z);
        let ground = ctx.world().params().ground_height;
        ctx.set_load_center(sx, ground, sz, cfg.session.radius);
        let spawn = find_spawn(&ctx, sx, sz, ground);
        log::info!("spawning at ({:.1}, {:.1}, {:.1})", spawn.x, spawn.y, spawn.z);

        let mut walker = Walker::new(spawn);
        walker.speed = cfg.session.walk_speed;
        let rad = cfg.session.heading.to_radians();
        Ok(Self {
            ctx,
            renderer,
            walker,
            heading: Vec3::new(rad.cos(), 0.0, rad.sin()),
            cfg,
            frame: 0,
            blocked_frames: 0,
            dug: 0,
            last: FrameStats::default(),
        })
    }

    pub fn run(&mut self) {
        for _ in 0..self.cfg.session.frames {
            self.step();
        }
        log::info!(
            "done after {} frames: {} meshes resident, {} blocks dug, walker at ({:.1}, {:.1}, {:.1})",
            self.frame,
            self.last.resident_meshes,
            self.dug,
            self.walker.pos.x,
            self.walker.pos.y,
            self.walker.pos.z
        );
    }

    pub fn step(&mut self) {
        let radius = self.cfg.session.radius;
        let before = self.walker.pos;
        let jump = self.blocked_frames > 0;
        {
            let ctx = &self.ctx;
            let query = |x: i32, y: i32, z: i32| ctx.get_block(x, y, z);
            self.walker.update(&query, DT, self.heading, jump);
        }
        let progress = Vec3::new(self.walker.pos.x - before.x, 0.0, self.walker.pos.z - before.z);
        if progress.length() < self.walker.speed * DT * 0.1 {
            self.blocked_frames += 1;
        } else {
            self.blocked_frames = 0;
        }
        if self.blocked_frames > DIG_AFTER {
            self.dig_ahead();
            self.blocked_frames = 0;
        }

        let p = self.walker.pos;
        self.ctx
            .set_load_center(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32, radius);
        self.ctx.flush_backlog();

        let eye = self.walker.eye_position();
        let look = eye + self.heading;
        self.renderer.set_camera(
            glam::Vec3::new(eye.x, eye.y, eye.z),
            glam::Vec3::new(look.x, look.y, look.z),
            self.cfg.session.aspect,
            radius,
        );
        let uploaded = self.renderer.upload_finished(self.cfg.render.upload_budget);
        let requested = self.renderer.request_visible(self.cfg.render.request_budget);
        self.renderer.update();
        self.last = self.renderer.render();
        // Nothing is presented headless; drop the recorded draw list.
        self.renderer.gpu_mut().take_draws();

        if self.frame % 60 == 0 {
            let store = self.ctx.store().stats();
            log::info!(
                "frame {}: {} opaque + {} translucent draws, {} meshes, {} inflight, {}/{} chunks resident",
                self.frame,
                self.last.drawn_opaque,
                self.last.drawn_translucent,
                self.last.resident_meshes,
                self.last.inflight,
                store.resident,
                store.capacity
            );
        }
        log::debug!("frame {}: uploaded {uploaded}, requested {requested}", self.frame);
        self.frame += 1;
    }

    /// Clears the first solid block in front of the walker's eyes.
    fn dig_ahead(&mut self) {
        let mut ray = self.ctx.begin_raycast(self.walker.eye_position(), self.heading, REACH);
        let mut target = None;
        if self.ctx.raycast(&mut ray) {
            target = Some(ray.voxel);
        } else {
            // Nothing at eye level; try the step in front of the feet.
            let feet = self.walker.pos + Vec3::new(0.0, 0.5, 0.0);
            let mut low = self.ctx.begin_raycast(feet, self.heading, REACH);
            if self.ctx.raycast(&mut low) {
                target = Some(low.voxel);
            }
        }
        let Some([x, y, z]) = target else {
            return;
        };
        match self.ctx.set_block(x, y, z, Block::Null) {
            Ok(()) => {
                self.dug += 1;
                log::debug!("dug ({x}, {y}, {z})");
            }
            Err(err) => log::warn!("could not dig ({x}, {y}, {z}): {err}"),
        }
    }

    pub fn shutdown(&mut self) {
        self.renderer.clear();
        self.ctx.shutdown();
    }
}

/// Casts straight down from above the terrain to find a standing spot.
fn find_spawn(ctx: &WorldContext, x: i32, z: i32, ground: i32) -> Vec3 {
    let top = Vec3::new(x as f32 + 0.5, (ground + 32) as f32, z as f32 + 0.5);
    let mut ray = ctx.begin_raycast(top, Vec3::new(0.0, -1.0, 0.0), 96.0);
    while ctx.raycast(&mut ray) {
        if !ray.block.is_ghost() {
            return Vec3::new(top.x, (ray.voxel[1] + 1) as f32, top.z);
        }
    }
    Vec3::new(top.x, (ground + 2) as f32, top.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_session_streams_and_shuts_down() {
        let mut cfg = AppConfig::default();
        cfg.runtime.workers = 2;
        cfg.runtime.chunk_capacity = 512;
        cfg.runtime.hash_buckets = 1024;
        cfg.runtime.worldgen.seed = "session".into();
        cfg.runtime.worldgen.terrain.octaves = 3;
        cfg.session.radius = 1;
        cfg.session.frames = 90;

        let mut app = App::new(cfg).unwrap();
        app.run();
        assert_eq!(app.frame, 90);
        assert!(app.walker.pos.x.is_finite() && app.walker.pos.z.is_finite());
        app.shutdown();
        assert!(app.ctx.is_shutdown());
        assert_eq!(app.renderer.resident_meshes(), 0);
    }
}
