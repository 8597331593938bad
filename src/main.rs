mod app;
mod config;
mod player;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use crate::app::App;
use crate::config::{AppConfig, load_app_config_from_path};

#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Headless voxel world streaming session")]
struct Args {
    /// Session config (TOML). Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// World seed string
    #[arg(long)]
    seed: Option<String>,
    /// Load and draw radius in chunks
    #[arg(long)]
    radius: Option<i32>,
    /// Generation and meshing worker threads
    #[arg(long)]
    workers: Option<usize>,
    /// Frames to simulate before exiting
    #[arg(long)]
    frames: Option<u32>,
    /// Walker speed in blocks per second
    #[arg(long)]
    walk_speed: Option<f32>,
}

impl Args {
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(seed) = &self.seed {
            cfg.runtime.worldgen.seed = seed.clone();
        }
        if let Some(r) = self.radius {
            cfg.session.radius = r.max(0);
        }
        if let Some(w) = self.workers {
            cfg.runtime.workers = w.max(1);
        }
        if let Some(f) = self.frames {
            cfg.session.frames = f;
        }
        if let Some(s) = self.walk_speed {
            cfg.session.walk_speed = s;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => load_app_config_from_path(path)?,
        None => AppConfig::default(),
    };
    args.apply(&mut cfg);
    log::info!(
        "seed '{}', radius {}, {} workers, {} frames",
        cfg.runtime.worldgen.seed,
        cfg.session.radius,
        cfg.runtime.workers,
        cfg.session.frames
    );

    let mut app = App::new(cfg)?;
    app.run();
    app.shutdown();
    Ok(())
}
