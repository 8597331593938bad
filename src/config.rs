use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use tessera_render::RenderConfig;
use tessera_runtime::RuntimeConfig;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    /// Load and draw radius, in chunks.
    #[serde(default = "default_radius")]
    pub radius: i32,
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    #[serde(default = "default_aspect")]
    pub aspect: f32,
    #[serde(default)]
    pub spawn_x: i32,
    #[serde(default)]
    pub spawn_z: i32,
    /// Walking direction in degrees around +Y, 0 being +X.
    #[serde(default)]
    pub heading: f32,
}

fn default_radius() -> i32 {
    4
}
fn default_frames() -> u32 {
    600
}
fn default_walk_speed() -> f32 {
    4.3
}
fn default_aspect() -> f32 {
    16.0 / 9.0
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            frames: default_frames(),
            walk_speed: default_walk_speed(),
            aspect: default_aspect(),
            spawn_x: 0,
            spawn_z: 0,
            heading: 0.0,
        }
    }
}

pub fn load_app_config_from_path(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_parses() {
        let cfg: AppConfig = toml::from_str(include_str!("../config/tessera.toml")).unwrap();
        assert!(cfg.session.radius > 0);
        assert!(cfg.runtime.chunk_capacity > 0);
        assert!(!cfg.runtime.worldgen.seed.is_empty());
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.session.frames, 600);
        assert_eq!(cfg.render.upload_budget, 32);
        assert_eq!(cfg.runtime.hash_buckets, 65536);
    }
}
