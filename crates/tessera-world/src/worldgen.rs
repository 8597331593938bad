use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use tessera_chunk::CHUNK_SIZE;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_seed")]
    pub seed: String,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub decoration: Decoration,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            terrain: Terrain::default(),
            surface: Surface::default(),
            decoration: Decoration::default(),
        }
    }
}

fn default_seed() -> String {
    "tessera".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    #[serde(default = "default_ground_height")]
    pub ground_height: i32,
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
    /// World-to-noise scale of the first octave pair.
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// How strongly height above the heightmap pushes density negative.
    #[serde(default = "default_falloff")]
    pub falloff: f32,
    /// `[noise, height offset from ground_height]` pairs, ascending by noise.
    #[serde(default = "default_height_spline")]
    pub height_spline: Vec<[f32; 2]>,
}
fn default_ground_height() -> i32 {
    64
}
fn default_sea_level() -> i32 {
    60
}
fn default_noise_scale() -> f32 {
    0.0625 / CHUNK_SIZE as f32
}
fn default_octaves() -> u32 {
    8
}
fn default_falloff() -> f32 {
    2.25
}
fn default_height_spline() -> Vec<[f32; 2]> {
    vec![
        [-1.0, -20.0],
        [-0.5, -10.0],
        [-0.4, -2.0],
        [0.4, 2.0],
        [0.6, 10.0],
        [0.95, 15.0],
    ]
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            ground_height: default_ground_height(),
            sea_level: default_sea_level(),
            noise_scale: default_noise_scale(),
            octaves: default_octaves(),
            falloff: default_falloff(),
            height_spline: default_height_spline(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    /// Dirt layers below the top block.
    #[serde(default = "default_surface_depth")]
    pub depth: i32,
    /// Columns whose top is at most this far above sea level become sand.
    #[serde(default = "default_beach_height")]
    pub beach_height: i32,
}
fn default_surface_depth() -> i32 {
    3
}
fn default_beach_height() -> i32 {
    2
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            depth: default_surface_depth(),
            beach_height: default_beach_height(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Decoration {
    #[serde(default = "default_tree_per_mille")]
    pub tree_per_mille: u32,
    #[serde(default = "default_flora_per_mille")]
    pub flora_per_mille: u32,
    #[serde(default = "default_trunk_min")]
    pub trunk_min: i32,
    #[serde(default = "default_trunk_max")]
    pub trunk_max: i32,
    #[serde(default = "default_leaf_radius")]
    pub leaf_radius: i32,
}
fn default_tree_per_mille() -> u32 {
    8
}
fn default_flora_per_mille() -> u32 {
    80
}
fn default_trunk_min() -> i32 {
    4
}
fn default_trunk_max() -> i32 {
    6
}
fn default_leaf_radius() -> i32 {
    2
}
impl Default for Decoration {
    fn default() -> Self {
        Self {
            tree_per_mille: default_tree_per_mille(),
            flora_per_mille: default_flora_per_mille(),
            trunk_min: default_trunk_min(),
            trunk_max: default_trunk_max(),
            leaf_radius: default_leaf_radius(),
        }
    }
}

/// Resolved, range-checked parameters consumed by the stage functions.
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub seed: String,
    pub ground_height: i32,
    pub sea_level: i32,
    pub noise_scale: f32,
    pub octaves: u32,
    pub falloff: f32,
    pub height_spline: Vec<(f32, f32)>,
    pub surface_depth: i32,
    pub beach_height: i32,
    pub tree_per_mille: u32,
    pub flora_per_mille: u32,
    pub trunk_min: i32,
    pub trunk_max: i32,
    pub leaf_radius: i32,
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        let s = CHUNK_SIZE as i32;
        let mut spline: Vec<(f32, f32)> = cfg
            .terrain
            .height_spline
            .iter()
            .map(|p| (p[0], cfg.terrain.ground_height as f32 + p[1]))
            .collect();
        spline.sort_by(|a, b| a.0.total_cmp(&b.0));
        if spline.is_empty() {
            spline.push((0.0, cfg.terrain.ground_height as f32));
        }
        let deco = &cfg.decoration;
        // Structures must fit in the neighbor ring decoration reads.
        // Canopies always reach one voxel past the trunk.
        let leaf_radius = deco.leaf_radius.clamp(1, s - 1);
        let trunk_min = deco.trunk_min.clamp(1, s - 3);
        let trunk_max = deco.trunk_max.clamp(trunk_min, s - 3);
        Self {
            seed: cfg.seed.clone(),
            ground_height: cfg.terrain.ground_height.max(1),
            sea_level: cfg.terrain.sea_level,
            noise_scale: cfg.terrain.noise_scale,
            octaves: cfg.terrain.octaves.clamp(1, 16),
            falloff: cfg.terrain.falloff,
            height_spline: spline,
            surface_depth: cfg.surface.depth.clamp(0, s - 2),
            beach_height: cfg.surface.beach_height,
            tree_per_mille: deco.tree_per_mille.min(1000),
            flora_per_mille: deco.flora_per_mille.min(1000),
            trunk_min,
            trunk_max,
            leaf_radius,
        }
    }

    /// Highest a structure reaches above its root voxel.
    #[inline]
    pub fn structure_height(&self) -> i32 {
        self.trunk_max + 1
    }
}

impl Default for WorldGenParams {
    fn default() -> Self {
        Self::from_config(&WorldGenConfig::default())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    Ok(cfg)
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenParams, Box<dyn Error>> {
    Ok(WorldGenParams::from_config(&load_config_from_path(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: WorldGenConfig = toml::from_str(
            r#"
            seed = "abc"
            [terrain]
            sea_level = 12
            [decoration]
            trunk_max = 99
        "#,
        )
        .unwrap();
        let p = WorldGenParams::from_config(&cfg);
        assert_eq!(p.seed, "abc");
        assert_eq!(p.sea_level, 12);
        assert_eq!(p.ground_height, 64);
        assert_eq!(p.surface_depth, 3);
        assert_eq!(p.trunk_max, CHUNK_SIZE as i32 - 3);
        assert_eq!(p.height_spline.first(), Some(&(-1.0, 44.0)));
    }

    #[test]
    fn leaf_radius_is_at_least_one() {
        let mut cfg = WorldGenConfig::default();
        cfg.decoration.leaf_radius = 0;
        assert_eq!(WorldGenParams::from_config(&cfg).leaf_radius, 1);
        cfg.decoration.leaf_radius = -3;
        assert_eq!(WorldGenParams::from_config(&cfg).leaf_radius, 1);
    }
}
