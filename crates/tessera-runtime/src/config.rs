use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tessera_world::WorldGenConfig;

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_task_capacity")]
    pub task_capacity: usize,
    #[serde(default = "default_handoff_capacity")]
    pub handoff_capacity: usize,
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,
    #[serde(default = "default_hash_buckets")]
    pub hash_buckets: usize,
    /// Atlas layout TOML; the built-in layout when absent.
    #[serde(default)]
    pub atlas: Option<PathBuf>,
    #[serde(default)]
    pub worldgen: WorldGenConfig,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(2)
}
fn default_task_capacity() -> usize {
    4096
}
fn default_handoff_capacity() -> usize {
    1024
}
fn default_chunk_capacity() -> usize {
    4096
}
fn default_hash_buckets() -> usize {
    65536
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            task_capacity: default_task_capacity(),
            handoff_capacity: default_handoff_capacity(),
            chunk_capacity: default_chunk_capacity(),
            hash_buckets: default_hash_buckets(),
            atlas: None,
            worldgen: WorldGenConfig::default(),
        }
    }
}

pub fn load_runtime_config_from_path(path: &Path) -> Result<RuntimeConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: RuntimeConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_worldgen_table() {
        let cfg: RuntimeConfig = toml::from_str(
            r#"
            workers = 3
            chunk_capacity = 512

            [worldgen]
            seed = "abc"

            [worldgen.decoration]
            tree_per_mille = 20
            "#,
        )
        .unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.chunk_capacity, 512);
        assert_eq!(cfg.task_capacity, 4096);
        assert_eq!(cfg.worldgen.seed, "abc");
        assert_eq!(cfg.worldgen.decoration.tree_per_mille, 20);
        assert_eq!(cfg.worldgen.surface.depth, 3);
    }
}
