use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::block::Block;
use super::face::Face;

/// Edge length of one atlas tile in pixels.
pub const TILE_PX: u32 = 16;

/// Normalized texture rectangle inside the atlas.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UvRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// Maps a texture id to its rectangle in an atlas of `atlas_w` x `atlas_h`
/// pixels laid out row-major in 16 px tiles.
pub fn get_cube_face(texture_id: u16, atlas_w: u32, atlas_h: u32) -> UvRect {
    get_cube_face_sized(texture_id, atlas_w, atlas_h, TILE_PX)
}

pub fn get_cube_face_sized(texture_id: u16, atlas_w: u32, atlas_h: u32, tile: u32) -> UvRect {
    let cols = (atlas_w / tile).max(1);
    let col = texture_id as u32 % cols;
    let row = texture_id as u32 / cols;
    let (w, h) = (atlas_w.max(1) as f32, atlas_h.max(1) as f32);
    let min = [(col * tile) as f32 / w, (row * tile) as f32 / h];
    let max = [((col + 1) * tile) as f32 / w, ((row + 1) * tile) as f32 / h];
    UvRect { min, max }
}

/// Texture ids per block and face (indexed by [`Face::index`]).
type FaceTable = [[u16; 6]; Block::STORABLE];

const fn uniform(id: u16) -> [u16; 6] {
    [id; 6]
}

// Face order: PosY, NegY, PosX, NegX, PosZ, NegZ.
const fn top_bottom_side(top: u16, bottom: u16, side: u16) -> [u16; 6] {
    [top, bottom, side, side, side, side]
}

const DEFAULT_FACES: FaceTable = [
    uniform(0),                 // null (never drawn)
    top_bottom_side(1, 0, 2),   // grass
    uniform(0),                 // dirt
    uniform(3),                 // stone
    uniform(4),                 // sand
    uniform(5),                 // planks
    uniform(6),                 // glass
    uniform(7),                 // water
    uniform(11),                // grass blades
    uniform(12),                // rose
    top_bottom_side(9, 9, 8),   // wood
    uniform(10),                // leaves
];

#[derive(Clone, Debug)]
pub struct TextureAtlas {
    pub width: u32,
    pub height: u32,
    pub tile: u32,
    faces: FaceTable,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self {
            width: default_atlas_size(),
            height: default_atlas_size(),
            tile: TILE_PX,
            faces: DEFAULT_FACES,
        }
    }
}

impl TextureAtlas {
    #[inline]
    pub fn texture_id(&self, block: Block, face: Face) -> u16 {
        self.faces
            .get(block as usize)
            .map(|f| f[face.index()])
            .unwrap_or(0)
    }

    #[inline]
    pub fn uv(&self, block: Block, face: Face) -> UvRect {
        get_cube_face_sized(self.texture_id(block, face), self.width, self.height, self.tile)
    }

    pub fn from_config(cfg: &AtlasConfig) -> Result<Self, Box<dyn Error>> {
        let mut atlas = TextureAtlas {
            width: cfg.width,
            height: cfg.height,
            tile: cfg.tile,
            faces: DEFAULT_FACES,
        };
        if atlas.tile == 0 || atlas.width < atlas.tile || atlas.height < atlas.tile {
            return Err(format!(
                "atlas {}x{} cannot hold {} px tiles",
                atlas.width, atlas.height, atlas.tile
            )
            .into());
        }
        // Sorted so a malformed file always reports the same offending key.
        let mut overrides: Vec<(&String, &FaceTextures)> = cfg.faces.iter().collect();
        overrides.sort_by(|a, b| a.0.cmp(b.0));
        for (name, tex) in overrides {
            let block = Block::from_name(name).ok_or_else(|| format!("unknown block '{name}'"))?;
            atlas.faces[block as usize] = tex.expand();
        }
        Ok(atlas)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: AtlasConfig = toml::from_str(toml_str)?;
        Self::from_config(&cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

#[derive(Clone, Debug, Deserialize)]
pub struct AtlasConfig {
    #[serde(default = "default_atlas_size")]
    pub width: u32,
    #[serde(default = "default_atlas_size")]
    pub height: u32,
    #[serde(default = "default_tile")]
    pub tile: u32,
    #[serde(default)]
    pub faces: HashMap<String, FaceTextures>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: default_atlas_size(),
            height: default_atlas_size(),
            tile: default_tile(),
            faces: HashMap::new(),
        }
    }
}

fn default_atlas_size() -> u32 {
    256
}
fn default_tile() -> u32 {
    TILE_PX
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum FaceTextures {
    // grass = 3
    All(u16),
    // wood = { top = 9, bottom = 9, side = 8 }
    Split { top: u16, bottom: u16, side: u16 },
}

impl FaceTextures {
    fn expand(&self) -> [u16; 6] {
        match *self {
            FaceTextures::All(id) => uniform(id),
            FaceTextures::Split { top, bottom, side } => top_bottom_side(top, bottom, side),
        }
    }
}
