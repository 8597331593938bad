/// Voxel content. Stored as its `u8` id; `Null` (0) is air.
///
/// `Unloaded` is only ever returned by queries that could not resolve a
/// chunk. It never appears in a chunk's block array.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Block {
    #[default]
    Null = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Sand = 4,
    Planks = 5,
    Glass = 6,
    Water = 7,
    GrassBlades = 8,
    Rose = 9,
    Wood = 10,
    Leaves = 11,
    Unloaded = 255,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BlockProperties {
    /// Faces of neighbors next to this block are visible.
    pub is_transparent: bool,
    /// No collision.
    pub is_ghost: bool,
    /// Decoration may overwrite it.
    pub replaceable: bool,
}

const fn props(is_transparent: bool, is_ghost: bool, replaceable: bool) -> BlockProperties {
    BlockProperties {
        is_transparent,
        is_ghost,
        replaceable,
    }
}

/// Indexed by block id for every storable block.
static PROPERTIES: [BlockProperties; Block::STORABLE] = [
    props(true, true, true),    // null
    props(false, false, false), // grass
    props(false, false, false), // dirt
    props(false, false, false), // stone
    props(false, false, false), // sand
    props(false, false, false), // planks
    props(true, false, false),  // glass
    props(true, true, false),   // water
    props(true, true, true),    // grass blades
    props(true, true, true),    // rose
    props(false, false, false), // wood
    props(true, false, false),  // leaves
];

// Unresolved chunks cull and collide like an opaque solid.
const UNLOADED_PROPERTIES: BlockProperties = props(false, false, false);

impl Block {
    /// Number of block ids that may be stored in a chunk.
    pub const STORABLE: usize = 12;

    pub const ALL: [Block; Block::STORABLE] = [
        Block::Null,
        Block::Grass,
        Block::Dirt,
        Block::Stone,
        Block::Sand,
        Block::Planks,
        Block::Glass,
        Block::Water,
        Block::GrassBlades,
        Block::Rose,
        Block::Wood,
        Block::Leaves,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Decodes a stored id. Unknown ids (including `Unloaded`) yield `None`.
    #[inline]
    pub fn from_id(id: u8) -> Option<Block> {
        Block::ALL.get(id as usize).copied()
    }

    #[inline]
    pub fn props(self) -> BlockProperties {
        PROPERTIES
            .get(self as usize)
            .copied()
            .unwrap_or(UNLOADED_PROPERTIES)
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self == Block::Null
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.props().is_transparent
    }

    #[inline]
    pub fn is_ghost(self) -> bool {
        self.props().is_ghost
    }

    #[inline]
    pub fn is_replaceable(self) -> bool {
        self.props().replaceable
    }

    #[inline]
    pub fn is_water(self) -> bool {
        self == Block::Water
    }

    /// Blocks drawn as a crossed pair of quads instead of a culled cube.
    #[inline]
    pub fn is_flora(self) -> bool {
        matches!(self, Block::GrassBlades | Block::Rose)
    }

    pub fn name(self) -> &'static str {
        match self {
            Block::Null => "null",
            Block::Grass => "grass",
            Block::Dirt => "dirt",
            Block::Stone => "stone",
            Block::Sand => "sand",
            Block::Planks => "planks",
            Block::Glass => "glass",
            Block::Water => "water",
            Block::GrassBlades => "grass_blades",
            Block::Rose => "rose",
            Block::Wood => "wood",
            Block::Leaves => "leaves",
            Block::Unloaded => "unloaded",
        }
    }

    pub fn from_name(name: &str) -> Option<Block> {
        Block::ALL.iter().copied().find(|b| b.name() == name)
    }
}
