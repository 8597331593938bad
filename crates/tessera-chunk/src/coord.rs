use tessera_blocks::Face;

use crate::{CHUNK_BITS, CHUNK_SIZE};

/// Chunk grid coordinate. The chunk covers world voxels
/// `coord * CHUNK_SIZE .. (coord + 1) * CHUNK_SIZE` on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    /// Chunk containing the world voxel `(x, y, z)`.
    #[inline]
    pub const fn from_world(x: i32, y: i32, z: i32) -> Self {
        Self::new(x >> CHUNK_BITS, y >> CHUNK_BITS, z >> CHUNK_BITS)
    }

    /// Chunk-local coordinates of a world voxel.
    #[inline]
    pub const fn local(x: i32, y: i32, z: i32) -> (usize, usize, usize) {
        let m = CHUNK_SIZE as i32 - 1;
        ((x & m) as usize, (y & m) as usize, (z & m) as usize)
    }

    /// World coordinates of the chunk's minimum corner.
    #[inline]
    pub const fn origin(self) -> (i32, i32, i32) {
        (
            self.cx << CHUNK_BITS,
            self.cy << CHUNK_BITS,
            self.cz << CHUNK_BITS,
        )
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// Face-adjacent chunk.
    #[inline]
    pub fn step(self, face: Face) -> Self {
        let (dx, dy, dz) = face.delta();
        self.offset(dx, dy, dz)
    }

    /// Chebyshev (max-axis) distance in chunks.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        let dx = (self.cx - other.cx).abs();
        let dy = (self.cy - other.cy).abs();
        let dz = (self.cz - other.cz).abs();
        dx.max(dy).max(dz)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.cx, self.cy, self.cz)
    }
}
