use tessera_blocks::{Face, UvRect};
use tessera_geom::Vec3;

/// How far the water surface sits below the top of its cell.
pub const WATER_OFFSET: f32 = 0.1;

#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
}

// Unit-cube corners per face, counter-clockwise seen from outside, in
// `Face` index order. Corner `a` maps to the bottom-left of the texture.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // PosY
    [[1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
    // NegY
    [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    // PosX
    [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
    // NegX
    [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    // PosZ
    [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    // NegZ
    [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
];

const CROSS_QUADS: [[[f32; 3]; 4]; 2] = [
    [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
];

#[inline]
fn rect_uvs(r: UvRect) -> [[f32; 2]; 4] {
    [
        [r.min[0], r.max[1]],
        [r.max[0], r.max[1]],
        [r.max[0], r.min[1]],
        [r.min[0], r.min[1]],
    ]
}

impl MeshBuild {
    /// Clears all arrays but retains capacity for reuse.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad (two triangles `a b c`, `c d a`) with explicit per-vertex UVs.
    pub fn add_quad_uv(&mut self, corners: [Vec3; 4], n: Vec3, uvs: [[f32; 2]; 4]) {
        let base = self.vertex_count() as u32;
        for (p, uv) in corners.iter().zip(uvs.iter()) {
            self.pos.extend_from_slice(&[p.x, p.y, p.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(uv);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Emits the unit face of the voxel at `origin`. A non-zero `top_drop`
    /// lowers every corner on the top edge of the cell.
    pub fn add_cube_face(&mut self, face: Face, origin: Vec3, uv: UvRect, top_drop: f32) {
        let corners = FACE_CORNERS[face.index()].map(|c| {
            let y = if c[1] > 0.5 { c[1] - top_drop } else { c[1] };
            origin + Vec3::new(c[0], y, c[2])
        });
        self.add_quad_uv(corners, Vec3::from(face.normal()), rect_uvs(uv));
    }

    /// Emits the two diagonal quads used by flora.
    pub fn add_cross(&mut self, origin: Vec3, uv: UvRect) {
        for (i, quad) in CROSS_QUADS.iter().enumerate() {
            let corners = quad.map(|c| origin + Vec3::new(c[0], c[1], c[2]));
            let n = if i == 0 {
                Vec3::new(0.70710677, 0.0, -0.70710677)
            } else {
                Vec3::new(-0.70710677, 0.0, -0.70710677)
            };
            self.add_quad_uv(corners, n, rect_uvs(uv));
        }
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
}
