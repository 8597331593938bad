use std::sync::Arc;

use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::seed::WorldSeeds;
use crate::worldgen::WorldGenParams;

/// Fixed-point scale of the stored density layer.
pub const DENSITY_ONE: f32 = 256.0;

#[inline]
pub fn density_to_fixed(d: f32) -> i16 {
    (d * DENSITY_ONE).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Noise state for one stage invocation. Cheap to build; not shared
/// between threads.
pub struct GenCtx {
    pub height: FastNoiseLite,
    pub density: FastNoiseLite,
    pub params: Arc<WorldGenParams>,
    pub seeds: WorldSeeds,
}

impl GenCtx {
    pub fn new(params: Arc<WorldGenParams>, seeds: WorldSeeds) -> Self {
        let mut height = FastNoiseLite::with_seed(seeds.heightmap as i32);
        height.set_noise_type(Some(NoiseType::OpenSimplex2));
        height.set_frequency(Some(1.0));
        let mut density = FastNoiseLite::with_seed(seeds.density as i32);
        density.set_noise_type(Some(NoiseType::OpenSimplex2));
        density.set_frequency(Some(1.0));
        Self {
            height,
            density,
            params,
            seeds,
        }
    }

    /// Sum of octaves with amplitude and frequency multiplier starting at 4
    /// and halving each octave.
    pub fn octaved2(&self, x: f32, z: f32) -> f32 {
        let s = self.params.noise_scale;
        let mut a = 4.0f32;
        let mut r = 0.0f32;
        for _ in 0..self.params.octaves {
            r += self.height.get_noise_2d(x * a * s, z * a * s) * a;
            a *= 0.5;
        }
        r / 4.0
    }

    pub fn octaved3(&self, x: f32, y: f32, z: f32) -> f32 {
        let s = self.params.noise_scale;
        let mut a = 4.0f32;
        let mut r = 0.0f32;
        for _ in 0..self.params.octaves {
            r += self.density.get_noise_3d(x * a * s, y * a * s, z * a * s) * a;
            a *= 0.5;
        }
        r / 4.0
    }

    /// Terrain height of a column, from the height spline.
    pub fn height(&self, x: i32, z: i32) -> f32 {
        spline(self.octaved2(x as f32, z as f32), &self.params.height_spline)
    }

    /// Density at a voxel given its column height. Positive is solid.
    pub fn density(&self, x: i32, y: i32, z: i32, height: f32) -> f32 {
        let p = &self.params;
        self.octaved3(x as f32, y as f32, z as f32)
            + (height - y as f32) * p.falloff / p.ground_height as f32
    }
}

/// Piecewise-linear interpolation through ascending `(x, y)` points,
/// clamped to the end points.
pub fn spline(v: f32, points: &[(f32, f32)]) -> f32 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if v <= first.0 {
        return first.1;
    }
    if v >= last.0 {
        return last.1;
    }
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if v >= a.0 && v <= b.0 {
            let span = b.0 - a.0;
            if span <= f32::EPSILON {
                return b.1;
            }
            return a.1 + (v - a.0) * (b.1 - a.1) / span;
        }
    }
    last.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spline_interpolates_and_clamps() {
        let pts = [(-1.0, 44.0), (0.0, 64.0), (1.0, 84.0)];
        assert_eq!(spline(-5.0, &pts), 44.0);
        assert_eq!(spline(5.0, &pts), 84.0);
        assert!((spline(0.5, &pts) - 74.0).abs() < 1e-4);
        assert_eq!(spline(0.0, &pts), 64.0);
    }

    #[test]
    fn fixed_point_saturates() {
        assert_eq!(density_to_fixed(1.0), 256);
        assert_eq!(density_to_fixed(-0.5), -128);
        assert_eq!(density_to_fixed(1.0e6), i16::MAX);
    }

    #[test]
    fn density_falls_with_altitude() {
        let ctx = GenCtx::new(
            Arc::new(WorldGenParams::default()),
            WorldSeeds::from_seed("t"),
        );
        let h = ctx.height(10, 10);
        assert!(ctx.density(10, -400, 10, h) > 0.0);
        assert!(ctx.density(10, 600, 10, h) < 0.0);
    }
}
