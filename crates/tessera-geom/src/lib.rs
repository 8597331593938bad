//! Minimal geometry types shared by the streamer crates: vectors, boxes and
//! box-vs-box contact resolution.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self / len } else { self }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn axis(self, i: usize) -> f32 {
        match i {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[inline]
    pub fn with_axis(self, i: usize, v: f32) -> Vec3 {
        match i {
            0 => Vec3::new(v, self.y, self.z),
            1 => Vec3::new(self.x, v, self.z),
            _ => Vec3::new(self.x, self.y, v),
        }
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(v: [f32; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `center - half ..= center + half`.
    #[inline]
    pub fn from_center(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) / 2.0
    }

    #[inline]
    pub fn translated(&self, by: Vec3) -> Aabb {
        Aabb::new(self.min + by, self.max + by)
    }

    /// Unit cube occupied by the voxel at integer coordinates.
    #[inline]
    pub fn voxel(x: i32, y: i32, z: i32) -> Aabb {
        let min = Vec3::new(x as f32, y as f32, z as f32);
        Aabb::new(min, min + Vec3::ONE)
    }
}

/// Result of [`collide`]: moving the first box by `-penetration` separates it
/// from the second. `normal` points from the second box towards the first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub penetration: Vec3,
    pub normal: Vec3,
}

/// Overlap test between two boxes returning the minimum translation vector.
/// Touching boxes report a zero-length penetration.
pub fn collide(a: &Aabb, b: &Aabb) -> Option<Contact> {
    // Minkowski difference a - b; the origin lies inside iff the boxes overlap.
    let lo = a.min - b.max;
    let hi = a.max - b.min;
    for i in 0..3 {
        if lo.axis(i) > 0.0 || hi.axis(i) < 0.0 {
            return None;
        }
    }

    let mut best_axis = 0;
    let mut best = lo.x;
    for i in 0..3 {
        for cand in [lo.axis(i), hi.axis(i)] {
            if cand.abs() < best.abs() {
                best = cand;
                best_axis = i;
            }
        }
    }

    let penetration = Vec3::ZERO.with_axis(best_axis, best);
    let sign = if best < 0.0 {
        1.0
    } else if best > 0.0 {
        -1.0
    } else {
        0.0
    };
    Some(Contact {
        penetration,
        normal: Vec3::ZERO.with_axis(best_axis, sign),
    })
}
