//! Voxel traversal (Amanatides and Woo). A cast is resumable: after a hit,
//! calling [`RaycastState::step`] again continues past the hit voxel.

use tessera_blocks::{Block, Face};
use tessera_geom::Vec3;

/// Block lookup used by traversal.
pub trait BlockQuery {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Block;
}

impl<F> BlockQuery for F
where
    F: Fn(i32, i32, i32) -> Block,
{
    fn block_at(&self, x: i32, y: i32, z: i32) -> Block {
        self(x, y, z)
    }
}

#[derive(Clone, Debug)]
pub struct RaycastState {
    pub origin: Vec3,
    pub dir: Vec3,
    pub max_distance: f32,
    /// Voxel currently under test.
    pub voxel: [i32; 3],
    /// Distance along the ray at which `voxel` was entered.
    pub distance: f32,
    /// Face of `voxel` the ray crossed to enter it. `None` for the start voxel.
    pub face: Option<Face>,
    /// Block found at the last hit.
    pub block: Block,
    pub steps: u32,
    step: [i32; 3],
    t_max: [f32; 3],
    t_delta: [f32; 3],
    test_current: bool,
}

pub fn begin_raycast(origin: Vec3, dir: Vec3, max_distance: f32) -> RaycastState {
    let dir = dir.normalized();
    let mut voxel = [0i32; 3];
    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    for i in 0..3 {
        let o = origin.axis(i);
        let d = dir.axis(i);
        let v = o.floor();
        voxel[i] = v as i32;
        if d > 0.0 {
            step[i] = 1;
            t_delta[i] = 1.0 / d;
            t_max[i] = (v + 1.0 - o) / d;
        } else if d < 0.0 {
            step[i] = -1;
            t_delta[i] = -1.0 / d;
            t_max[i] = (o - v) / -d;
        }
    }
    RaycastState {
        origin,
        dir,
        max_distance,
        voxel,
        distance: 0.0,
        face: None,
        block: Block::Null,
        steps: 0,
        step,
        t_max,
        t_delta,
        test_current: true,
    }
}

#[inline]
fn is_hit(block: Block) -> bool {
    !block.is_air() && block != Block::Unloaded
}

impl RaycastState {
    /// Advances to the next non-air voxel. Returns false once the ray runs
    /// past `max_distance`; the state then stays exhausted.
    pub fn step<Q: BlockQuery + ?Sized>(&mut self, world: &Q) -> bool {
        if self.test_current {
            self.test_current = false;
            let [x, y, z] = self.voxel;
            let block = world.block_at(x, y, z);
            if is_hit(block) {
                self.block = block;
                return true;
            }
        }
        loop {
            let t = &self.t_max;
            let axis = if t[0] < t[1] && t[0] < t[2] {
                0
            } else if t[1] < t[2] {
                1
            } else {
                2
            };
            if self.t_max[axis] > self.max_distance {
                return false;
            }
            self.voxel[axis] += self.step[axis];
            self.distance = self.t_max[axis];
            self.t_max[axis] += self.t_delta[axis];
            self.face = Some(Face::entered_from(axis, self.step[axis]));
            self.steps += 1;
            let [x, y, z] = self.voxel;
            let block = world.block_at(x, y, z);
            if is_hit(block) {
                self.block = block;
                return true;
            }
        }
    }

    /// World position where the ray entered the current voxel.
    pub fn hit_point(&self) -> Vec3 {
        self.origin + self.dir * self.distance
    }

    /// Voxel in front of the entered face, where a placed block would go.
    pub fn adjacent(&self) -> [i32; 3] {
        match self.face {
            Some(face) => {
                let (dx, dy, dz) = face.delta();
                [self.voxel[0] + dx, self.voxel[1] + dy, self.voxel[2] + dz]
            }
            None => self.voxel,
        }
    }
}

/// Runs a fresh cast to its first hit.
pub fn cast<Q: BlockQuery + ?Sized>(world: &Q, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RaycastState> {
    let mut state = begin_raycast(origin, dir, max_distance);
    state.step(world).then_some(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air(_: i32, _: i32, _: i32) -> Block {
        Block::Null
    }

    #[test]
    fn empty_world_runs_to_max_distance() {
        let mut s = begin_raycast(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0), 10.0);
        assert!(!s.step(&air));
        assert_eq!(s.voxel, [10, 0, 0]);
        assert_eq!(s.steps, 10);
        assert!(!s.step(&air));
        assert_eq!(s.steps, 10);
    }

    #[test]
    fn hit_reports_entered_face() {
        let wall = |x: i32, _: i32, _: i32| if x == 3 { Block::Stone } else { Block::Null };
        let s = cast(&wall, Vec3::new(0.5, 0.5, 0.5), Vec3::new(2.0, 0.0, 0.0), 10.0);
        let s = s.expect("wall is in range");
        assert_eq!(s.voxel, [3, 0, 0]);
        assert_eq!(s.face, Some(Face::NegX));
        assert_eq!(s.adjacent(), [2, 0, 0]);
        assert!((s.distance - 2.5).abs() < 1e-5);
        assert_eq!(s.block, Block::Stone);
    }

    #[test]
    fn continues_past_a_hit() {
        let posts = |x: i32, y: i32, _: i32| {
            if y == 0 && (x == -2 || x == -5) { Block::Planks } else { Block::Null }
        };
        let mut s = begin_raycast(Vec3::new(0.5, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0), 20.0);
        assert!(s.step(&posts));
        assert_eq!(s.voxel, [-2, 0, 0]);
        assert_eq!(s.face, Some(Face::PosX));
        assert!(s.step(&posts));
        assert_eq!(s.voxel, [-5, 0, 0]);
    }

    #[test]
    fn unloaded_is_transparent_to_rays() {
        let fog = |_: i32, _: i32, _: i32| Block::Unloaded;
        assert!(cast(&fog, Vec3::ZERO, Vec3::UP, 5.0).is_none());
    }

    #[test]
    fn start_voxel_hit_has_no_face() {
        let solid = |_: i32, _: i32, _: i32| Block::Stone;
        let s = cast(&solid, Vec3::new(1.5, 1.5, 1.5), Vec3::UP, 5.0).expect("inside stone");
        assert_eq!(s.voxel, [1, 1, 1]);
        assert_eq!(s.face, None);
        assert_eq!(s.steps, 0);
    }

    #[test]
    fn zero_direction_terminates() {
        let mut s = begin_raycast(Vec3::new(0.5, 0.5, 0.5), Vec3::ZERO, 5.0);
        assert!(!s.step(&air));
    }
}
