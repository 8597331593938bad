use tessera_blocks::Block;
use tessera_geom::{Aabb, Vec3, collide};
use tessera_world::BlockQuery;

/// Longest distance moved along one axis before collisions are resolved.
const MAX_SUBSTEP: f32 = 0.25;

#[derive(Debug)]
pub struct Walker {
    pub pos: Vec3, // feet position (x,z at center, y at feet)
    pub vel: Vec3,
    pub on_ground: bool,
    pub height: f32,
    pub eye_height: f32,
    pub radius: f32,
    pub speed: f32,
    pub jump_speed: f32,
    pub gravity: f32, // negative
    pub terminal_speed: f32,
}

impl Walker {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            pos: spawn,
            vel: Vec3::ZERO,
            on_ground: false,
            height: 1.75,
            eye_height: 1.60,
            radius: 0.35,
            speed: 4.3,
            jump_speed: 7.5,
            gravity: -25.0,
            terminal_speed: 50.0,
        }
    }

    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(self.pos.x, self.pos.y + self.eye_height, self.pos.z)
    }

    pub fn body_at(&self, pos: Vec3) -> Aabb {
        Aabb::new(
            Vec3::new(pos.x - self.radius, pos.y, pos.z - self.radius),
            Vec3::new(pos.x + self.radius, pos.y + self.height, pos.z + self.radius),
        )
    }

    // Unloaded reads as solid so the walker never falls out of the world.
    #[inline]
    fn blocks_movement(b: Block) -> bool {
        !b.is_ghost()
    }

    fn overlaps_solid<Q: BlockQuery + ?Sized>(&self, world: &Q, body: &Aabb) -> bool {
        let mut hit = false;
        for_each_voxel(body, |x, y, z| {
            if !hit && Self::blocks_movement(world.block_at(x, y, z)) {
                hit = collide(body, &Aabb::voxel(x, y, z))
                    .is_some_and(|c| c.penetration.length() > 1e-5);
            }
        });
        hit
    }

    /// Pushes the body out of every solid voxel it overlaps, deepest first.
    /// Returns the summed correction.
    fn resolve<Q: BlockQuery + ?Sized>(&mut self, world: &Q) -> Vec3 {
        let mut total = Vec3::ZERO;
        for _ in 0..4 {
            let body = self.body_at(self.pos);
            let mut deepest: Option<Vec3> = None;
            for_each_voxel(&body, |x, y, z| {
                if !Self::blocks_movement(world.block_at(x, y, z)) {
                    return;
                }
                if let Some(c) = collide(&body, &Aabb::voxel(x, y, z)) {
                    let depth = c.penetration.length();
                    if depth > 1e-5 && deepest.is_none_or(|d| depth > d.length()) {
                        deepest = Some(c.penetration);
                    }
                }
            });
            let Some(pen) = deepest else {
                break;
            };
            self.pos -= pen;
            total -= pen;
        }
        total
    }

    fn move_axis<Q: BlockQuery + ?Sized>(&mut self, world: &Q, axis: usize, amt: f32) -> f32 {
        let mut moved = 0.0f32;
        let mut remaining = amt;
        while remaining.abs() > 1e-4 {
            let s = remaining.clamp(-MAX_SUBSTEP, MAX_SUBSTEP);
            let before = self.pos.axis(axis);
            self.pos = self.pos.with_axis(axis, before + s);
            let push = self.resolve(world);
            let step = self.pos.axis(axis) - before;
            moved += step;
            remaining -= s;
            if push.axis(axis) * s < 0.0 {
                break; // blocked along this axis
            }
        }
        moved
    }

    /// Advances one frame. `wish` is the horizontal walking direction and is
    /// normalized here.
    pub fn update<Q: BlockQuery + ?Sized>(&mut self, world: &Q, dt: f32, wish: Vec3, jump: bool) {
        let below = self.body_at(self.pos - Vec3::new(0.0, 0.05, 0.0));
        self.on_ground = self.vel.y <= 0.0 && self.overlaps_solid(world, &below);
        if self.on_ground {
            self.vel.y = if jump { self.jump_speed } else { 0.0 };
        } else {
            self.vel.y = (self.vel.y + self.gravity * dt).max(-self.terminal_speed);
        }
        let flat = Vec3::new(wish.x, 0.0, wish.z).normalized() * self.speed;
        self.vel.x = flat.x;
        self.vel.z = flat.z;

        let (dx, dy, dz) = (self.vel.x * dt, self.vel.y * dt, self.vel.z * dt);
        let moved_y = if dy > 0.0 {
            let my = self.move_axis(world, 1, dy);
            self.move_axis(world, 0, dx);
            self.move_axis(world, 2, dz);
            my
        } else {
            self.move_axis(world, 0, dx);
            self.move_axis(world, 2, dz);
            self.move_axis(world, 1, dy)
        };
        if dy < 0.0 && moved_y > dy * 0.5 {
            self.on_ground = true;
            self.vel.y = 0.0;
        } else if dy > 0.0 && moved_y < dy * 0.5 {
            // Head bump.
            self.vel.y = 0.0;
        }
    }
}

fn for_each_voxel(body: &Aabb, mut f: impl FnMut(i32, i32, i32)) {
    let (x0, x1) = (body.min.x.floor() as i32, body.max.x.floor() as i32);
    let (y0, y1) = (body.min.y.floor() as i32, body.max.y.floor() as i32);
    let (z0, z1) = (body.min.z.floor() as i32, body.max.z.floor() as i32);
    for y in y0..=y1 {
        for z in z0..=z1 {
            for x in x0..=x1 {
                f(x, y, z);
            }
        }
    }
}
