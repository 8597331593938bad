use tessera_geom::{Aabb, Vec3, collide};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-5
}

fn vapprox(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

#[test]
fn separated_boxes_do_not_collide() {
    let a = Aabb::voxel(0, 0, 0);
    let b = Aabb::voxel(2, 0, 0);
    assert!(collide(&a, &b).is_none());
}

#[test]
fn shallow_x_overlap_pushes_along_x() {
    let a = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
    let b = Aabb::new(Vec3::new(0.8, -0.5, -0.5), Vec3::new(1.8, 1.5, 1.5));
    let c = collide(&a, &b).expect("overlap");
    assert!(vapprox(c.penetration, Vec3::new(0.2, 0.0, 0.0)));
    assert!(vapprox(c.normal, Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn player_sinking_into_floor_is_pushed_up() {
    let player = Aabb::from_center(Vec3::new(0.5, 1.85, 0.5), Vec3::new(0.3, 0.9, 0.3));
    let floor = Aabb::voxel(0, 0, 0);
    let c = collide(&player, &floor).expect("overlap");
    // 0.95 - 1.0 = -0.05 on y is the smallest axis.
    assert!(vapprox(c.penetration, Vec3::new(0.0, -0.05, 0.0)));
    assert!(vapprox(c.normal, Vec3::UP));
    let resolved = player.translated(c.penetration * -1.0);
    assert!(approx(resolved.min.y, 1.0));
}

#[test]
fn touching_boxes_report_zero_depth() {
    let a = Aabb::voxel(0, 0, 0);
    let b = Aabb::voxel(1, 0, 0);
    let c = collide(&a, &b).expect("touching counts");
    assert!(approx(c.penetration.length(), 0.0));
}

#[test]
fn aabb_helpers() {
    let a = Aabb::from_center(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 1.5));
    assert!(vapprox(a.center(), Vec3::new(1.0, 2.0, 3.0)));
    assert!(vapprox(a.half_extents(), Vec3::new(0.5, 1.0, 1.5)));
    let v = Vec3::new(3.0, 4.0, 0.0);
    assert!(approx(v.length(), 5.0));
    assert!(vapprox(v.normalized(), Vec3::new(0.6, 0.8, 0.0)));
    assert!(vapprox(Vec3::ZERO.normalized(), Vec3::ZERO));
    assert!(vapprox(Vec3::new(1.0, 0.0, 0.0).cross(Vec3::UP), Vec3::new(0.0, 0.0, 1.0)));
}
