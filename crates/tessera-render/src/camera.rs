use glam::{Mat4, Vec3};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Meshes uploaded per frame at most.
    #[serde(default = "default_upload_budget")]
    pub upload_budget: usize,
    /// Load requests issued per frame at most.
    #[serde(default = "default_request_budget")]
    pub request_budget: usize,
}

fn default_fov() -> f32 {
    70.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}
fn default_upload_budget() -> usize {
    32
}
fn default_request_budget() -> usize {
    64
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            upload_budget: default_upload_budget(),
            request_budget: default_request_budget(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub aspect: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(cfg: &RenderConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            aspect: 16.0 / 9.0,
            fov_degrees: cfg.fov_degrees,
            near: cfg.near,
            far: cfg.far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    pub fn view(&self) -> Mat4 {
        // Looking straight up or down needs a different up vector.
        let up = if self.forward().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.look_at, up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(1e-3),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_target_lands_in_front() {
        let mut cam = Camera::new(&RenderConfig::default());
        cam.position = Vec3::new(0.0, 70.0, 0.0);
        cam.look_at = Vec3::new(10.0, 70.0, 0.0);
        let v = cam.view().transform_point3(cam.look_at);
        assert!(v.z < 0.0);
        assert!(v.x.abs() < 1e-4 && v.y.abs() < 1e-4);
    }

    #[test]
    fn straight_down_view_is_finite() {
        let mut cam = Camera::new(&RenderConfig::default());
        cam.position = Vec3::new(0.0, 80.0, 0.0);
        cam.look_at = Vec3::new(0.0, 0.0, 0.0);
        assert!(cam.view().is_finite());
    }
}
