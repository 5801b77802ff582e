use crate::math::{Mat4, Pose, Ray, Vec2, Vec3, Vec4};
use std::cell::RefCell;

/// Builds a pick ray from a pointer position in normalized device coordinates.
///
/// `ndc` is in [-1, 1] on both axes with +Y up, which is what
/// [`PointerSampler`](crate::PointerSampler) produces from client coordinates.
pub trait Projection {
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray;
}

impl<P: Projection> Projection for RefCell<P> {
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        self.borrow().ray_from_ndc(ndc)
    }
}

/// Right-handed perspective camera looking down the -Z axis of its pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub pose: Pose,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(pose: Pose, fov_y: f32, aspect: f32) -> Self {
        Self {
            pose,
            fov_y,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(f32::EPSILON), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.pose.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(
            Pose::from_position(Vec3::new(0.0, 0.0, 5.0)),
            std::f32::consts::FRAC_PI_4,
            1.0,
        )
    }
}

impl Projection for PerspectiveCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        // perspective_rh maps the near plane to depth 0
        let near = inv * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let near: Vec3 = near.truncate() / near.w;
        let origin = self.pose.position;
        Ray::new(origin, near - origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_follows_forward() {
        let camera = PerspectiveCamera::default();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        assert!(ray.direction.abs_diff_eq(-Vec3::Z, 1e-4));
    }

    #[test]
    fn test_ndc_axes_map_to_camera_axes() {
        let camera = PerspectiveCamera::default();
        let right = camera.ray_from_ndc(Vec2::new(1.0, 0.0));
        let up = camera.ray_from_ndc(Vec2::new(0.0, 1.0));
        assert!(right.direction.x > 0.0);
        assert!(right.direction.y.abs() < 1e-4);
        assert!(up.direction.y > 0.0);
        assert!(up.direction.x.abs() < 1e-4);
    }

    #[test]
    fn test_edge_ray_matches_half_fov() {
        let camera = PerspectiveCamera::default();
        let up = camera.ray_from_ndc(Vec2::new(0.0, 1.0));
        let angle = up.direction.angle_between(-Vec3::Z);
        assert!((angle - camera.fov_y / 2.0).abs() < 1e-3);
    }
}
