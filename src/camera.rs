//! Camera consumed by the occlusion renderer.
//!
//! # Coordinate System
//!
//! View space is **right-handed**:
//! - X: positive right
//! - Y: positive up
//! - Z: positive towards the viewer, so the camera looks down **-Z**
//!
//! The near plane sits at `z = -near` in view space. Everything the
//! rasterizer needs is the view matrix, the projection matrix and `near`.

use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;

/// Perspective camera with an explicit view and projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    near: f32,
    far: f32,
}

impl Camera {
    /// Creates a camera from already built matrices.
    ///
    /// `near` must be the positive near-plane distance the projection was
    /// built with.
    pub fn new(view: Mat4, projection: Mat4, near: f32, far: f32) -> Self {
        Self {
            view,
            projection,
            near,
            far,
        }
    }

    /// Creates a camera at the origin looking down -Z.
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `near` - Near clipping plane distance (must be > 0)
    /// * `far` - Far clipping plane distance (must be > near)
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self::new(
            Mat4::identity(),
            Mat4::perspective_rh(fov_y, aspect_ratio, near, far),
            near,
            far,
        )
    }

    /// Places the camera at `eye` looking at `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) -> &mut Self {
        self.view = Mat4::look_at_rh(eye, target, up);
        self
    }

    pub fn set_view_matrix(&mut self, view: Mat4) -> &mut Self {
        self.view = view;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Projection applied after the view transform.
    pub fn view_projection_matrix(&self) -> Mat4 {
        Mat4::combine(self.projection, self.view)
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn look_at_feeds_view_projection() {
        let mut camera = Camera::perspective(FRAC_PI_2, 1.0, 0.5, 50.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UP);

        let clip = camera
            .view_projection_matrix()
            .apply_post(Vec4::point(0.0, 0.0, 0.0));
        assert_relative_eq!(clip.w, 10.0, epsilon = 1e-5);
        assert_relative_eq!(camera.near(), 0.5);
        assert_relative_eq!(camera.far(), 50.0);
    }
}
