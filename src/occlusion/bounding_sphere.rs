//! Sphere occludee test.
//!
//! The sphere is reduced to five screen points: the point nearest the camera
//! and the four silhouette extremes. The points are tested individually,
//! then the silhouette between them is filled row by row and every covered
//! pixel is tested against the depth of the nearest point.
//!
//! The extremes are where planes through the eye graze the sphere. Away
//! from the view axis the outline is an ellipse stretched outwards, so
//! offsetting the center by the radius would fall short of it. Each row
//! span solves the circle equation on the outline cone instead.
//!
//! ```text
//!            top
//!         .-'''-.
//!        /       \
//!   left|  near   |right
//!        \       /
//!         '-...-'
//!          bottom
//! ```

use crate::bounds::BoundingVolume;
use crate::camera::Camera;
use crate::clipper::project_to_screen;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::render::DepthView;

/// Screen-space silhouette of a sphere, already rounded outwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSilhouette {
    pub near: Vec3,
    pub left: Vec3,
    pub right: Vec3,
    pub top: Vec3,
    pub bottom: Vec3,
    /// `1/w` of the nearest point, the depth the whole silhouette is tested at.
    pub nearest_depth: f32,
    outline: Outline,
}

/// The cone from the eye that just contains the sphere, in view space,
/// with the linear map from view slopes to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Outline {
    center: Vec3,
    radius: f32,
    /// Pixel position of the view axis.
    axis: (f32, f32),
    /// Pixels per unit of view slope `x / -z` and `y / -z`.
    pixels_per_slope: (f32, f32),
}

impl Outline {
    /// Pixel columns where row `y` crosses the outline, if it does.
    ///
    /// A ray `(s, t, -1)` is inside the cone when
    /// `(v . c)^2 >= (|c|^2 - r^2) |v|^2`, a downward parabola in `s` for a
    /// fixed row `t`.
    fn row_span(&self, y: f32) -> Option<(f32, f32)> {
        let c = self.center;
        let k = c.dot(c) - self.radius * self.radius;
        let t = (y - self.axis.1) / self.pixels_per_slope.1;

        let m = t * c.y - c.z;
        let a = c.x * c.x - k;
        let b = 2.0 * c.x * m;
        let cc = m * m - k * (t * t + 1.0);
        let disc = b * b - 4.0 * a * cc;
        if disc < 0.0 || a >= 0.0 {
            return None;
        }

        // a < 0, so the + root is the smaller one
        let root = disc.sqrt();
        let s0 = (-b + root) / (2.0 * a);
        let s1 = (-b - root) / (2.0 * a);
        let (x0, x1) = (
            self.axis.0 + s0 * self.pixels_per_slope.0,
            self.axis.0 + s1 * self.pixels_per_slope.0,
        );
        Some((x0.min(x1), x0.max(x1)))
    }
}

/// Slopes of the two planes through the eye that graze a sphere, seen
/// across one screen axis. `lateral` is the center's offset along that axis
/// and `depth` its distance in front of the eye.
fn grazing_slopes(lateral: f32, depth: f32, radius: f32) -> (f32, f32) {
    let alpha = lateral.atan2(depth);
    let beta = (radius / lateral.hypot(depth)).asin();
    ((alpha - beta).tan(), (alpha + beta).tan())
}

/// Point where the plane through the eye with the given normal touches the
/// sphere around `center`.
fn touch_point(center: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalize();
    center - n * center.dot(n)
}

impl SphereSilhouette {
    /// Projects a model-space sphere.
    ///
    /// Returns None when the camera is inside the sphere or the sphere
    /// reaches past the near plane; such a sphere is always visible.
    pub fn project(
        camera: &Camera,
        world: &Mat4,
        center: Vec3,
        radius: f32,
        scale: Vec3,
        clip_x: f32,
        clip_y: f32,
    ) -> Option<Self> {
        let model_view = Mat4::combine(camera.view_matrix(), *world);
        let origin = model_view.apply_post(Vec4::from(center)).xyz();
        let radius = BoundingVolume::scaled_radius(radius, scale);

        let distance = origin.magnitude();
        if distance <= radius {
            log::trace!("camera inside bounding sphere");
            return None;
        }

        // the visible rim of a sphere is wider than its radius when seen up close
        let rim = distance * (radius / distance).asin().tan();

        let near_point = origin + Vec3::new(0.0, 0.0, rim);
        if near_point.z > -camera.near() {
            log::trace!("bounding sphere crosses the near plane");
            return None;
        }

        let projection = camera.projection_matrix();
        let project = |p: Vec3| project_to_screen(&projection, Vec4::from(p), clip_x, clip_y);

        // the whole sphere lies beyond the near plane, so every grazing
        // plane has a finite slope
        let depth = -origin.z;
        let (s_left, s_right) = grazing_slopes(origin.x, depth, radius);
        let (s_bottom, s_top) = grazing_slopes(origin.y, depth, radius);

        let near = project(near_point);
        let left = project(touch_point(origin, Vec3::new(1.0, 0.0, s_left)));
        let right = project(touch_point(origin, Vec3::new(1.0, 0.0, s_right)));
        let bottom = project(touch_point(origin, Vec3::new(0.0, 1.0, s_bottom)));
        let top = project(touch_point(origin, Vec3::new(0.0, 1.0, s_top)));

        let axis = project(Vec3::new(0.0, 0.0, -1.0));
        let unit = project(Vec3::new(1.0, 1.0, -1.0));
        let outline = Outline {
            center: origin,
            radius,
            axis: (axis.x, axis.y),
            pixels_per_slope: (unit.x - axis.x, unit.y - axis.y),
        };

        Some(Self {
            nearest_depth: 1.0 / near.z,
            near: Vec3::new(near.x.round(), near.y.round(), near.z),
            left: Vec3::new(left.x.floor(), left.y.round(), left.z),
            right: Vec3::new(right.x.ceil(), right.y.round(), right.z),
            top: Vec3::new(top.x.round(), top.y.ceil(), top.z),
            bottom: Vec3::new(bottom.x.round(), bottom.y.floor(), bottom.z),
            outline,
        })
    }

    /// Tests the silhouette against the depth buffer.
    ///
    /// `min_rows` is the collapse threshold: a silhouette with at most that
    /// many rows above and below its center is too small to fill and is kept
    /// unless it lies off-screen.
    pub fn is_occluded(&self, view: &DepthView, min_rows: u32) -> bool {
        let depth = self.nearest_depth;
        let points = [self.near, self.left, self.right, self.top, self.bottom];
        if !points
            .iter()
            .all(|p| view.is_point_occluded(p.x, p.y, depth))
        {
            return false;
        }

        let (clip_x, clip_y) = (view.clip_x(), view.clip_y());
        if self.top.y < 0.0 || self.bottom.y > clip_y || self.right.x < 0.0 || self.left.x > clip_x
        {
            return true;
        }

        let cy = self.right.y;
        let ry_top = self.top.y - cy;
        let ry_bottom = cy - self.bottom.y;

        let min_rows = min_rows as f32;
        if ry_top <= min_rows && ry_bottom <= min_rows {
            return false;
        }

        let first = (self.top.y - 1.0).min(clip_y) as i32;
        let last = (self.bottom.y + 1.0).max(0.0) as i32;
        for y in (last..=first).rev() {
            let Some((x0, x1)) = self.outline.row_span(y as f32) else {
                continue;
            };
            if !view.is_row_occluded(y, x0.floor() as i32, x1.ceil() as i32, depth) {
                return false;
            }
        }
        true
    }
}

/// Tests a sphere bound against the depth buffer.
pub fn is_sphere_occluded(
    view: &DepthView,
    camera: &Camera,
    world: &Mat4,
    center: Vec3,
    radius: f32,
    scale: Vec3,
    min_rows: u32,
) -> bool {
    SphereSilhouette::project(
        camera,
        world,
        center,
        radius,
        scale,
        view.clip_x(),
        view.clip_y(),
    )
    .is_some_and(|silhouette| silhouette.is_occluded(view, min_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DepthBuffer, Span};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const SIZE: u32 = 64;

    fn camera() -> Camera {
        Camera::perspective(FRAC_PI_2, 1.0, 0.1, 100.0)
    }

    /// Every row written at depth 1, except an optional single-pixel hole.
    fn wall(hole: Option<(i32, i32)>) -> DepthBuffer {
        let mut buffer = DepthBuffer::new(SIZE, SIZE).unwrap();
        let mut target = buffer.target();
        let max = (SIZE - 1) as f32;
        for y in 0..SIZE as i32 {
            match hole {
                Some((hx, hy)) if hy == y => {
                    target.write_span(y, Span::new(0.0, 1.0, (hx - 1) as f32, 1.0));
                    target.write_span(y, Span::new((hx + 1) as f32, 1.0, max, 1.0));
                }
                _ => target.write_span(y, Span::new(0.0, 1.0, max, 1.0)),
            }
        }
        buffer
    }

    fn test_sphere(buffer: &DepthBuffer, position: Vec3, radius: f32) -> bool {
        is_sphere_occluded(
            &buffer.view(),
            &camera(),
            &Mat4::translation(position.x, position.y, position.z),
            Vec3::ZERO,
            radius,
            Vec3::ONE,
            1,
        )
    }

    #[test]
    fn silhouette_is_centered_and_rounded_outwards() {
        let s = SphereSilhouette::project(
            &camera(),
            &Mat4::translation(0.0, 0.0, -2.0),
            Vec3::ZERO,
            0.2,
            Vec3::ONE,
            63.0,
            63.0,
        )
        .unwrap();

        assert_eq!((s.left.x, s.right.x), (28.0, 35.0));
        assert_eq!((s.bottom.y, s.top.y), (28.0, 35.0));
        assert_eq!((s.near.x, s.near.y), (32.0, 32.0));
        // rim = 2 * tan(asin(0.1))
        let rim = 2.0 * 0.1f32.asin().tan();
        assert_relative_eq!(s.nearest_depth, 1.0 / (2.0 - rim), epsilon = 1e-5);
    }

    #[test]
    fn scale_grows_radius() {
        let s = SphereSilhouette::project(
            &camera(),
            &Mat4::translation(0.0, 0.0, -2.0),
            Vec3::ZERO,
            0.1,
            Vec3::new(1.0, 2.0, 1.0),
            63.0,
            63.0,
        )
        .unwrap();
        assert_eq!((s.left.x, s.right.x), (28.0, 35.0));
    }

    #[test]
    fn behind_wall_is_occluded() {
        let buffer = wall(None);
        assert!(test_sphere(&buffer, Vec3::new(0.0, 0.0, -2.0), 0.2));
        assert!(test_sphere(&buffer, Vec3::new(0.5, -0.3, -8.0), 1.0));
    }

    #[test]
    fn in_front_of_wall_is_visible() {
        let buffer = wall(None);
        assert!(!test_sphere(&buffer, Vec3::new(0.0, 0.0, -0.6667), 0.2));
    }

    #[test]
    fn hole_inside_silhouette_is_found() {
        // (30, 30) is none of the five points but lies inside the silhouette
        let buffer = wall(Some((30, 30)));
        assert!(!test_sphere(&buffer, Vec3::new(0.0, 0.0, -2.0), 0.2));
        // a hole outside the silhouette changes nothing
        let buffer = wall(Some((5, 60)));
        assert!(test_sphere(&buffer, Vec3::new(0.0, 0.0, -2.0), 0.2));
    }

    #[test]
    fn camera_inside_or_near_plane_is_visible() {
        let buffer = wall(None);
        assert!(!test_sphere(&buffer, Vec3::new(0.0, 0.0, -0.5), 1.0));
        assert!(!test_sphere(&buffer, Vec3::new(0.0, 0.0, -0.2), 0.15));
    }

    #[test]
    fn offscreen_sphere_is_occluded() {
        let buffer = DepthBuffer::new(SIZE, SIZE).unwrap();
        assert!(test_sphere(&buffer, Vec3::new(-40.0, 0.0, -5.0), 1.0));
        assert!(!test_sphere(&buffer, Vec3::new(0.0, 0.0, -5.0), 1.0));
    }

    #[test]
    fn sphere_reaching_in_from_the_side_is_visible() {
        // the outline starts at column 62.4 although the center projects
        // far off the right edge
        let position = Vec3::new(6.3, 0.0, -5.0);
        let s = SphereSilhouette::project(
            &camera(),
            &Mat4::translation(position.x, position.y, position.z),
            Vec3::ZERO,
            1.0,
            Vec3::ONE,
            63.0,
            63.0,
        )
        .unwrap();
        assert_eq!(s.left.x, 62.0);

        let empty = DepthBuffer::new(SIZE, SIZE).unwrap();
        assert!(!test_sphere(&empty, position, 1.0));
    }

    #[test]
    fn gap_on_the_outline_near_the_screen_edge_is_found() {
        let position = Vec3::new(6.3, 0.0, -5.0);
        assert!(test_sphere(&wall(None), position, 1.0));
        // (62, 30) lies inside the outline but is none of the five points
        assert!(!test_sphere(&wall(Some((62, 30))), position, 1.0));
        // a column left of the outline changes nothing
        assert!(test_sphere(&wall(Some((60, 30))), position, 1.0));
    }

    #[test]
    fn row_span_matches_circle_on_the_view_axis() {
        let s = SphereSilhouette::project(
            &camera(),
            &Mat4::translation(0.0, 0.0, -2.0),
            Vec3::ZERO,
            0.2,
            Vec3::ONE,
            63.0,
            63.0,
        )
        .unwrap();
        let (x0, x1) = s.outline.row_span(31.5).unwrap();
        let half = 31.5 * 0.1f32.asin().tan();
        assert_relative_eq!(x0, 31.5 - half, epsilon = 1e-3);
        assert_relative_eq!(x1, 31.5 + half, epsilon = 1e-3);
        assert!(s.outline.row_span(40.0).is_none());
    }

    #[test]
    fn collapsed_silhouette_stays_visible() {
        let buffer = wall(None);
        let tiny = Vec3::new(0.0, 0.0, -50.0);
        assert!(!test_sphere(&buffer, tiny, 0.1));
        let view = buffer.view();
        let s = SphereSilhouette::project(
            &camera(),
            &Mat4::translation(tiny.x, tiny.y, tiny.z),
            Vec3::ZERO,
            0.1,
            Vec3::ONE,
            63.0,
            63.0,
        )
        .unwrap();
        assert!(s.is_occluded(&view, 0));
    }
}
