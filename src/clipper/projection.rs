//! Projection from view space to screen pixels.
//!
//! Screen space has its origin in the bottom-left corner with y growing
//! upwards, so counter-clockwise triangles in view space stay
//! counter-clockwise on screen. The `z` of a screen vertex carries the
//! clip-space `w` (the view distance) for the rasterizer to interpolate.

use crate::math::mat4::Mat4;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// Maps NDC `x, y` in `[-1, 1]` to `[0, clip_x] x [0, clip_y]`.
#[inline]
pub fn to_screen(ndc: Vec4, clip_x: f32, clip_y: f32) -> Vec3 {
    Vec3::new(
        (ndc.x + 1.0) * clip_x * 0.5,
        (ndc.y + 1.0) * clip_y * 0.5,
        ndc.w,
    )
}

/// Projects a view-space vertex and maps it to the screen.
///
/// The vertex must lie in front of the near plane so that `w > 0`.
#[inline]
pub fn project_to_screen(projection: &Mat4, view: Vec4, clip_x: f32, clip_y: f32) -> Vec3 {
    to_screen(projection.apply_post(view).perspective_divide(), clip_x, clip_y)
}

/// Screen-space back-face test: clockwise triangles face away.
#[inline]
pub fn is_back_facing_screen(a: Vec3, b: Vec3, c: Vec3) -> bool {
    let ab = Vec2::new(b.x - a.x, b.y - a.y);
    let ac = Vec2::new(c.x - a.x, c.y - a.y);
    ab.perp_dot(ac) < 0.0
}
