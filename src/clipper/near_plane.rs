//! Near-plane clipping in view space.
//!
//! Only the near plane needs real clipping: the rasterizer rejects and clips
//! against the screen edges on its own, but a vertex behind the near plane
//! would have `w <= near` and break the perspective divide.
//!
//! ```text
//!   1 vertex outside          2 vertices outside
//!
//!        a (out)                   a (out)   b (out)
//!       / \                         \       /
//!  ----p---q----  z = -near     -----p-----q-----
//!     /     \                         \   /
//!    b-------c                          c
//!
//!  -> (p, b, c), (p, c, q)       -> (c, p, q)
//! ```

use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;

/// Result of clipping one triangle against the near plane.
///
/// Triangles keep the winding of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipResult {
    /// All three vertices are behind the near plane.
    Culled,
    One([Vec4; 3]),
    /// One vertex was behind the plane, the remaining quad is split in two.
    Two([[Vec4; 3]; 2]),
}

impl ClipResult {
    pub fn triangles(&self) -> &[[Vec4; 3]] {
        match self {
            ClipResult::Culled => &[],
            ClipResult::One(triangle) => std::slice::from_ref(triangle),
            ClipResult::Two(triangles) => triangles,
        }
    }

    pub fn is_culled(&self) -> bool {
        matches!(self, ClipResult::Culled)
    }
}

/// A view-space vertex is in front of the near plane when `z <= -near`.
#[inline]
pub fn is_in_front(v: Vec4, near: f32) -> bool {
    v.z <= -near
}

/// Fraction of the way from `origin` (behind the plane) to `target` (in
/// front of it) where the segment crosses `z = -near`.
#[inline]
pub fn intersection_ratio(origin: Vec4, target: Vec4, near: f32) -> f32 {
    (origin.z + near) / (origin.z - target.z)
}

fn intersect(origin: Vec4, target: Vec4, near: f32) -> Vec4 {
    origin.lerp(target, intersection_ratio(origin, target, near))
}

/// Clips a view-space triangle against the near plane.
pub fn clip_triangle_near(vertices: [Vec4; 3], near: f32) -> ClipResult {
    let inside = vertices.map(|v| is_in_front(v, near));

    match inside.iter().filter(|&&i| !i).count() {
        0 => ClipResult::One(vertices),
        1 => {
            let Some(out) = inside.iter().position(|&i| !i) else {
                return ClipResult::Culled;
            };
            let a = vertices[out];
            let b = vertices[(out + 1) % 3];
            let c = vertices[(out + 2) % 3];
            let p_ab = intersect(a, b, near);
            let p_ac = intersect(a, c, near);
            ClipResult::Two([[p_ab, b, c], [p_ab, c, p_ac]])
        }
        2 => {
            let Some(kept) = inside.iter().position(|&i| i) else {
                return ClipResult::Culled;
            };
            let c = vertices[kept];
            let clipped = std::array::from_fn(|i| {
                if i == kept {
                    c
                } else {
                    intersect(vertices[i], c, near)
                }
            });
            ClipResult::One(clipped)
        }
        _ => ClipResult::Culled,
    }
}

/// Back-face test on view-space positions: the camera sits at the origin, so
/// a face whose normal points away from it satisfies `(e1 x e2) . v0 > 0`.
pub fn is_back_facing_view(v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
    (v1 - v0).cross(v2 - v0).dot(v0) > 0.0
}
