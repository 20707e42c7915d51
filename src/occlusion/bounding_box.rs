//! Box occludee test.
//!
//! The 8 corners are projected to the screen first. A box with any corner
//! closer than the near plane is always visible. Two strategies then decide
//! occlusion:
//!
//! - [`BoxTest::Rasterized`]: the front faces are rasterized with the
//!   occludee span policy; the box is occluded iff every face is.
//! - [`BoxTest::ClippedRectangle`]: the 12 edges are Cohen-Sutherland
//!   clipped to the screen, their on-screen parts give a rectangle and the
//!   nearest depth, and the rectangle is tested at that single depth.

use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::bounds::{box_corners, BOX_EDGES, BOX_TRIANGLES};
use crate::clipper::{is_back_facing_screen, to_screen};
use crate::config::BoxTest;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::render::{DepthView, Rasterizer, Triangle};

/// Cohen-Sutherland region code of a screen point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutCode(u8);

impl OutCode {
    pub const INSIDE: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const BELOW: Self = Self(4);
    pub const ABOVE: Self = Self(8);

    pub fn compute(x: f32, y: f32, clip_x: f32, clip_y: f32) -> Self {
        let mut code = Self::INSIDE;
        if x < 0.0 {
            code |= Self::LEFT;
        } else if x > clip_x {
            code |= Self::RIGHT;
        }
        if y < 0.0 {
            code |= Self::BELOW;
        } else if y > clip_y {
            code |= Self::ABOVE;
        }
        code
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_inside(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for OutCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutCode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OutCode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// On-screen extent of a box and the nearest (largest) `1/w` within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenEnvelope {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub nearest_depth: f32,
}

impl ScreenEnvelope {
    pub const EMPTY: Self = Self {
        min_x: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        min_y: f32::INFINITY,
        max_y: f32::NEG_INFINITY,
        nearest_depth: 0.0,
    };

    /// Grows the envelope to a screen point whose `z` is `1/w`.
    pub fn include(&mut self, p: Vec3) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
        self.nearest_depth = self.nearest_depth.max(p.z);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

/// Projects the box corners to the screen, `z` holding the view distance.
///
/// Returns None when a corner lies closer than the near plane.
pub fn project_box(
    model_view_projection: &Mat4,
    center: Vec3,
    extents: Vec3,
    near: f32,
    clip_x: f32,
    clip_y: f32,
) -> Option<[Vec3; 8]> {
    let mut projected = [Vec3::ZERO; 8];
    for (out, corner) in projected.iter_mut().zip(box_corners(center, extents)) {
        let clip = model_view_projection.apply_post(Vec4::from(corner));
        if clip.w < near {
            return None;
        }
        *out = to_screen(clip.perspective_divide(), clip_x, clip_y);
    }
    Some(projected)
}

/// Tests a box bound against the depth buffer.
pub fn is_box_occluded<R: Rasterizer>(
    view: &DepthView,
    rasterizer: &R,
    strategy: BoxTest,
    model_view_projection: &Mat4,
    center: Vec3,
    extents: Vec3,
    near: f32,
) -> bool {
    let Some(corners) = project_box(
        model_view_projection,
        center,
        extents,
        near,
        view.clip_x(),
        view.clip_y(),
    ) else {
        log::trace!("box crosses the near plane, keeping it");
        return false;
    };

    match strategy {
        BoxTest::Rasterized => is_rasterized_box_occluded(view, rasterizer, &corners),
        BoxTest::ClippedRectangle => is_box_rectangle_occluded(view, &corners),
    }
}

fn is_rasterized_box_occluded<R: Rasterizer>(
    view: &DepthView,
    rasterizer: &R,
    corners: &[Vec3; 8],
) -> bool {
    BOX_TRIANGLES.iter().all(|&[a, b, c]| {
        let points = [corners[a], corners[b], corners[c]];
        is_back_facing_screen(points[0], points[1], points[2])
            || rasterizer.is_triangle_occluded(&Triangle::new(points), view)
    })
}

fn is_box_rectangle_occluded(view: &DepthView, corners: &[Vec3; 8]) -> bool {
    let (clip_x, clip_y) = (view.clip_x(), view.clip_y());
    let envelope = clipped_envelope(corners, clip_x, clip_y);
    if envelope.is_empty() {
        // nothing of the box reaches the screen
        return true;
    }

    let x0 = envelope.min_x.floor().max(0.0) as i32;
    let x1 = envelope.max_x.ceil().min(clip_x) as i32;
    let y0 = envelope.min_y.floor().max(0.0) as i32;
    let y1 = envelope.max_y.ceil().min(clip_y) as i32;
    (y0..=y1).all(|y| view.is_row_occluded(y, x0, x1, envelope.nearest_depth))
}

/// Builds the on-screen envelope of projected box corners (`z` = view
/// distance).
///
/// Edges are clipped to `[0, clip_x] x [0, clip_y]`; the surviving segment
/// ends contribute their position and depth. Screen corners covered by a
/// face are added too, since the nearest visible point of a face can be one
/// of them.
pub fn clipped_envelope(corners: &[Vec3; 8], clip_x: f32, clip_y: f32) -> ScreenEnvelope {
    let points = corners.map(|c| Vec3::new(c.x, c.y, 1.0 / c.z));
    let mut envelope = ScreenEnvelope::EMPTY;

    for [a, b] in BOX_EDGES {
        if let Some((p, q)) = clip_edge(points[a], points[b], clip_x, clip_y) {
            envelope.include(p);
            envelope.include(q);
        }
    }

    for (x, y) in [(0.0, 0.0), (clip_x, 0.0), (0.0, clip_y), (clip_x, clip_y)] {
        let covering = BOX_TRIANGLES
            .iter()
            .filter_map(|&[a, b, c]| depth_at(x, y, points[a], points[b], points[c]))
            .fold(None, |nearest: Option<f32>, d| Some(nearest.map_or(d, |n| n.max(d))));
        if let Some(depth) = covering {
            envelope.include(Vec3::new(x, y, depth));
        }
    }

    envelope
}

/// Cohen-Sutherland clip of one segment. `z` is interpolated with the same
/// ratio as the moved coordinate.
fn clip_edge(mut a: Vec3, mut b: Vec3, clip_x: f32, clip_y: f32) -> Option<(Vec3, Vec3)> {
    let mut code_a = OutCode::compute(a.x, a.y, clip_x, clip_y);
    let mut code_b = OutCode::compute(b.x, b.y, clip_x, clip_y);

    // every pass moves one end onto a screen border, four borders in total
    for _ in 0..8 {
        if (code_a | code_b).is_inside() {
            return Some((a, b));
        }
        if !(code_a & code_b).is_inside() {
            return None;
        }

        let outside = if code_a.is_inside() { code_b } else { code_a };
        let (ratio, x, y) = if outside.contains(OutCode::ABOVE) {
            let r = (clip_y - a.y) / (b.y - a.y);
            (r, a.x + (b.x - a.x) * r, clip_y)
        } else if outside.contains(OutCode::BELOW) {
            let r = -a.y / (b.y - a.y);
            (r, a.x + (b.x - a.x) * r, 0.0)
        } else if outside.contains(OutCode::RIGHT) {
            let r = (clip_x - a.x) / (b.x - a.x);
            (r, clip_x, a.y + (b.y - a.y) * r)
        } else {
            let r = -a.x / (b.x - a.x);
            (r, 0.0, a.y + (b.y - a.y) * r)
        };
        let p = Vec3::new(x, y, a.z + (b.z - a.z) * ratio);

        if outside == code_a {
            a = p;
            code_a = OutCode::compute(a.x, a.y, clip_x, clip_y);
        } else {
            b = p;
            code_b = OutCode::compute(b.x, b.y, clip_x, clip_y);
        }
    }
    None
}

/// Depth of triangle `(a, b, c)` at screen point `(x, y)`, if it covers it.
fn depth_at(x: f32, y: f32, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let area = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if area.abs() < f32::EPSILON {
        return None;
    }
    let wa = ((b.x - x) * (c.y - y) - (b.y - y) * (c.x - x)) / area;
    let wb = ((c.x - x) * (a.y - y) - (c.y - y) * (a.x - x)) / area;
    let wc = 1.0 - wa - wb;
    (wa >= 0.0 && wb >= 0.0 && wc >= 0.0).then(|| wa * a.z + wb * b.z + wc * c.z)
}
