//! Bounding volumes tested against the depth buffer.

use crate::math::vec3::Vec3;

/// Box corner layout used by [`box_corners`]:
///
/// ```text
///        1-------2        top ring (+y): 0 1 2 3
///       /|      /|        bottom ring (-y): 4 5 6 7
///      0-------3 |
///      | 5-----|-6        -z is "back" (1 2 5 6)
///      |/      |/         +z is "front" (0 3 4 7)
///      4-------7
/// ```
pub const BOX_CORNER_SIGNS: [[f32; 3]; 8] = [
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
];

/// The 12 box edges as corner index pairs.
pub const BOX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// The 12 box triangles, counter-clockwise when seen from outside.
pub const BOX_TRIANGLES: [[usize; 3]; 12] = [
    // top (+y)
    [0, 3, 2],
    [0, 2, 1],
    // bottom (-y)
    [4, 5, 6],
    [4, 6, 7],
    // front (+z)
    [4, 7, 3],
    [4, 3, 0],
    // back (-z)
    [5, 1, 2],
    [5, 2, 6],
    // right (+x)
    [7, 6, 2],
    [7, 2, 3],
    // left (-x)
    [5, 4, 0],
    [5, 0, 1],
];

/// The 8 corners of a box in the layout of [`BOX_CORNER_SIGNS`].
pub fn box_corners(center: Vec3, extents: Vec3) -> [Vec3; 8] {
    BOX_CORNER_SIGNS.map(|[sx, sy, sz]| {
        center + Vec3::new(sx * extents.x, sy * extents.y, sz * extents.z)
    })
}

/// Model-space bounding volume attached to an occludee.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundingVolume {
    /// Sphere around `center` with the given unscaled `radius`.
    Sphere { center: Vec3, radius: f32 },
    /// Box around `center` with half-extents along the local axes.
    Box { center: Vec3, extents: Vec3 },
}

impl BoundingVolume {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            center: Vec3::ZERO,
            radius,
        }
    }

    pub fn cuboid(extents: Vec3) -> Self {
        Self::Box {
            center: Vec3::ZERO,
            extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Sphere { center, .. } | Self::Box { center, .. } => center,
        }
    }

    /// World radius of a sphere bound under the given entity scale.
    ///
    /// Non-uniform scales use the largest axis, so the result always encloses
    /// the scaled geometry.
    pub fn scaled_radius(radius: f32, scale: Vec3) -> f32 {
        (scale.max_abs_component() * radius).abs()
    }
}
