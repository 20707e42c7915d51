//! Triangle rasterization into and against the depth buffer.
//!
//! A rasterizer has two jobs, one per frame phase:
//! - write occluder triangles into a [`DepthTarget`]
//! - test occludee triangles against a [`DepthView`]
//!
//! Available algorithms:
//! - [`ScanlineRasterizer`]: long/short edge walk with vertical coherence

mod scanline;

pub use scanline::ScanlineRasterizer;

use super::framebuffer::{DepthTarget, DepthView};
use crate::math::vec3::Vec3;

/// A triangle ready for rasterization in screen space.
///
/// `x` and `y` are pixel coordinates, `z` is the view distance `w` of the
/// vertex (not yet inverted).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub points: [Vec3; 3],
}

impl Triangle {
    pub fn new(points: [Vec3; 3]) -> Self {
        Self { points }
    }
}

/// Trait for triangle rasterization algorithms.
pub trait Rasterizer {
    /// Writes the triangle's depth wherever it is nearer than the stored
    /// value.
    fn fill_triangle(&self, triangle: &Triangle, buffer: &mut DepthTarget);

    /// Returns true when no pixel of the triangle is nearer than the stored
    /// depth.
    fn is_triangle_occluded(&self, triangle: &Triangle, buffer: &DepthView) -> bool;
}
