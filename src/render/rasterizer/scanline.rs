//! Scanline-based triangle rasterization.
//!
//! This module implements triangle rasterization with the long/short edge
//! walk. It is shared by both frame phases: occluders write depth span by
//! span, occludees test spans and stop at the first visible pixel.
//!
//! # Algorithm Overview
//!
//! 1. **Build edges** `(a, b)`, `(b, c)`, `(c, a)`, each stored top-down
//! 2. **Pick the long edge**, the one spanning the most scanlines. The other
//!    two are the short edges; together they span the same rows.
//! 3. **Reject early** when the long edge is entirely above, below, left or
//!    right of the screen
//! 4. **Walk** each (long, short) pair row by row and process the span
//!    between them
//!
//! ```text
//!        a
//!        |\
//!        | \   short (a, b)
//!   long |  b
//!        | /   short (b, c)
//!        |/
//!        c
//! ```
//!
//! # Vertical Coherence
//!
//! Rather than computing x and depth from y on every row, each edge keeps a
//! running value and adds a per-row increment:
//!
//! ```text
//! dx = (x1 - x0) / (y1 - y0)
//! dz = (z1 - z0) / (y1 - y0)
//! ```
//!
//! The long edge is positioned at the short edge's first row once per pair
//! (`coef = (short.y0 - long.y0) / long_dy`). Increments are derived after
//! rounding so they match the rounded endpoints exactly.
//!
//! # Depth
//!
//! Edge `z` arrives as the view distance `w` and is inverted to `1/w` before
//! the walk, since `1/w` is linear in screen space.
//!
//! # Vertical Clipping
//!
//! A walk that starts above row 0 skips forward by advancing every running
//! value by `-start` rows; it ends at `min(short.y1, clip_y)`.

use std::ops::ControlFlow;

use super::{Rasterizer, Triangle};
use crate::render::edge::{Edge, EdgeRounding};
use crate::render::framebuffer::{DepthTarget, DepthView, Span};

/// Long/short edge scanline rasterizer.
///
/// Occluder edges use the configured rounding (nearest pixel by default,
/// or shrinking for conservative occluders); occludee edges always grow
/// outwards so a test never under-estimates exposure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineRasterizer {
    occluder_rounding: EdgeRounding,
}

impl ScanlineRasterizer {
    /// Creates a rasterizer rounding occluder edges to the nearest pixel.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_occluder_rounding(rounding: EdgeRounding) -> Self {
        Self {
            occluder_rounding: rounding,
        }
    }

    pub fn occluder_rounding(&self) -> EdgeRounding {
        self.occluder_rounding
    }

    /// Walks every row of the triangle, calling `span` with the row and the
    /// span between the long edge and the active short edge.
    ///
    /// Stops as soon as `span` breaks.
    fn walk<F>(
        triangle: &Triangle,
        rounding: EdgeRounding,
        clip_x: f32,
        clip_y: f32,
        mut span: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(i32, Span) -> ControlFlow<()>,
    {
        let [a, b, c] = triangle.points;
        let mut edges = [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)];

        let mut long_index = 0;
        for i in 1..3 {
            if edges[i].dy() > edges[long_index].dy() {
                long_index = i;
            }
        }
        let long = edges[long_index];

        // vertical rejection
        if long.y1 < 0.0 || long.y0 > clip_y {
            return ControlFlow::Continue(());
        }

        // horizontal rejection, on whichever side the long edge lies. The
        // vertex shared by both short edges is the one not on the long edge.
        let apex = triangle.points[(long_index + 2) % 3];
        let long_on_right = long.dy() > 0.0
            && long.x0 + (long.x1 - long.x0) * (apex.y - long.y0) / long.dy() > apex.x;
        if long_on_right {
            if long.x0 < 0.0 && long.x1 < 0.0 {
                return ControlFlow::Continue(());
            }
        } else if long.x0 > clip_x && long.x1 > clip_x {
            return ControlFlow::Continue(());
        }

        for edge in &mut edges {
            rounding.apply(edge);
            edge.invert_z();
        }
        let long = edges[long_index];
        let long_dy = long.dy();
        if long_dy <= 0.0 {
            return ControlFlow::Continue(());
        }
        let long_dx = (long.x1 - long.x0) / long_dy;
        let long_dz = (long.z1 - long.z0) / long_dy;

        for short in [edges[(long_index + 1) % 3], edges[(long_index + 2) % 3]] {
            let short_dy = short.dy();
            if short_dy <= 0.0 {
                continue;
            }
            let short_dx = (short.x1 - short.x0) / short_dy;
            let short_dz = (short.z1 - short.z0) / short_dy;

            // position the long edge at the short edge's first row
            let coef = (short.y0 - long.y0) / long_dy;
            let mut long_x = long.x0 + (long.x1 - long.x0) * coef;
            let mut long_z = long.z0 + (long.z1 - long.z0) * coef;
            let mut short_x = short.x0;
            let mut short_z = short.z0;

            let mut y = short.y0 as i32;
            if y < 0 {
                let skip = -y as f32;
                long_x += long_dx * skip;
                long_z += long_dz * skip;
                short_x += short_dx * skip;
                short_z += short_dz * skip;
                y = 0;
            }
            let end = (short.y1.min(clip_y)) as i32;

            while y <= end {
                span(y, Span::new(long_x, long_z, short_x, short_z))?;
                long_x += long_dx;
                long_z += long_dz;
                short_x += short_dx;
                short_z += short_dz;
                y += 1;
            }
        }

        ControlFlow::Continue(())
    }
}

impl Rasterizer for ScanlineRasterizer {
    fn fill_triangle(&self, triangle: &Triangle, buffer: &mut DepthTarget) {
        let (clip_x, clip_y) = (buffer.clip_x(), buffer.clip_y());
        let _ = Self::walk(triangle, self.occluder_rounding, clip_x, clip_y, |y, span| {
            buffer.write_span(y, span);
            ControlFlow::Continue(())
        });
    }

    fn is_triangle_occluded(&self, triangle: &Triangle, buffer: &DepthView) -> bool {
        let visible = Self::walk(
            triangle,
            EdgeRounding::Grow,
            buffer.clip_x(),
            buffer.clip_y(),
            |y, span| {
                if buffer.is_span_occluded(y, span) {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            },
        );
        visible.is_continue()
    }
}
