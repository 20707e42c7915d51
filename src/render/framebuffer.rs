//! Depth buffer view with 2D pixel access.
//!
//! [`FrameBuffer`] wraps a depth slice with its dimensions. It is a borrowed
//! view, not an owning type: the occluder pass writes through a
//! [`DepthTarget`] (mutable slice) and the occludee pass reads through a
//! [`DepthView`] (shared slice), so the two can never overlap.
//!
//! # Depth Buffer
//!
//! The buffer stores 1/w values (reciprocal of clip-space W) for each pixel.
//! Using 1/w instead of z because it can be linearly interpolated in screen
//! space. Larger values are closer to the camera and 0.0 is infinitely far.
//! Pixel `(x, y)` lives at `y * width + x` with y growing upwards.

/// Span in screen space: `(x, depth)` at both ends, in any order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub xa: f32,
    pub za: f32,
    pub xb: f32,
    pub zb: f32,
}

impl Span {
    pub fn new(xa: f32, za: f32, xb: f32, zb: f32) -> Self {
        Self { xa, za, xb, zb }
    }

    /// Left-to-right with depths swapped alongside.
    fn ordered(self) -> Self {
        if self.xa <= self.xb {
            self
        } else {
            Self::new(self.xb, self.zb, self.xa, self.za)
        }
    }
}

/// Pixel range of a span after horizontal clipping, with depth at `left`
/// and its per-pixel increment.
struct ClippedSpan {
    left: i32,
    right: i32,
    depth: f32,
    step: f32,
}

pub struct FrameBuffer<B> {
    depth: B,
    width: u32,
    height: u32,
}

/// Writable view used while rasterizing occluders.
pub type DepthTarget<'a> = FrameBuffer<&'a mut [f32]>;
/// Read-only view used while testing occludees.
pub type DepthView<'a> = FrameBuffer<&'a [f32]>;

impl<B: AsRef<[f32]>> FrameBuffer<B> {
    /// # Panics
    /// Panics in debug builds if the slice length doesn't match width * height
    pub fn new(depth: B, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            depth.as_ref().len(),
            (width * height) as usize,
            "Depth buffer size doesn't match dimensions"
        );
        Self {
            depth,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest pixel column, as a float.
    #[inline]
    pub fn clip_x(&self) -> f32 {
        (self.width - 1) as f32
    }

    /// Largest pixel row, as a float.
    #[inline]
    pub fn clip_y(&self) -> f32 {
        (self.height - 1) as f32
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Stored depth at (x, y), or None if out of bounds.
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> Option<f32> {
        self.contains(x, y)
            .then(|| self.depth.as_ref()[self.index(x, y)])
    }

    /// Point test at an already rounded pixel position.
    ///
    /// A point outside the screen counts as occluded; the caller covers the
    /// area between its points with row tests. Like the row and span tests,
    /// a stored depth equal to `depth` occludes.
    pub fn is_point_occluded(&self, x: f32, y: f32, depth: f32) -> bool {
        match self.sample(x as i32, y as i32) {
            Some(stored) if x >= 0.0 && y >= 0.0 => depth <= stored,
            _ => true,
        }
    }

    /// Tests pixels `x0..=x1` of row `y` against a constant depth.
    ///
    /// The range is clamped to the screen. Returns false on the first pixel
    /// whose stored depth is farther than `depth`.
    pub fn is_row_occluded(&self, y: i32, x0: i32, x1: i32, depth: f32) -> bool {
        if y < 0 || y >= self.height as i32 {
            return true;
        }
        let left = x0.max(0);
        let right = x1.min(self.width as i32 - 1);
        if left > right {
            return true;
        }
        let row = &self.depth.as_ref()[self.index(left, y)..=self.index(right, y)];
        row.iter().all(|&stored| stored >= depth)
    }

    /// Occludee span test: floors the left end, ceils the right end and
    /// reports whether every covered pixel is at least as near as the span.
    pub fn is_span_occluded(&self, y: i32, span: Span) -> bool {
        if y < 0 || y >= self.height as i32 {
            return true;
        }
        let span = span.ordered();
        let span = Span::new(span.xa.floor(), span.za, span.xb.ceil(), span.zb);
        let Some(clipped) = self.clip_span(span) else {
            return true;
        };

        let base = self.index(0, y);
        let depth = self.depth.as_ref();
        let mut z = clipped.depth;
        for x in clipped.left..=clipped.right {
            if z > depth[base + x as usize] {
                return false;
            }
            z += clipped.step;
        }
        true
    }

    /// Rejects spans entirely off-screen and clips the rest to
    /// `[0, clip_x]`, re-interpolating depth at the cut ends.
    fn clip_span(&self, span: Span) -> Option<ClippedSpan> {
        let clip_x = self.clip_x();
        if span.xb < 0.0 || span.xa > clip_x {
            return None;
        }

        let width = span.xb - span.xa;
        let left = span.xa.max(0.0);
        let right = span.xb.min(clip_x);
        let (z_left, z_right) = if width > 0.0 {
            let slope = (span.zb - span.za) / width;
            (
                span.za + slope * (left - span.xa),
                span.za + slope * (right - span.xa),
            )
        } else {
            (span.za, span.zb)
        };
        let step = if right > left {
            (z_right - z_left) / (right - left)
        } else {
            0.0
        };

        Some(ClippedSpan {
            left: left as i32,
            right: right as i32,
            depth: z_left,
            step,
        })
    }
}

impl<B: AsRef<[f32]> + AsMut<[f32]>> FrameBuffer<B> {
    /// Occluder span write: rounds both ends to the nearest pixel and keeps
    /// the larger (nearer) depth per pixel.
    pub fn write_span(&mut self, y: i32, span: Span) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let span = Span::new(span.xa.round(), span.za, span.xb.round(), span.zb).ordered();
        let Some(clipped) = self.clip_span(span) else {
            return;
        };

        let base = self.index(0, y);
        let depth = self.depth.as_mut();
        let mut z = clipped.depth;
        for x in clipped.left..=clipped.right {
            let stored = &mut depth[base + x as usize];
            if z > *stored {
                *stored = z;
            }
            z += clipped.step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn write_span_clips_and_interpolates() {
        let mut data = vec![0.0; 8 * 2];
        let mut target = FrameBuffer::new(data.as_mut_slice(), 8, 2);
        // from x = -4 (depth 0) to x = 4 (depth 1), written right to left
        target.write_span(1, Span::new(4.0, 1.0, -4.0, 0.0));

        let view = FrameBuffer::new(data.as_slice(), 8, 2);
        assert_relative_eq!(view.sample(0, 1).unwrap(), 0.5);
        assert_relative_eq!(view.sample(4, 1).unwrap(), 1.0);
        assert_eq!(view.sample(5, 1), Some(0.0));
        assert_eq!(view.sample(0, 0), Some(0.0));
    }

    #[test]
    fn write_keeps_nearest() {
        let mut data = vec![0.0; 4];
        let mut target = FrameBuffer::new(data.as_mut_slice(), 4, 1);
        target.write_span(0, Span::new(0.0, 0.5, 3.0, 0.5));
        target.write_span(0, Span::new(0.0, 0.25, 3.0, 0.25));
        target.write_span(0, Span::new(1.0, 0.75, 2.0, 0.75));
        assert_eq!(data, vec![0.5, 0.75, 0.75, 0.5]);
    }

    #[test]
    fn span_test_short_circuits_on_visible_pixel() {
        let data = vec![1.0, 1.0, 0.2, 1.0];
        let view = FrameBuffer::new(data.as_slice(), 4, 1);
        assert!(view.is_span_occluded(0, Span::new(0.0, 0.5, 1.0, 0.5)));
        assert!(!view.is_span_occluded(0, Span::new(0.0, 0.5, 3.0, 0.5)));
        // off-screen spans and rows never reach the buffer
        assert!(view.is_span_occluded(0, Span::new(-9.0, 9.0, -2.0, 9.0)));
        assert!(view.is_span_occluded(3, Span::new(0.0, 9.0, 3.0, 9.0)));
    }

    #[test]
    fn occludee_span_grows_outward() {
        let data = vec![1.0, 0.0, 0.0, 1.0];
        let view = FrameBuffer::new(data.as_slice(), 4, 1);
        // 0.6..2.4 grows to 0..3, reaching the exposed pixels
        assert!(!view.is_span_occluded(0, Span::new(2.4, 0.5, 0.6, 0.5)));
    }

    #[test]
    fn point_and_row_tests() {
        let data = vec![1.0, 1.0, 1.0, 0.0];
        let view = FrameBuffer::new(data.as_slice(), 2, 2);
        assert!(view.is_point_occluded(0.0, 0.0, 0.5));
        assert!(!view.is_point_occluded(1.0, 1.0, 0.5));
        assert!(view.is_point_occluded(-1.0, 0.0, 9.0));
        assert!(view.is_point_occluded(0.0, 2.0, 9.0));

        assert!(view.is_row_occluded(0, -5, 5, 0.5));
        assert!(!view.is_row_occluded(1, -5, 5, 0.5));
        assert!(view.is_row_occluded(1, 0, 0, 0.5));
    }

    #[test]
    fn equal_depth_occludes_in_every_test() {
        let data = vec![0.5, 0.5, 0.5, 0.5];
        let view = FrameBuffer::new(data.as_slice(), 4, 1);
        assert!(view.is_point_occluded(1.0, 0.0, 0.5));
        assert!(view.is_row_occluded(0, 0, 3, 0.5));
        assert!(view.is_span_occluded(0, Span::new(0.0, 0.5, 3.0, 0.5)));

        assert!(!view.is_point_occluded(1.0, 0.0, 0.51));
        assert!(!view.is_row_occluded(0, 0, 3, 0.51));
        assert!(!view.is_span_occluded(0, Span::new(0.0, 0.51, 3.0, 0.51)));
    }
}
