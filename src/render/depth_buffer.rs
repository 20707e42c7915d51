//! Owning depth buffer.
//!
//! One allocation holds two planes of `width * height` floats: the live depth
//! plane followed by a clear plane of zeros. Clearing copies the clear plane
//! over the depth plane.

use std::path::Path;

use image::{GrayImage, Luma};

use super::framebuffer::{DepthTarget, DepthView, FrameBuffer};
use crate::error::{OcclusionError, Result};

pub struct DepthBuffer {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(OcclusionError::InvalidDimensions { width, height });
        }
        let size = (width * height) as usize;
        Ok(Self {
            data: vec![0.0; size * 2], // 0.0 = infinitely far (1/w where w -> infinity)
            width,
            height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn plane_len(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Resets every pixel to infinitely far.
    pub fn clear(&mut self) {
        let n = self.plane_len();
        self.data.copy_within(n..2 * n, 0);
    }

    /// The depth plane, row by row from the bottom of the screen.
    pub fn depth_data(&self) -> &[f32] {
        &self.data[..self.plane_len()]
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        (x < self.width && y < self.height)
            .then(|| self.data[(y * self.width + x) as usize])
    }

    pub fn target(&mut self) -> DepthTarget<'_> {
        let n = self.plane_len();
        FrameBuffer::new(&mut self.data[..n], self.width, self.height)
    }

    pub fn view(&self) -> DepthView<'_> {
        FrameBuffer::new(self.depth_data(), self.width, self.height)
    }

    /// Grayscale snapshot, nearest pixel white, untouched pixels black.
    ///
    /// Values are normalized by the nearest depth in the buffer and rows are
    /// flipped so the image reads top-down.
    pub fn to_image(&self) -> GrayImage {
        let depth = self.depth_data();
        let nearest = depth.iter().copied().fold(0.0f32, f32::max);
        let scale = if nearest > 0.0 { 255.0 / nearest } else { 0.0 };

        GrayImage::from_fn(self.width, self.height, |x, row| {
            let y = self.height - 1 - row;
            let d = depth[(y * self.width + x) as usize];
            Luma([(d * scale).clamp(0.0, 255.0) as u8])
        })
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_image().save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::framebuffer::Span;

    #[test]
    fn rejects_tiny_buffers() {
        assert!(DepthBuffer::new(1, 8).is_err());
        assert!(DepthBuffer::new(8, 0).is_err());
    }

    #[test]
    fn clear_resets_written_depth() {
        let mut buffer = DepthBuffer::new(4, 2).unwrap();
        buffer.target().write_span(1, Span::new(0.0, 0.5, 3.0, 0.5));
        assert_eq!(buffer.get(2, 1), Some(0.5));

        buffer.clear();
        assert!(buffer.depth_data().iter().all(|&d| d == 0.0));
        assert_eq!(buffer.depth_data().len(), 8);
        assert_eq!(buffer.get(4, 0), None);
    }

    #[test]
    fn image_is_flipped_and_normalized() {
        let mut buffer = DepthBuffer::new(2, 2).unwrap();
        buffer.target().write_span(0, Span::new(0.0, 0.5, 0.0, 0.5));
        buffer.target().write_span(1, Span::new(1.0, 0.25, 1.0, 0.25));

        let image = buffer.to_image();
        // screen row 0 is the bottom image row
        assert_eq!(image.get_pixel(0, 1)[0], 255);
        assert_eq!(image.get_pixel(1, 0)[0], 127);
        assert_eq!(image.get_pixel(0, 0)[0], 0);
    }
}
