//! Occlusion renderer settings.

use crate::error::{OcclusionError, Result};

/// How box bounds are tested against the depth buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxTest {
    /// Rasterize the front faces of the projected box and test every pixel.
    #[default]
    Rasterized,
    /// Clip the box edges to the screen and test the enclosing rectangle
    /// against the nearest corner depth. Cheaper and coarser.
    ClippedRectangle,
}

impl std::fmt::Display for BoxTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxTest::Rasterized => write!(f, "Rasterized"),
            BoxTest::ClippedRectangle => write!(f, "ClippedRectangle"),
        }
    }
}

/// Settings for [`crate::SoftwareRenderer`].
///
/// ```ignore
/// let config = OcclusionConfig::new(256, 128)
///     .with_box_test(BoxTest::ClippedRectangle)
///     .with_backface_culling(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionConfig {
    pub width: u32,
    pub height: u32,
    pub box_test: BoxTest,
    /// Shrink occluder edges inward (ceil top, floor bottom) so an occluder
    /// never covers a row it only partially overlaps.
    pub conservative_occluders: bool,
    /// Skip occluder triangles facing away from the camera.
    pub backface_culling: bool,
    /// A sphere silhouette with at most this many rows on each side of its
    /// center is tested on its middle row only.
    pub min_silhouette_rows: u32,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 128,
            box_test: BoxTest::default(),
            conservative_occluders: false,
            backface_culling: true,
            min_silhouette_rows: 1,
        }
    }
}

impl OcclusionConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_box_test(mut self, box_test: BoxTest) -> Self {
        self.box_test = box_test;
        self
    }

    pub fn with_conservative_occluders(mut self, enabled: bool) -> Self {
        self.conservative_occluders = enabled;
        self
    }

    pub fn with_backface_culling(mut self, enabled: bool) -> Self {
        self.backface_culling = enabled;
        self
    }

    pub fn with_min_silhouette_rows(mut self, rows: u32) -> Self {
        self.min_silhouette_rows = rows;
        self
    }

    /// Both dimensions need at least two pixels so `clip_x`/`clip_y` are
    /// non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 2 {
            return Err(OcclusionError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
