//! Error type shared by the occlusion pipeline.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OcclusionError {
    /// Determinant magnitude fell below [`crate::math::MATRIX_EPSILON`].
    #[error("matrix is singular (determinant {determinant})")]
    SingularMatrix { determinant: f32 },
    #[error("invalid buffer dimensions {width}x{height}, both must be at least 2")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid occluder mesh: {0}")]
    InvalidMesh(String),
    #[error("failed to load occluder mesh from {path}: {source}")]
    ObjLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("failed to export depth image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, OcclusionError>;
