//! Small fixed-size vector and matrix types used by the occlusion pipeline.

pub mod mat2;
pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

/// Determinant magnitude below which a matrix is treated as singular.
pub const MATRIX_EPSILON: f32 = 1e-6;
