//! 4x4 transformation matrix using column-major convention.
//!
//! # Convention
//! - Vectors are **column vectors** on the right: `Mat4 * Vec`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - View space is right-handed with the camera looking down **-Z**
//!
//! # Example
//! ```ignore
//! let model_view_projection = Mat4::combine(projection, Mat4::combine(view, world));
//! let clip = model_view_projection.apply_post(Vec4::point(1.0, 2.0, 3.0));
//! ```

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;
use super::MATRIX_EPSILON;
use crate::error::{OcclusionError, Result};

/// 4x4 matrix stored as `data[row][col]` with column-major convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const fn new(data: [[f32; 4]; 4]) -> Self {
        Mat4 { data }
    }

    pub const fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    ///
    /// Translation is stored in the last column (column-major convention).
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a scale matrix.
    pub fn scaling(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around the X axis (right-handed).
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around the Y axis (right-handed).
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Counter-clockwise rotation around the Z axis (right-handed).
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates an OpenGL-style perspective matrix for a right-handed view space.
    ///
    /// The resulting clip-space `w` equals the view-space distance `-z`.
    pub fn perspective_rh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let a = (far + near) / (near - far);
        let b = 2.0 * far * near / (near - far);
        Mat4::new([
            [f / aspect_ratio, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, a, b],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Creates a right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        Self::new([
            [right.x, right.y, right.z, -right.dot(eye)],
            [up.x, up.y, up.z, -up.dot(eye)],
            [-forward.x, -forward.y, -forward.z, forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Matrix product `a * b`: the returned matrix applies `b` first, then `a`.
    pub fn combine(a: Mat4, b: Mat4) -> Self {
        a * b
    }

    /// Transforms a homogeneous vector by this matrix.
    #[inline]
    pub fn apply_post(&self, v: Vec4) -> Vec4 {
        *self * v
    }

    pub fn transpose(&self) -> Self {
        let mut data = [[0.0f32; 4]; 4];
        for (row, out) in data.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = self.data[col][row];
            }
        }
        Mat4 { data }
    }

    /// Length of the longest basis vector, i.e. the largest axis scale.
    pub fn max_axis_scale(&self) -> f32 {
        (0..3)
            .map(|col| {
                Vec3::new(self.data[0][col], self.data[1][col], self.data[2][col]).magnitude()
            })
            .fold(0.0, f32::max)
    }

    /// Computes the inverse of the matrix.
    ///
    /// Fails with [`OcclusionError::SingularMatrix`] when the determinant
    /// magnitude is below [`MATRIX_EPSILON`].
    pub fn invert(&self) -> Result<Mat4> {
        let m = &self.data;

        // 2x2 sub-determinants of the lower two rows
        let s0 = m[2][2] * m[3][3] - m[2][3] * m[3][2];
        let s1 = m[2][1] * m[3][3] - m[2][3] * m[3][1];
        let s2 = m[2][1] * m[3][2] - m[2][2] * m[3][1];
        let s3 = m[2][0] * m[3][3] - m[2][3] * m[3][0];
        let s4 = m[2][0] * m[3][2] - m[2][2] * m[3][0];
        let s5 = m[2][0] * m[3][1] - m[2][1] * m[3][0];

        // ...and of the upper two rows
        let u0 = m[0][2] * m[1][3] - m[0][3] * m[1][2];
        let u1 = m[0][1] * m[1][3] - m[0][3] * m[1][1];
        let u2 = m[0][1] * m[1][2] - m[0][2] * m[1][1];
        let u3 = m[0][0] * m[1][3] - m[0][3] * m[1][0];
        let u4 = m[0][0] * m[1][2] - m[0][2] * m[1][0];
        let u5 = m[0][0] * m[1][1] - m[0][1] * m[1][0];

        let determinant = u5 * s0 - u4 * s1 + u3 * s2 + u2 * s3 - u1 * s4 + u0 * s5;
        if determinant.abs() < MATRIX_EPSILON {
            return Err(OcclusionError::SingularMatrix { determinant });
        }
        let inv_det = 1.0 / determinant;

        let adjugate = [
            [
                m[1][1] * s0 - m[1][2] * s1 + m[1][3] * s2,
                -m[0][1] * s0 + m[0][2] * s1 - m[0][3] * s2,
                m[3][1] * u0 - m[3][2] * u1 + m[3][3] * u2,
                -m[2][1] * u0 + m[2][2] * u1 - m[2][3] * u2,
            ],
            [
                -m[1][0] * s0 + m[1][2] * s3 - m[1][3] * s4,
                m[0][0] * s0 - m[0][2] * s3 + m[0][3] * s4,
                -m[3][0] * u0 + m[3][2] * u3 - m[3][3] * u4,
                m[2][0] * u0 - m[2][2] * u3 + m[2][3] * u4,
            ],
            [
                m[1][0] * s1 - m[1][1] * s3 + m[1][3] * s5,
                -m[0][0] * s1 + m[0][1] * s3 - m[0][3] * s5,
                m[3][0] * u1 - m[3][1] * u3 + m[3][3] * u5,
                -m[2][0] * u1 + m[2][1] * u3 - m[2][3] * u5,
            ],
            [
                -m[1][0] * s2 + m[1][1] * s4 - m[1][2] * s5,
                m[0][0] * s2 - m[0][1] * s4 + m[0][2] * s5,
                -m[3][0] * u2 + m[3][1] * u4 - m[3][2] * u5,
                m[2][0] * u2 - m[2][1] * u4 + m[2][2] * u5,
            ],
        ];

        let mut data = [[0.0f32; 4]; 4];
        for (row, out) in data.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = adjugate[row][col] * inv_det;
            }
        }
        Ok(Mat4 { data })
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// For column-major convention, `A * B * v` applies B first, then A.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for (row, out) in result.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = self.data[row][0] * rhs.data[0][col]
                    + self.data[row][1] * rhs.data[1][col]
                    + self.data[row][2] * rhs.data[2][col]
                    + self.data[row][3] * rhs.data[3][col];
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Mat4 * Vec4 (column vector).
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let row = |r: usize| {
            self.data[r][0] * v.x + self.data[r][1] * v.y + self.data[r][2] * v.z + self.data[r][3] * v.w
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat_eq(a: &Mat4, b: &Mat4) {
        for row in 0..4 {
            for col in 0..4 {
                assert_relative_eq!(a.get(row, col), b.get(row, col), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn invert_round_trips_to_identity() {
        let m = Mat4::translation(1.0, -2.0, 3.0)
            * Mat4::rotation_y(0.7)
            * Mat4::rotation_x(-0.3)
            * Mat4::scaling(2.0, 0.5, 1.5);
        let inv = m.invert().unwrap();
        assert_mat_eq(&(m * inv), &Mat4::identity());
        assert_mat_eq(&(inv * m), &Mat4::identity());
    }

    #[test]
    fn invert_singular_fails() {
        let flat = Mat4::scaling(1.0, 0.0, 1.0);
        assert!(matches!(
            flat.invert(),
            Err(OcclusionError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn transpose_is_involution() {
        let m = Mat4::translation(4.0, 5.0, 6.0);
        assert_eq!(m.transpose().get(3, 0), 4.0);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn perspective_w_is_view_distance() {
        let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let clip = projection.apply_post(Vec4::point(0.5, -0.5, -4.0));
        assert_relative_eq!(clip.w, 4.0);
        let ndc = clip.perspective_divide();
        assert_relative_eq!(ndc.x, 0.125, epsilon = 1e-6);
        assert_relative_eq!(ndc.y, -0.125, epsilon = 1e-6);
    }

    #[test]
    fn look_at_moves_target_onto_negative_z() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
        let target = view.apply_post(Vec4::point(0.0, 0.0, 0.0));
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(target.z, -5.0, epsilon = 1e-6);

        let right = view.apply_post(Vec4::point(1.0, 0.0, 0.0));
        assert_relative_eq!(right.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn max_axis_scale_ignores_rotation() {
        let m = Mat4::rotation_z(1.1) * Mat4::scaling(1.0, 3.0, 2.0);
        assert_relative_eq!(m.max_axis_scale(), 3.0, epsilon = 1e-5);
    }
}
