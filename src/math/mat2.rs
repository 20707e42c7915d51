//! 2x2 matrix, stored as `data[row][col]` like [`Mat4`](super::mat4::Mat4).

use std::ops::Mul;

use super::vec2::Vec2;
use super::MATRIX_EPSILON;
use crate::error::{OcclusionError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    data: [[f32; 2]; 2],
}

impl Mat2 {
    pub const IDENTITY: Self = Self::new([[1.0, 0.0], [0.0, 1.0]]);

    pub const fn new(data: [[f32; 2]; 2]) -> Self {
        Self { data }
    }

    pub fn determinant(&self) -> f32 {
        self.data[0][0] * self.data[1][1] - self.data[0][1] * self.data[1][0]
    }

    pub fn transpose(&self) -> Self {
        Self::new([
            [self.data[0][0], self.data[1][0]],
            [self.data[0][1], self.data[1][1]],
        ])
    }

    /// Inverts the matrix, failing on a (near) singular one.
    pub fn invert(&self) -> Result<Self> {
        let determinant = self.determinant();
        if determinant.abs() < MATRIX_EPSILON {
            return Err(OcclusionError::SingularMatrix { determinant });
        }

        let inv_det = 1.0 / determinant;
        Ok(Self::new([
            [self.data[1][1] * inv_det, -self.data[0][1] * inv_det],
            [-self.data[1][0] * inv_det, self.data[0][0] * inv_det],
        ]))
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row][col]
    }
}

impl Mul<Mat2> for Mat2 {
    type Output = Mat2;

    fn mul(self, rhs: Mat2) -> Self::Output {
        let mut result = [[0.0f32; 2]; 2];
        for (row, out) in result.iter_mut().enumerate() {
            for (col, value) in out.iter_mut().enumerate() {
                *value = self.data[row][0] * rhs.data[0][col] + self.data[row][1] * rhs.data[1][col];
            }
        }
        Mat2::new(result)
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Self::Output {
        Vec2::new(
            self.data[0][0] * v.x + self.data[0][1] * v.y,
            self.data[1][0] * v.x + self.data[1][1] * v.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn invert_uniform_scale() {
        let m = Mat2::new([[2.0, 0.0], [0.0, 2.0]]);
        let inv = m.invert().unwrap();
        assert_eq!(inv, Mat2::new([[0.5, 0.0], [0.0, 0.5]]));
    }

    #[test]
    fn invert_singular_fails() {
        let m = Mat2::new([[1.0, 1.0], [1.0, 1.0]]);
        assert!(matches!(
            m.invert(),
            Err(OcclusionError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = Mat2::new([[3.0, 1.0], [2.0, 4.0]]);
        let product = m * m.invert().unwrap();
        for row in 0..2 {
            for col in 0..2 {
                assert_relative_eq!(
                    product.get(row, col),
                    Mat2::IDENTITY.get(row, col),
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn transpose_swaps_off_diagonal() {
        let m = Mat2::new([[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(m.transpose(), Mat2::new([[1.0, 3.0], [2.0, 4.0]]));
        assert_eq!(m * Vec2::new(1.0, 1.0), Vec2::new(3.0, 7.0));
    }
}
