use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

use crate::{RotationTrait, quaternion::Quaternion};

/// A struct representing a 3x3 rotation matrix.
///
/// Unlike a checked rotation, nothing here forces the columns to be unit
/// length. A matrix built from a quaternion that has drifted off unit norm is
/// kept as computed.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationMatrix(pub Matrix3<f64>);

impl RotationMatrix {
    /// Creates a new `RotationMatrix` from its elements in row major order.
    pub fn new(
        e11: f64,
        e12: f64,
        e13: f64,
        e21: f64,
        e22: f64,
        e23: f64,
        e31: f64,
        e32: f64,
        e33: f64,
    ) -> Self {
        Self(Matrix3::new(e11, e12, e13, e21, e22, e23, e31, e32, e33))
    }

    pub fn get_value(&self) -> Matrix3<f64> {
        self.0
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }
}

impl From<Matrix3<f64>> for RotationMatrix {
    fn from(value: Matrix3<f64>) -> Self {
        Self(value)
    }
}

impl From<&Quaternion> for RotationMatrix {
    /// Converts a `Quaternion` into the matrix that rotates by it.
    ///
    /// The raw components are used as given, without normalizing first.
    fn from(q: &Quaternion) -> Self {
        let (r, i, j, k) = (q.s, q.x, q.y, q.z);

        RotationMatrix::new(
            1.0 - 2.0 * (j * j + k * k),
            2.0 * (i * j - k * r),
            2.0 * (i * k + j * r),
            2.0 * (i * j + k * r),
            1.0 - 2.0 * (i * i + k * k),
            2.0 * (j * k - i * r),
            2.0 * (i * k - j * r),
            2.0 * (i * r + j * k),
            1.0 - 2.0 * (i * i + j * j),
        )
    }
}

impl From<Quaternion> for RotationMatrix {
    fn from(q: Quaternion) -> Self {
        RotationMatrix::from(&q)
    }
}

impl RotationTrait for RotationMatrix {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0.transpose() * v
    }

    fn identity() -> Self {
        Self(Matrix3::identity())
    }

    fn inv(&self) -> Self {
        self.transpose()
    }
}

impl Mul<RotationMatrix> for RotationMatrix {
    type Output = Self;

    fn mul(self, rhs: RotationMatrix) -> Self {
        Self(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_identity_quaternion() {
        let m = RotationMatrix::from(Quaternion::IDENTITY);
        assert_eq!(m, RotationMatrix::identity());
    }

    #[test]
    fn test_matrix_matches_quaternion_rotate() {
        let q = Quaternion::new(0.3, -0.5, 0.7, 0.1).normalize();
        let m = RotationMatrix::from(&q);
        let v = Vector3::new(1.0, -2.0, 0.5);

        let a = m.rotate(&v);
        let b = q.rotate(&v);
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = TOL);
        }

        let a = m.transform(&v);
        let b = q.transform(&v);
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = TOL);
        }
    }

    #[test]
    fn test_rotation_about_x() {
        // 90 degrees about x takes y to z
        let q = Quaternion::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0);
        let m = RotationMatrix::from(q);
        let result = m.rotate(&Vector3::new(0.0, 1.0, 0.0));

        assert_abs_diff_eq!(result[0], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(result[1], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(result[2], 1.0, epsilon = TOL);
    }

    #[test]
    fn test_unnormalized_quaternion_is_not_corrected() {
        // twice the identity, 1 - 2*(0) stays 1 on the diagonal but nothing is rescaled
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        assert_eq!(RotationMatrix::from(q), RotationMatrix::identity());

        // a scaled non-trivial rotation is no longer orthogonal
        let q = Quaternion::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0, 0.0) * 1.1;
        let m = RotationMatrix::from(q).get_value();
        let col = m.column(1);
        assert!((col.norm() - 1.0).abs() > 1e-3);
    }

    #[test]
    fn test_inv_is_transpose() {
        let q = Quaternion::new(0.9, 0.1, -0.3, 0.2).normalize();
        let m = RotationMatrix::from(q);
        let product = (m * m.inv()).get_value();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(product[(i, j)], expected, epsilon = TOL);
            }
        }
    }
}
