use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg};
use thiserror::Error;

use crate::RotationTrait;

/// A quaternion with scalar part `s` and vector part `(x, y, z)`.
///
/// No unit norm is enforced. Integrated attitude states are allowed to drift
/// off the unit sphere, and callers decide when to call [`Quaternion::normalize`].
/// Array conversions are scalar first: `[s, x, y, z]`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Errors that can occur when normalizing a `Quaternion`.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum QuaternionErrors {
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
}

impl Quaternion {
    /// The quaternion representing no rotation.
    pub const IDENTITY: Self = Self {
        s: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new `Quaternion` from its scalar and vector components.
    ///
    /// The result is not normalized.
    pub fn new(s: f64, x: f64, y: f64, z: f64) -> Self {
        Self { s, x, y, z }
    }

    /// Creates a pure quaternion `(0, v)`.
    pub fn pure(v: &Vector3<f64>) -> Self {
        Self::new(0.0, v[0], v[1], v[2])
    }

    /// The vector part `(x, y, z)`.
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.s * other.s + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn mag(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn conj(&self) -> Quaternion {
        Quaternion::new(self.s, -self.x, -self.y, -self.z)
    }

    /// Divides every component by the magnitude.
    ///
    /// A zero magnitude quaternion produces NaN components, which propagate.
    /// Use [`Quaternion::try_normalize`] to catch that case instead.
    pub fn normalize(&self) -> Self {
        let mag = self.mag();
        Quaternion::new(self.s / mag, self.x / mag, self.y / mag, self.z / mag)
    }

    pub fn try_normalize(&self) -> Result<Self, QuaternionErrors> {
        let mag = self.mag();
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.s / mag,
            self.x / mag,
            self.y / mag,
            self.z / mag,
        ))
    }
}

impl RotationTrait for Quaternion {
    /// Rotates a vector by the quaternion, `q v q*`.
    /// Follows Markley/Crassidis, active rotation.
    ///
    /// The quaternion is assumed to be unit norm; a non-unit quaternion scales
    /// the result by its squared magnitude.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        (*self * Quaternion::pure(v) * self.conj()).vector()
    }

    /// Transforms a vector by the quaternion, `q* v q`.
    /// Follows Markley/Crassidis, passive rotation.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        (self.conj() * Quaternion::pure(v) * *self).vector()
    }

    fn identity() -> Self {
        Self::IDENTITY
    }

    fn inv(&self) -> Self {
        let mag_squared = self.dot(self);
        self.conj() * (1.0 / mag_squared)
    }
}

impl Default for Quaternion {
    /// Provides the default value for a quaternion, the identity.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product.
    fn mul(self, rhs: Self) -> Self {
        Quaternion::new(
            self.s * rhs.s - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.s * rhs.x + self.x * rhs.s + self.y * rhs.z - self.z * rhs.y,
            self.s * rhs.y - self.x * rhs.z + self.y * rhs.s + self.z * rhs.x,
            self.s * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.s,
        )
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Quaternion::new(self.s * rhs, self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl MulAssign<f64> for Quaternion {
    fn mul_assign(&mut self, rhs: f64) {
        self.s *= rhs;
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Quaternion::new(
            self.s + rhs.s,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl AddAssign<&Quaternion> for Quaternion {
    fn add_assign(&mut self, rhs: &Self) {
        self.s += rhs.s;
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Quaternion::new(-self.s, -self.x, -self.y, -self.z)
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from(q: [f64; 4]) -> Self {
        Quaternion::new(q[0], q[1], q[2], q[3])
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        [q.s, q.x, q.y, q.z]
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quaternion ")?;
        writeln!(f, "   s: {: >10.6}", self.s)?;
        writeln!(f, "   x: {: >10.6}", self.x)?;
        writeln!(f, "   y: {: >10.6}", self.y)?;
        writeln!(f, "   z: {: >10.6}", self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_quaternion_normalization() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0).normalize();
        let mag = 30.0f64.sqrt();

        assert_abs_diff_eq!(q.s, 1.0 / mag, epsilon = TOL);
        assert_abs_diff_eq!(q.x, 2.0 / mag, epsilon = TOL);
        assert_abs_diff_eq!(q.y, 3.0 / mag, epsilon = TOL);
        assert_abs_diff_eq!(q.z, 4.0 / mag, epsilon = TOL);
        assert_abs_diff_eq!(q.mag(), 1.0, epsilon = TOL);
    }

    #[test]
    fn test_quaternion_zero_magnitude() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q.try_normalize(), Err(QuaternionErrors::ZeroMagnitude));
        assert!(q.normalize().s.is_nan());
    }

    #[test]
    fn test_quaternion_multiplication() {
        // i * j = k
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let k = i * j;
        assert_eq!(k, Quaternion::new(0.0, 0.0, 0.0, 1.0));
        // j * i = -k
        assert_eq!(j * i, -k);

        let q1 = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        let q2 = Quaternion::new(5.0, 6.0, 7.0, 8.0);
        let q = q1 * q2;
        assert_abs_diff_eq!(q.s, -60.0, epsilon = TOL);
        assert_abs_diff_eq!(q.x, 12.0, epsilon = TOL);
        assert_abs_diff_eq!(q.y, 30.0, epsilon = TOL);
        assert_abs_diff_eq!(q.z, 24.0, epsilon = TOL);
    }

    #[test]
    fn test_quaternion_inv() {
        let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        let r = q * q.inv();
        assert_abs_diff_eq!(r.s, 1.0, epsilon = TOL);
        assert_abs_diff_eq!(r.x, 0.0, epsilon = TOL);
        assert_abs_diff_eq!(r.y, 0.0, epsilon = TOL);
        assert_abs_diff_eq!(r.z, 0.0, epsilon = TOL);
    }

    #[test]
    fn test_quaternion_rotate_z() {
        // 90 degrees about z takes x to y
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let result = q.rotate(&Vector3::new(1.0, 0.0, 0.0));

        assert_abs_diff_eq!(result[0], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(result[1], 1.0, epsilon = TOL);
        assert_abs_diff_eq!(result[2], 0.0, epsilon = TOL);
    }

    #[test]
    fn test_quaternion_transform_z() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let result = q.transform(&Vector3::new(1.0, 0.0, 0.0));

        assert_abs_diff_eq!(result[0], 0.0, epsilon = TOL);
        assert_abs_diff_eq!(result[1], -1.0, epsilon = TOL);
        assert_abs_diff_eq!(result[2], 0.0, epsilon = TOL);
    }

    #[test]
    fn test_quaternion_array_order() {
        let q = Quaternion::from([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(q.s, 1.0);
        assert_eq!(q.z, 4.0);
        let a: [f64; 4] = q.into();
        assert_eq!(a, [1.0, 2.0, 3.0, 4.0]);
    }
}
