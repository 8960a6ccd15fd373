//! Quaternion kinematics.

use nalgebra::Vector3;

use crate::quaternion::Quaternion;

/// Time derivative of an attitude quaternion, `dq/dt = 0.5 * q ⊗ (0, ω)`.
///
/// `q` rotates body vectors into the reference frame and `omega` is the body
/// angular rate in rad/s, expressed in the body frame. The quaternion is used
/// as given; it does not need to be unit norm and is not normalized here.
/// Non-finite inputs propagate into the result.
pub fn quaternion_derivative(q: &Quaternion, omega: &Vector3<f64>) -> Quaternion {
    (*q * Quaternion::pure(omega)) * 0.5
}
