use std::ops::{AddAssign, MulAssign, Range};

use copter_diffeq::{Adaptive, StateArray};
use nalgebra::Vector3;
use rotations::prelude::Quaternion;

/// Number of scalar components in the state.
pub const STATE_LEN: usize = 10;
/// Attitude quaternion, scalar first, body to NED.
pub const QUATERNION: Range<usize> = 0..4;
/// Velocity in NED [m/s].
pub const VELOCITY: Range<usize> = 4..7;
/// Position in NED [m], z positive down.
pub const POSITION: Range<usize> = 7..10;

/// The integrated state of the vehicle, `[q, v, p]`.
///
/// The quaternion is stored exactly as integrated. It is never normalized in
/// place, so its norm drifts with integration error.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CopterState(StateArray<STATE_LEN>);

impl CopterState {
    pub fn new(quaternion: &Quaternion, velocity: &Vector3<f64>, position: &Vector3<f64>) -> Self {
        let mut state = Self::default();
        state.set_quaternion(quaternion);
        state.set_velocity(velocity);
        state.set_position(position);
        state
    }

    /// The stored quaternion, not normalized.
    pub fn quaternion(&self) -> Quaternion {
        let q = &self.0[QUATERNION];
        Quaternion::new(q[0], q[1], q[2], q[3])
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::from_column_slice(&self.0[VELOCITY])
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::from_column_slice(&self.0[POSITION])
    }

    pub fn set_quaternion(&mut self, q: &Quaternion) {
        let q: [f64; 4] = (*q).into();
        self.0[QUATERNION].copy_from_slice(&q);
    }

    pub fn set_velocity(&mut self, v: &Vector3<f64>) {
        self.0[VELOCITY].copy_from_slice(v.as_slice());
    }

    pub fn set_position(&mut self, p: &Vector3<f64>) {
        self.0[POSITION].copy_from_slice(p.as_slice());
    }

    /// Rescales the stored quaternion to unit norm.
    pub fn normalize_quaternion(&mut self) {
        let q = self.quaternion().normalize();
        self.set_quaternion(&q);
    }

    pub fn as_array(&self) -> &[f64; STATE_LEN] {
        &self.0
    }
}

impl From<[f64; STATE_LEN]> for CopterState {
    fn from(array: [f64; STATE_LEN]) -> Self {
        Self(StateArray::new(array))
    }
}

impl From<CopterState> for [f64; STATE_LEN] {
    fn from(state: CopterState) -> Self {
        state.0.into_inner()
    }
}

impl AddAssign<&Self> for CopterState {
    fn add_assign(&mut self, rhs: &Self) {
        self.0 += &rhs.0;
    }
}

impl MulAssign<f64> for CopterState {
    fn mul_assign(&mut self, rhs: f64) {
        self.0 *= rhs;
    }
}

impl Adaptive for CopterState {
    fn compute_error(&self, x_prev: &Self, x_tilde: &Self, rel_tol: f64, abs_tol: f64) -> f64 {
        self.0.compute_error(&x_prev.0, &x_tilde.0, rel_tol, abs_tol)
    }
}
