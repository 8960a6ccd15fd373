use std::ops::{AddAssign, Deref, DerefMut, MulAssign};

use tolerance::{compute_error, rms};

use super::Adaptive;

/// A fixed-size array wrapper representing a generic state vector with `N` f64 components.
///
/// This type is commonly used as a concrete state for ODE solvers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateArray<const N: usize>([f64; N]);

impl<const N: usize> StateArray<N> {
    /// Constructs a new `StateArray` from an array of `f64`.
    pub fn new(array: [f64; N]) -> Self {
        Self(array)
    }

    pub fn into_inner(self) -> [f64; N] {
        self.0
    }
}

impl<const N: usize> Default for StateArray<N> {
    /// Creates a `StateArray` with all elements initialized to zero.
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> From<[f64; N]> for StateArray<N> {
    fn from(array: [f64; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> AddAssign<&Self> for StateArray<N> {
    /// Adds each element from the right-hand side into `self` in-place.
    fn add_assign(&mut self, rhs: &Self) {
        for (x, r) in self.0.iter_mut().zip(rhs.0.iter()) {
            *x += r;
        }
    }
}

impl<const N: usize> MulAssign<f64> for StateArray<N> {
    /// Multiplies each element of the array in-place by the given scalar.
    fn mul_assign(&mut self, rhs: f64) {
        for x in self.0.iter_mut() {
            *x *= rhs;
        }
    }
}

impl<const N: usize> Adaptive for StateArray<N> {
    /// Computes the root-mean-square of the per-component scaled errors.
    fn compute_error(&self, x_prev: &Self, x_tilde: &Self, rel_tol: f64, abs_tol: f64) -> f64 {
        rms((0..N).map(|i| compute_error(self.0[i], x_prev.0[i], x_tilde.0[i], rel_tol, abs_tol)))
    }
}

impl<const N: usize> Deref for StateArray<N> {
    type Target = [f64; N];

    /// Dereferences the `StateArray` to access the underlying array.
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for StateArray<N> {
    /// Mutable dereference to the underlying array.
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
