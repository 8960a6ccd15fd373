use std::{
    fmt::Debug,
    ops::{AddAssign, MulAssign},
};

pub mod state_array;

/// Trait representing an integrable state for use in ODE solvers.
///
/// The derivative of a state is represented by the same type. `Default` must
/// be the additive zero, since it is used to initialize stage buffers.
pub trait OdeState: Clone + Debug + Default + MulAssign<f64> + for<'a> AddAssign<&'a Self> {}

impl<T> OdeState for T where T: Clone + Debug + Default + MulAssign<f64> + for<'a> AddAssign<&'a T> {}

/// States that can estimate their own local error, required for adaptive stepping.
pub trait Adaptive: OdeState {
    /// Scaled RMS error between the solution `self` and the embedded estimate
    /// `x_tilde`, given the state at the start of the step `x_prev`.
    ///
    /// A value <= 1.0 means the step is within tolerance.
    fn compute_error(&self, x_prev: &Self, x_tilde: &Self, rel_tol: f64, abs_tol: f64) -> f64;
}
