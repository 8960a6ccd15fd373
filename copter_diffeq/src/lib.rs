//! Explicit Runge-Kutta integration of ordinary differential equations.
//!
//! A model implements [`OdeModel`], a state implements [`state::OdeState`]
//! (and [`state::Adaptive`] for error controlled stepping), and a [`Solver`]
//! advances the state across a time span through the [`Integrator`] trait.

use std::{error::Error, fmt::Debug};

pub mod rk;
pub mod solvers;
pub mod state;
pub mod stepping;
pub mod tableau;

pub use solvers::{Integrator, RungeKuttaMethods, Solver, SolverErrors};
pub use state::{Adaptive, OdeState, state_array::StateArray};
pub use stepping::{AdaptiveStepControl, FixedStepControl, StepMethods};

/// Trait for defining a dynamical system model that can be numerically integrated.
///
/// Types implementing this trait must define how to compute the derivative (or RHS function)
/// of the ODE at a given time and state.
///
/// Solvers call `f` any number of times per step, at intermediate times and
/// trial states that are neither monotonic nor unique. Implementations must not
/// rely on the order of calls.
pub trait OdeModel: Debug {
    type State: OdeState;
    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(
        &mut self,
        t: f64,
        state: &Self::State,
        derivative: &mut Self::State,
    ) -> Result<(), Box<dyn Error>>;
}
