use std::error::Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    OdeModel,
    rk::RungeKutta,
    state::{Adaptive, OdeState},
    stepping::{AdaptiveStepControl, FixedStepControl, StepMethods},
    tableau::ButcherTableau,
};

#[derive(Debug, Error)]
pub enum SolverErrors {
    #[error("invalid solver configuration: {0}")]
    InvalidCombination(String),
    #[error("invalid time span ({0}, {1})")]
    InvalidTimeSpan(f64, f64),
    #[error("step size underflow at t = {t} (h = {h})")]
    StepSizeUnderflow { t: f64, h: f64 },
    #[error("exceeded maximum evaluations at t = {t} ({evaluations} evaluations)")]
    MaxEvaluations { t: f64, evaluations: usize },
    #[error("model evaluation failed: {0}")]
    Model(Box<dyn Error>),
}

/// The integrator contract.
///
/// Advances `x0` from `tspan.0` to exactly `tspan.1`, evaluating the model as
/// many times as the method requires, and returns the state at the end time.
pub trait Integrator<State: OdeState> {
    fn integrate<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        x0: &State,
        tspan: (f64, f64),
    ) -> Result<State, SolverErrors>;
}

/// Enum representing the available solvers supported by the framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RungeKuttaMethods {
    /// Bogacki-Shampine 3(2) method.
    Bs23,
    /// Dormand-Prince 4(5) method.
    DoPri45,
    /// Classical Runge-Kutta 4th-order method.
    Rk4,
}

impl RungeKuttaMethods {
    /// True if the method carries an embedded error estimate.
    pub fn is_adaptive(&self) -> bool {
        match self {
            RungeKuttaMethods::Bs23 | RungeKuttaMethods::DoPri45 => true,
            RungeKuttaMethods::Rk4 => false,
        }
    }
}

/// A Runge-Kutta method paired with its step control.
#[derive(Clone, Copy, Debug)]
pub struct Solver {
    method: RungeKuttaMethods,
    step_method: StepMethods,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            method: RungeKuttaMethods::DoPri45,
            step_method: StepMethods::Adaptive(AdaptiveStepControl::default()),
        }
    }
}

impl Solver {
    pub fn new(
        method: RungeKuttaMethods,
        step_method: impl Into<StepMethods>,
    ) -> Result<Self, SolverErrors> {
        let step_method = step_method.into();
        // handle inappropriate combos
        match step_method {
            StepMethods::Adaptive(_) if !method.is_adaptive() => {
                return Err(SolverErrors::InvalidCombination(format!(
                    "{method:?} cannot be used with adaptive step methods"
                )));
            }
            StepMethods::Fixed(FixedStepControl { dt }) if !(dt > 0.0) => {
                return Err(SolverErrors::InvalidCombination(format!(
                    "fixed step must be positive, got {dt}"
                )));
            }
            _ => {}
        }
        Ok(Self {
            method,
            step_method,
        })
    }

    /// Dormand-Prince 4(5) with the given adaptive control. Always valid.
    pub fn dormand_prince(control: AdaptiveStepControl) -> Self {
        Self {
            method: RungeKuttaMethods::DoPri45,
            step_method: StepMethods::Adaptive(control),
        }
    }

    pub fn method(&self) -> RungeKuttaMethods {
        self.method
    }

    pub fn step_method(&self) -> &StepMethods {
        &self.step_method
    }
}

impl<State: Adaptive> Integrator<State> for Solver {
    fn integrate<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        x0: &State,
        tspan: (f64, f64),
    ) -> Result<State, SolverErrors> {
        if !(tspan.1 >= tspan.0) {
            return Err(SolverErrors::InvalidTimeSpan(tspan.0, tspan.1));
        }
        if tspan.1 == tspan.0 {
            return Ok(x0.clone());
        }

        match (&self.method, &self.step_method) {
            (RungeKuttaMethods::Bs23, StepMethods::Adaptive(control)) => {
                RungeKutta::new(ButcherTableau::<4>::BOGACKISHAMPINE32)
                    .solve_adaptive(model, x0, tspan, control)
            }
            (RungeKuttaMethods::DoPri45, StepMethods::Adaptive(control)) => {
                RungeKutta::new(ButcherTableau::<7>::DORMANDPRINCE45)
                    .solve_adaptive(model, x0, tspan, control)
            }
            (RungeKuttaMethods::Rk4, StepMethods::Adaptive(_)) => Err(
                SolverErrors::InvalidCombination("Rk4 cannot be used with adaptive step methods".into()),
            ),
            (RungeKuttaMethods::Bs23, StepMethods::Fixed(control)) => {
                RungeKutta::new(ButcherTableau::<4>::BOGACKISHAMPINE32)
                    .solve_fixed(model, x0, tspan, control)
            }
            (RungeKuttaMethods::DoPri45, StepMethods::Fixed(control)) => {
                RungeKutta::new(ButcherTableau::<7>::DORMANDPRINCE45)
                    .solve_fixed(model, x0, tspan, control)
            }
            (RungeKuttaMethods::Rk4, StepMethods::Fixed(control)) => {
                RungeKutta::new(ButcherTableau::<4>::RK4).solve_fixed(model, x0, tspan, control)
            }
        }
    }
}
