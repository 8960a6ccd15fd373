use std::array;

use log::{trace, warn};

use crate::{
    OdeModel, SolverErrors,
    state::{Adaptive, OdeState},
    stepping::{AdaptiveStepControl, FixedStepControl},
    tableau::ButcherTableau,
};

// preallocated buffers for intermediate calculations
struct RKBuffers<State: OdeState, const STAGES: usize> {
    k: [State; STAGES],
    state: State,
    derivative: State,
}

impl<State: OdeState, const STAGES: usize> Default for RKBuffers<State, STAGES> {
    fn default() -> Self {
        Self {
            k: array::from_fn(|_| State::default()),
            state: State::default(),
            derivative: State::default(),
        }
    }
}

/// Explicit Runge-Kutta stepper for a given tableau.
pub struct RungeKutta<State: OdeState, const STAGES: usize> {
    y: State,
    y_star: State,
    tableau: ButcherTableau<STAGES>,
    buffers: RKBuffers<State, STAGES>,
    evaluations: usize,
}

impl<State: OdeState, const STAGES: usize> RungeKutta<State, STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>) -> Self {
        Self {
            buffers: RKBuffers::default(),
            y: State::default(),
            y_star: State::default(),
            tableau,
            evaluations: 0,
        }
    }

    /// Number of model evaluations since construction.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Integrates with a constant step, landing exactly on `tspan.1`.
    pub fn solve_fixed<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        x0: &State,
        tspan: (f64, f64),
        control: &FixedStepControl,
    ) -> Result<State, SolverErrors> {
        let (n, h) = control.partition(tspan);
        let mut x = x0.clone();
        for i in 0..n {
            let t = tspan.0 + i as f64 * h;
            self.step(model, t, &x, h)?;
            x.clone_from(&self.y);
        }
        Ok(x)
    }

    /// Integrates with error controlled steps, landing exactly on `tspan.1`.
    ///
    /// A step whose error estimate is NaN (the state itself has gone
    /// non-finite) is accepted as is, so the NaN reaches the caller instead of
    /// driving the step size to zero.
    pub fn solve_adaptive<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        x0: &State,
        tspan: (f64, f64),
        control: &AdaptiveStepControl,
    ) -> Result<State, SolverErrors>
    where
        State: Adaptive,
    {
        if !self.tableau.is_embedded() {
            return Err(SolverErrors::InvalidCombination(
                "tableau has no embedded error estimate".into(),
            ));
        }

        let (t0, tf) = tspan;
        let mut t = t0;
        let mut x = x0.clone();
        let mut h = control.limit(control.initial_dt.unwrap_or(tf - t0));
        let start_evaluations = self.evaluations;

        while t < tf {
            let remaining = tf - t;
            // finish exactly on tf rather than leaving a sliver behind
            let last = h >= remaining || remaining - h <= f64::EPSILON * tf.abs().max(1.0);
            if last {
                h = remaining;
            }

            self.step(model, t, &x, h)?;
            let error = self
                .y
                .compute_error(&x, &self.y_star, control.rel_tol, control.abs_tol);

            if error <= 1.0 || error.is_nan() || control.at_min_dt(h) {
                if error > 1.0 {
                    warn!("accepting step at t = {t} with error {error} at minimum step {h}");
                }
                t = if last { tf } else { t + h };
                x.clone_from(&self.y);
            } else {
                trace!("rejected step at t = {t}, h = {h}, error = {error}");
            }

            if !error.is_nan() {
                h = control.step(h, error, self.tableau.order);
            }

            if h <= f64::EPSILON * t.abs().max(1.0) * 16.0 {
                warn!("step size underflow at t = {t}, h = {h}");
                return Err(SolverErrors::StepSizeUnderflow { t, h });
            }
            if t < tf && self.evaluations - start_evaluations > control.max_evaluations {
                return Err(SolverErrors::MaxEvaluations {
                    t,
                    evaluations: self.evaluations - start_evaluations,
                });
            }
        }
        Ok(x)
    }

    /// Takes one step of size `h` from `(t, x)`.
    ///
    /// The propagated solution is left in `y` and, for embedded tableaus, the
    /// lower order estimate in `y_star`.
    pub fn step<Model: OdeModel<State = State>>(
        &mut self,
        model: &mut Model,
        t: f64,
        x: &State,
        h: f64,
    ) -> Result<(), SolverErrors> {
        let k = &mut self.buffers.k;

        // k0
        model.f(t, x, &mut k[0]).map_err(SolverErrors::Model)?;

        // k1 - ks
        for s in 1..STAGES {
            // in place calculation of intermediate points
            self.buffers.state *= 0.0;
            // sum previous ks with appropriate scaling from tableau
            for i in 0..s {
                if self.tableau.a[s][i] == 0.0 {
                    continue;
                }
                self.buffers.derivative.clone_from(&k[i]);
                self.buffers.derivative *= self.tableau.a[s][i];
                self.buffers.state += &self.buffers.derivative;
            }
            self.buffers.state *= h;
            self.buffers.state += x;

            model
                .f(t + self.tableau.c[s] * h, &self.buffers.state, &mut k[s])
                .map_err(SolverErrors::Model)?;
        }
        self.evaluations += STAGES;

        self.y.clone_from(x);
        for s in 0..STAGES {
            self.buffers.derivative.clone_from(&k[s]);
            self.buffers.derivative *= self.tableau.b[s] * h;
            self.y += &self.buffers.derivative;
        }

        if let Some(b_star) = self.tableau.b_star {
            self.y_star.clone_from(x);
            for s in 0..STAGES {
                self.buffers.derivative.clone_from(&k[s]);
                self.buffers.derivative *= b_star[s] * h;
                self.y_star += &self.buffers.derivative;
            }
        }
        Ok(())
    }
}
