/// Specifies the type of step size control strategy used by the ODE solver.
///
/// - `Fixed`: Uses a constant step size throughout integration.
/// - `Adaptive`: Dynamically adjusts step size based on local error estimates.
#[derive(Copy, Clone, Debug)]
pub enum StepMethods {
    Fixed(FixedStepControl),
    Adaptive(AdaptiveStepControl),
}

impl From<FixedStepControl> for StepMethods {
    fn from(value: FixedStepControl) -> Self {
        Self::Fixed(value)
    }
}

impl From<AdaptiveStepControl> for StepMethods {
    fn from(value: AdaptiveStepControl) -> Self {
        Self::Adaptive(value)
    }
}

/// Fixed-step control configuration.
///
/// `dt` is the largest step taken. A span that is not a whole multiple of `dt`
/// is divided into equal steps slightly shorter than `dt`, so the end of the
/// span is always reached exactly.
#[derive(Copy, Clone, Debug)]
pub struct FixedStepControl {
    pub dt: f64,
}

impl FixedStepControl {
    /// Constructs a new fixed-step controller with a given step size.
    pub fn new(dt: f64) -> Self {
        Self { dt }
    }

    /// Number of equal steps and their length covering `tspan`.
    pub fn partition(&self, tspan: (f64, f64)) -> (usize, f64) {
        let span = tspan.1 - tspan.0;
        // t + dt - t is not always dt in floating point, don't let that add a step
        let n = ((span / self.dt * (1.0 - 1e-9)).ceil() as usize).max(1);
        (n, span / n as f64)
    }
}

/// Adaptive step size controller.
///
/// Scales the step by `0.9 * (1/error)^(1/order)`, clamped to a growth band,
/// from the normalized error of the last step.
#[derive(Clone, Copy, Debug)]
pub struct AdaptiveStepControl {
    /// Relative tolerance used for error estimation.
    pub rel_tol: f64,
    /// Absolute tolerance used for error estimation.
    pub abs_tol: f64,
    /// Optional minimum allowed step size.
    pub min_dt: Option<f64>,
    /// Optional maximum allowed step size.
    pub max_dt: Option<f64>,
    /// Optional first trial step. Defaults to the whole span.
    pub initial_dt: Option<f64>,
    /// Limit on derivative evaluations for a single solve.
    pub max_evaluations: usize,
}

impl Default for AdaptiveStepControl {
    fn default() -> Self {
        Self {
            rel_tol: 1e-3,
            abs_tol: 1e-6,
            min_dt: None,
            max_dt: None,
            initial_dt: None,
            max_evaluations: 100_000,
        }
    }
}

impl AdaptiveStepControl {
    // bounds on the step growth factor
    const MIN_GROWTH: f64 = 0.2;
    const MAX_GROWTH: f64 = 5.0;
    const SAFETY: f64 = 0.9;

    /// Computes the next step size based on the current step and estimated error.
    ///
    /// - `dt`: current step size
    /// - `error`: normalized RMS error
    /// - `order`: order of the solver
    pub fn step(&self, dt: f64, error: f64, order: usize) -> f64 {
        let factor = if error > 0.0 {
            Self::SAFETY * (1.0 / error).powf(1.0 / order as f64)
        } else {
            Self::MAX_GROWTH
        };
        self.limit(dt * factor.clamp(Self::MIN_GROWTH, Self::MAX_GROWTH))
    }

    /// Applies `min_dt` and `max_dt` to a proposed step.
    pub fn limit(&self, mut dt: f64) -> f64 {
        if let Some(min_dt) = self.min_dt {
            dt = dt.max(min_dt);
        }
        if let Some(max_dt) = self.max_dt {
            dt = dt.min(max_dt);
        }
        dt
    }

    /// True when `dt` can no longer shrink because of `min_dt`.
    pub fn at_min_dt(&self, dt: f64) -> bool {
        self.min_dt.is_some_and(|min_dt| dt <= min_dt)
    }

    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    pub fn with_min_dt(mut self, min_dt: f64) -> Self {
        self.min_dt = Some(min_dt);
        self
    }

    pub fn with_max_dt(mut self, max_dt: f64) -> Self {
        self.max_dt = Some(max_dt);
        self
    }

    pub fn with_initial_dt(mut self, initial_dt: f64) -> Self {
        self.initial_dt = Some(initial_dt);
        self
    }

    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_partition_hits_end_exactly() {
        let control = FixedStepControl::new(0.3);
        let (n, h) = control.partition((0.0, 1.0));
        assert_eq!(n, 4);
        assert_abs_diff_eq!(h * n as f64, 1.0, epsilon = TOL);

        let (n, h) = FixedStepControl::new(0.25).partition((0.0, 1.0));
        assert_eq!(n, 4);
        assert_abs_diff_eq!(h, 0.25, epsilon = TOL);
    }

    #[test]
    fn test_partition_ignores_rounding() {
        let (n, _) = FixedStepControl::new(0.1).partition((0.3, 0.3 + 0.1));
        assert_eq!(n, 1);
    }

    #[test]
    fn test_partition_larger_than_span() {
        let (n, h) = FixedStepControl::new(10.0).partition((1.0, 1.5));
        assert_eq!(n, 1);
        assert_abs_diff_eq!(h, 0.5, epsilon = TOL);
    }

    #[test]
    fn test_basic_control_shrinks_and_grows() {
        let control = AdaptiveStepControl::default();
        assert!(control.step(1.0, 10.0, 5) < 1.0);
        assert!(control.step(1.0, 0.01, 5) > 1.0);
        // zero error grows by the maximum factor
        assert_abs_diff_eq!(control.step(1.0, 0.0, 5), 5.0, epsilon = TOL);
    }

    #[test]
    fn test_step_limits() {
        let control = AdaptiveStepControl::default()
            .with_min_dt(0.5)
            .with_max_dt(2.0);
        assert_abs_diff_eq!(control.step(1.0, 1e6, 5), 0.5, epsilon = TOL);
        assert_abs_diff_eq!(control.step(1.0, 1e-9, 5), 2.0, epsilon = TOL);
        assert!(control.at_min_dt(0.5));
        assert!(!control.at_min_dt(0.6));
    }

    #[test]
    fn test_growth_factor() {
        let control = AdaptiveStepControl::default();
        // 0.9 * (1/0.5)^(1/5)
        assert_abs_diff_eq!(
            control.step(0.1, 0.5, 5),
            0.1 * 0.9 * 2.0f64.powf(0.2),
            epsilon = TOL
        );
        // growth is capped below and above
        assert_abs_diff_eq!(control.step(0.1, 1e12, 5), 0.02, epsilon = TOL);
        assert_abs_diff_eq!(control.step(0.1, 1e-12, 5), 0.5, epsilon = TOL);
    }
}
