use copter_diffeq::{AdaptiveStepControl, Integrator, Solver};
use log::{debug, trace, warn};
use nalgebra::Vector3;
use rotations::prelude::{Quaternion, RotationMatrix};

use crate::{
    CopterErrors,
    config::{CopterConfig, DEFAULT_SOLVER_TOLERANCE},
    dynamics::{CopterDynamics, Snapshot},
    parameters::VehicleParameters,
    state::CopterState,
};

/// A single vehicle advanced in fixed increments of `dt`.
///
/// The committed state and time only change in [`CopterSim::step`], and only
/// when the integrator succeeds. Read accessors describe the point the model
/// was last evaluated at, which is the committed state between steps.
#[derive(Debug)]
pub struct CopterSim<I: Integrator<CopterState> = Solver> {
    dynamics: CopterDynamics,
    integrator: I,
    committed: Snapshot,
    dt: f64,
    renormalize_quaternion: bool,
}

/// Dormand-Prince 4(5) at the default tolerances.
pub fn default_solver() -> Solver {
    Solver::dormand_prince(
        AdaptiveStepControl::default()
            .with_rel_tol(DEFAULT_SOLVER_TOLERANCE)
            .with_abs_tol(DEFAULT_SOLVER_TOLERANCE),
    )
}

impl CopterSim<Solver> {
    /// Level at 5 m above the ground, at rest, with default vehicle parameters.
    ///
    /// `dt` is not validated.
    pub fn new(dt: f64) -> Self {
        let state = CopterState::new(
            &Quaternion::IDENTITY,
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, -5.0),
        );
        Self::with_integrator(VehicleParameters::default(), state, dt, default_solver())
    }

    pub fn from_config(config: &CopterConfig) -> Result<Self, CopterErrors> {
        config.validate()?;
        let mut sim = Self::with_integrator(
            config.parameters(),
            config.initial_state(),
            config.dt,
            config.to_solver()?,
        );
        sim.renormalize_quaternion = config.renormalize_quaternion;
        Ok(sim)
    }
}

impl<I: Integrator<CopterState>> CopterSim<I> {
    pub fn with_integrator(
        parameters: VehicleParameters,
        state: CopterState,
        dt: f64,
        integrator: I,
    ) -> Self {
        let contact = parameters.ground_contact();
        debug!(
            "ground contact: height {} m, stiffness {:.4} N/m, damping {:.4} N s/m",
            contact.height, contact.stiffness, contact.damping
        );

        let committed = Snapshot { state, t: 0.0 };
        Self {
            dynamics: CopterDynamics::new(parameters, state, 0.0),
            integrator,
            committed,
            dt,
            renormalize_quaternion: false,
        }
    }

    pub fn set_renormalize_quaternion(&mut self, renormalize: bool) {
        self.renormalize_quaternion = renormalize;
    }

    /// Advances the committed state by `dt` with the current controls.
    ///
    /// On failure the state and time are left exactly as they were before the
    /// call and the integrator error is returned.
    pub fn step(&mut self) -> Result<(), CopterErrors> {
        let start = self.committed;
        let tspan = (start.t, start.t + self.dt);

        match self
            .integrator
            .integrate(&mut self.dynamics, &start.state, tspan)
        {
            Ok(mut state) => {
                if self.renormalize_quaternion {
                    state.normalize_quaternion();
                }
                self.committed = Snapshot { state, t: tspan.1 };
                self.dynamics.restore(self.committed);
                trace!(
                    "t = {:.6}, position {:?}, velocity {:?}",
                    tspan.1,
                    state.position().as_slice(),
                    state.velocity().as_slice()
                );
                Ok(())
            }
            Err(e) => {
                self.dynamics.restore(start);
                warn!("step from t = {} failed: {e}", start.t);
                Err(e.into())
            }
        }
    }

    /// Evaluates the model at an arbitrary point.
    ///
    /// Accessors describe `(state, t)` afterwards. The committed state is not
    /// changed, and the next [`CopterSim::step`] starts from it.
    pub fn derivative(&mut self, state: &CopterState, t: f64) -> CopterState {
        self.dynamics.derivative(state, t)
    }

    pub fn set_thrust(&mut self, thrust_command: f64) {
        self.dynamics.set_thrust(thrust_command);
    }

    pub fn set_angular_rate(&mut self, angular_rate: Vector3<f64>) {
        self.dynamics.set_angular_rate(angular_rate);
    }

    /// Time of the point the accessors describe [s].
    pub fn time(&self) -> f64 {
        self.dynamics.time()
    }

    /// Time of the last committed step, where the next step starts [s].
    pub fn committed_time(&self) -> f64 {
        self.committed.t
    }

    /// State of the last committed step, where the next step starts.
    pub fn committed_state(&self) -> &CopterState {
        &self.committed.state
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn dynamics(&self) -> &CopterDynamics {
        &self.dynamics
    }

    pub fn integrator(&self) -> &I {
        &self.integrator
    }

    pub fn parameters(&self) -> &VehicleParameters {
        self.dynamics.parameters()
    }

    pub fn orientation_matrix(&self) -> RotationMatrix {
        self.dynamics.orientation_matrix()
    }

    pub fn quaternion(&self) -> Quaternion {
        self.dynamics.quaternion()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.dynamics.velocity()
    }

    pub fn position(&self) -> Vector3<f64> {
        self.dynamics.position()
    }

    pub fn angular_rate(&self) -> Vector3<f64> {
        self.dynamics.angular_rate()
    }

    pub fn thrust(&self) -> f64 {
        self.dynamics.thrust()
    }

    pub fn thrust_headroom(&self) -> f64 {
        self.dynamics.thrust_headroom()
    }

    pub fn proper_acceleration(&self) -> Vector3<f64> {
        self.dynamics.proper_acceleration()
    }

    pub fn up_vector(&self) -> Vector3<f64> {
        self.dynamics.up_vector()
    }

    pub fn forward_vector(&self) -> Vector3<f64> {
        self.dynamics.forward_vector()
    }

    pub fn right_vector(&self) -> Vector3<f64> {
        self.dynamics.right_vector()
    }
}
