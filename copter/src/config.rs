use std::{fs, path::Path};

use copter_diffeq::{AdaptiveStepControl, FixedStepControl, RungeKuttaMethods, Solver};
use nalgebra::Vector3;
use ron::ser::PrettyConfig;
use rotations::prelude::Quaternion;
use serde::{Deserialize, Serialize};

use crate::{
    CopterErrors,
    parameters::{
        CONTACT_DAMPING_RATIO, CONTACT_FREQUENCY, DEFAULT_MASS, DEFAULT_THRUST_LIMIT,
        GROUND_HEIGHT, GroundContact, VehicleParameters,
    },
    state::CopterState,
};

/// Tolerance used by the default solver for both relative and absolute error.
pub const DEFAULT_SOLVER_TOLERANCE: f64 = 1.49012e-8;
pub const DEFAULT_DT: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub mass: f64,
    pub thrust_limit: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            thrust_limit: DEFAULT_THRUST_LIMIT,
        }
    }
}

/// Contact response, stiffness and damping are derived from it with the vehicle mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundContactConfig {
    pub height: f64,
    /// [Hz]
    pub frequency: f64,
    pub damping_ratio: f64,
}

impl Default for GroundContactConfig {
    fn default() -> Self {
        Self {
            height: GROUND_HEIGHT,
            frequency: CONTACT_FREQUENCY,
            damping_ratio: CONTACT_DAMPING_RATIO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Scalar first.
    pub quaternion: [f64; 4],
    pub velocity: [f64; 3],
    pub position: [f64; 3],
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            quaternion: [1.0, 0.0, 0.0, 0.0],
            velocity: [0.0; 3],
            position: [0.0, 0.0, -5.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub method: RungeKuttaMethods,
    pub rel_tol: f64,
    pub abs_tol: f64,
    pub max_evaluations: usize,
    /// Use a fixed internal step instead of adaptive control. Required for `Rk4`.
    pub fixed_dt: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: RungeKuttaMethods::DoPri45,
            rel_tol: DEFAULT_SOLVER_TOLERANCE,
            abs_tol: DEFAULT_SOLVER_TOLERANCE,
            max_evaluations: AdaptiveStepControl::default().max_evaluations,
            fixed_dt: None,
        }
    }
}

/// Everything needed to build a [`crate::CopterSim`], loadable from RON.
///
/// Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopterConfig {
    pub dt: f64,
    pub vehicle: VehicleConfig,
    pub ground_contact: GroundContactConfig,
    pub initial: InitialConditions,
    pub solver: SolverConfig,
    /// Rescale the stored quaternion to unit norm after every step.
    pub renormalize_quaternion: bool,
}

impl Default for CopterConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            vehicle: VehicleConfig::default(),
            ground_contact: GroundContactConfig::default(),
            initial: InitialConditions::default(),
            solver: SolverConfig::default(),
            renormalize_quaternion: false,
        }
    }
}

impl CopterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CopterErrors> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parses and validates a config.
    pub fn from_ron_str(contents: &str) -> Result<Self, CopterErrors> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, CopterErrors> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn validate(&self) -> Result<(), CopterErrors> {
        fn positive(name: &str, value: f64) -> Result<(), CopterErrors> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(CopterErrors::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        }

        positive("dt", self.dt)?;
        positive("vehicle.mass", self.vehicle.mass)?;
        positive("ground_contact.frequency", self.ground_contact.frequency)?;
        positive("solver.rel_tol", self.solver.rel_tol)?;
        positive("solver.abs_tol", self.solver.abs_tol)?;
        if let Some(fixed_dt) = self.solver.fixed_dt {
            positive("solver.fixed_dt", fixed_dt)?;
        }
        if !(self.vehicle.thrust_limit >= 0.0) {
            return Err(CopterErrors::InvalidConfig(format!(
                "vehicle.thrust_limit must not be negative, got {}",
                self.vehicle.thrust_limit
            )));
        }
        if !(self.ground_contact.damping_ratio >= 0.0) {
            return Err(CopterErrors::InvalidConfig(format!(
                "ground_contact.damping_ratio must not be negative, got {}",
                self.ground_contact.damping_ratio
            )));
        }
        Quaternion::from(self.initial.quaternion)
            .try_normalize()
            .map_err(|e| CopterErrors::InvalidConfig(format!("initial.quaternion: {e}")))?;
        if self.solver.fixed_dt.is_none() && !self.solver.method.is_adaptive() {
            return Err(CopterErrors::InvalidConfig(format!(
                "solver.method {:?} needs solver.fixed_dt",
                self.solver.method
            )));
        }
        Ok(())
    }

    pub fn parameters(&self) -> VehicleParameters {
        let contact = GroundContact::from_response(
            self.vehicle.mass,
            self.ground_contact.frequency,
            self.ground_contact.damping_ratio,
            self.ground_contact.height,
        );
        VehicleParameters::new(self.vehicle.mass, self.vehicle.thrust_limit, contact)
    }

    /// The initial state, with the quaternion stored as given.
    pub fn initial_state(&self) -> CopterState {
        CopterState::new(
            &Quaternion::from(self.initial.quaternion),
            &Vector3::from(self.initial.velocity),
            &Vector3::from(self.initial.position),
        )
    }

    pub fn to_solver(&self) -> Result<Solver, CopterErrors> {
        let solver = match self.solver.fixed_dt {
            Some(dt) => Solver::new(self.solver.method, FixedStepControl::new(dt))?,
            None => Solver::new(
                self.solver.method,
                AdaptiveStepControl::default()
                    .with_rel_tol(self.solver.rel_tol)
                    .with_abs_tol(self.solver.abs_tol)
                    .with_max_evaluations(self.solver.max_evaluations),
            )?,
        };
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-12;

    #[test]
    fn test_default_matches_default_parameters() {
        let config = CopterConfig::default();
        assert_eq!(config.parameters(), VehicleParameters::default());
        assert_eq!(
            config.initial_state(),
            CopterState::new(
                &Quaternion::IDENTITY,
                &Vector3::zeros(),
                &Vector3::new(0.0, 0.0, -5.0)
            )
        );
        assert!(!config.renormalize_quaternion);
    }

    #[test]
    fn test_round_trip() {
        let config = CopterConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = CopterConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.parameters(), config.parameters());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = CopterConfig::from_ron_str("(dt: 0.02, vehicle: (mass: 2.0))").unwrap();
        assert_eq!(config.dt, 0.02);
        assert_eq!(config.vehicle.mass, 2.0);
        assert_eq!(config.vehicle.thrust_limit, 20.0);
        assert_eq!(config.solver.method, RungeKuttaMethods::DoPri45);

        // stiffness scales with mass
        let stiffness = config.parameters().ground_contact().stiffness;
        assert_abs_diff_eq!(
            stiffness,
            2.0 * VehicleParameters::default().ground_contact().stiffness,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            "(dt: 0.0)",
            "(dt: -1.0)",
            "(vehicle: (mass: 0.0))",
            "(vehicle: (thrust_limit: -1.0))",
            "(initial: (quaternion: (0.0, 0.0, 0.0, 0.0)))",
            "(solver: (method: Rk4))",
            "(solver: (fixed_dt: Some(0.0)))",
        ] {
            assert!(
                matches!(
                    CopterConfig::from_ron_str(text),
                    Err(CopterErrors::InvalidConfig(_))
                ),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_degenerate_quaternion_rejected() {
        let mut config = CopterConfig::default();
        config.initial.quaternion = [1e-20, 0.0, 0.0, 0.0];
        match config.validate() {
            Err(CopterErrors::InvalidConfig(message)) => {
                assert_eq!(message, "initial.quaternion: got zero magnitude quaternion")
            }
            other => panic!("expected invalid config, got {other:?}"),
        }

        // unnormalized but usable
        config.initial.quaternion = [2.0, 0.0, 0.0, 0.0];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            CopterConfig::from_ron_str("(dt: \"fast\")"),
            Err(CopterErrors::Ron(_))
        ));
    }

    #[test]
    fn test_to_solver() {
        let mut config = CopterConfig::default();
        let solver = config.to_solver().unwrap();
        assert_eq!(solver.method(), RungeKuttaMethods::DoPri45);
        match solver.step_method() {
            copter_diffeq::StepMethods::Adaptive(control) => {
                assert_abs_diff_eq!(control.rel_tol, DEFAULT_SOLVER_TOLERANCE, epsilon = TOL);
                assert_abs_diff_eq!(control.abs_tol, DEFAULT_SOLVER_TOLERANCE, epsilon = TOL);
            }
            copter_diffeq::StepMethods::Fixed(_) => panic!("expected adaptive control"),
        }

        config.solver.method = RungeKuttaMethods::Rk4;
        config.solver.fixed_dt = Some(0.001);
        let solver = config.to_solver().unwrap();
        assert!(matches!(
            solver.step_method(),
            copter_diffeq::StepMethods::Fixed(FixedStepControl { dt }) if *dt == 0.001
        ));
    }
}
