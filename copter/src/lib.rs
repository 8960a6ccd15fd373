//! Rigid body dynamics of a single quadrotor.
//!
//! The vehicle is commanded with a collective thrust and a body angular rate.
//! Orientation, velocity and position are integrated in a North-East-Down
//! world frame under gravity, linear drag, a spring-damper ground contact and
//! body frame thrust.
//!
//! This is a numerical engine: inputs are not validated beyond clamping the
//! thrust, and a degenerate state (for example a zero quaternion) produces NaN
//! that propagates through every later evaluation.

use copter_diffeq::SolverErrors;
use thiserror::Error;

pub mod config;
pub mod controls;
pub mod dynamics;
pub mod forces;
pub mod parameters;
pub mod sim;
pub mod state;
pub mod telemetry;

pub use config::CopterConfig;
pub use controls::ControlInputs;
pub use dynamics::{CopterDynamics, Snapshot};
pub use parameters::{GroundContact, VehicleParameters};
pub use sim::CopterSim;
pub use state::CopterState;
pub use telemetry::Telemetry;

/// Standard gravity [m/s^2].
pub const GRAVITY: f64 = 9.80665;

#[derive(Debug, Error)]
pub enum CopterErrors {
    #[error("{0}")]
    Solver(#[from] SolverErrors),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
