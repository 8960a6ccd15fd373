use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::GRAVITY;

pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_THRUST_LIMIT: f64 = 20.0;
/// Natural frequency of the ground contact spring [Hz].
pub const CONTACT_FREQUENCY: f64 = 10.0;
pub const CONTACT_DAMPING_RATIO: f64 = 0.2;
/// Height of the ground plane along NED z [m].
pub const GROUND_HEIGHT: f64 = 0.0;

/// Spring-damper model of a flat ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundContact {
    pub height: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl GroundContact {
    /// Derives stiffness and damping from a target contact response.
    ///
    /// `stiffness = 0.5*mass*(2*pi*frequency)^2` and
    /// `damping = 2*damping_ratio*sqrt(stiffness*0.5*mass)`.
    pub fn from_response(mass: f64, frequency: f64, damping_ratio: f64, height: f64) -> Self {
        let stiffness = 0.5 * mass * (2.0 * PI * frequency).powi(2);
        let damping = 2.0 * damping_ratio * (stiffness * 0.5 * mass).sqrt();
        Self {
            height,
            stiffness,
            damping,
        }
    }
}

/// Physical constants of the vehicle, fixed once constructed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleParameters {
    mass: f64,
    thrust_limit: f64,
    gravity: Vector3<f64>,
    ground_contact: GroundContact,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self::new(
            DEFAULT_MASS,
            DEFAULT_THRUST_LIMIT,
            GroundContact::from_response(
                DEFAULT_MASS,
                CONTACT_FREQUENCY,
                CONTACT_DAMPING_RATIO,
                GROUND_HEIGHT,
            ),
        )
    }
}

impl VehicleParameters {
    pub fn new(mass: f64, thrust_limit: f64, ground_contact: GroundContact) -> Self {
        Self {
            mass,
            thrust_limit,
            gravity: Vector3::new(0.0, 0.0, GRAVITY),
            ground_contact,
        }
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn thrust_limit(&self) -> f64 {
        self.thrust_limit
    }

    /// Gravity in NED, pointing down. Used as the gravity force term and as
    /// the reference for proper acceleration.
    pub fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    pub fn ground_contact(&self) -> &GroundContact {
        &self.ground_contact
    }

    /// Thrust that balances the gravity force, the same for every mass.
    pub fn hover_thrust(&self) -> f64 {
        self.gravity[2]
    }
}
