//! Force laws, all returning NED world frame forces [N].

use nalgebra::Vector3;
use rotations::prelude::{RotationMatrix, RotationTrait};

use crate::parameters::{GroundContact, VehicleParameters};

/// Gravity term of the force sum, `(0, 0, 9.80665)` independent of mass.
///
/// It is summed with the other forces before the division by mass, so a
/// heavier vehicle accelerates downward more slowly.
pub fn gravity_force(parameters: &VehicleParameters) -> Vector3<f64> {
    parameters.gravity()
}

/// One-sided spring-damper reaction of the ground plane.
///
/// Zero until the position is below the plane (z greater than `height` in
/// NED). While penetrating, the reaction is vertical only. The damping term
/// acts on vertical velocity in both directions, so it can pull down while the
/// vehicle rebounds out of the ground.
pub fn ground_contact_force(
    contact: &GroundContact,
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
) -> Vector3<f64> {
    if position[2] > contact.height {
        let compression = position[2] - contact.height;
        Vector3::new(
            0.0,
            0.0,
            -compression * contact.stiffness - velocity[2] * contact.damping,
        )
    } else {
        Vector3::zeros()
    }
}

/// Linear drag with unit coefficient.
pub fn drag_force(velocity: &Vector3<f64>) -> Vector3<f64> {
    -velocity
}

/// Body thrust `(0, 0, -thrust)` rotated into NED.
pub fn thrust_force(body_to_ned: &RotationMatrix, thrust: f64) -> Vector3<f64> {
    body_to_ned.rotate(&Vector3::new(0.0, 0.0, -thrust))
}
