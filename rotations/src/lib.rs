pub mod kinematics;
pub mod quaternion;
pub mod rotation_matrix;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::kinematics::*;
    pub use crate::quaternion::*;
    pub use crate::rotation_matrix::*;
    pub use crate::RotationTrait;
}

/// Trait defining rotation and transformation operations.
pub trait RotationTrait {
    /// Rotates a vector by the rotation (active rotation, "alibi").
    ///
    /// For a body-to-world rotation this takes a body frame vector and
    /// returns it expressed in the world frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be rotated.
    ///
    /// # Returns
    ///
    /// The rotated vector.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms a vector by the rotation (passive rotation, "alias").
    ///
    /// This is the inverse of [`RotationTrait::rotate`]: for a body-to-world
    /// rotation it takes a world frame vector into the body frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}
