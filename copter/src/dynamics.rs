use std::error::Error;

use copter_diffeq::OdeModel;
use nalgebra::Vector3;
use rotations::prelude::{Quaternion, RotationMatrix, RotationTrait, quaternion_derivative};

use crate::{
    controls::ControlInputs,
    forces::{drag_force, gravity_force, ground_contact_force, thrust_force},
    parameters::VehicleParameters,
    state::CopterState,
};

/// The state and time the model was last evaluated at.
///
/// Between steps this is the committed state. During a step the integrator
/// moves it to every trial point it evaluates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub state: CopterState,
    pub t: f64,
}

/// Force and kinematic model of the vehicle.
///
/// Every accessor reads the current [`Snapshot`], so after a call to
/// [`CopterDynamics::derivative`] they describe that evaluation point.
#[derive(Clone, Debug)]
pub struct CopterDynamics {
    parameters: VehicleParameters,
    controls: ControlInputs,
    snapshot: Snapshot,
}

impl CopterDynamics {
    pub fn new(parameters: VehicleParameters, state: CopterState, t: f64) -> Self {
        Self {
            parameters,
            controls: ControlInputs::default(),
            snapshot: Snapshot { state, t },
        }
    }

    /// Moves the snapshot to `(state, t)` and returns `[q', v', p']`.
    pub fn derivative(&mut self, state: &CopterState, t: f64) -> CopterState {
        self.snapshot = Snapshot { state: *state, t };

        let dq = quaternion_derivative(&self.raw_quaternion(), &self.controls.angular_rate());
        CopterState::new(&dq, &self.coordinate_acceleration(), &self.velocity())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
    }

    pub fn parameters(&self) -> &VehicleParameters {
        &self.parameters
    }

    pub fn controls(&self) -> &ControlInputs {
        &self.controls
    }

    pub fn set_thrust(&mut self, thrust_command: f64) {
        self.controls
            .set_thrust(thrust_command, self.parameters.thrust_limit());
    }

    pub fn set_angular_rate(&mut self, angular_rate: Vector3<f64>) {
        self.controls.set_angular_rate(angular_rate);
    }

    pub fn time(&self) -> f64 {
        self.snapshot.t
    }

    pub fn state(&self) -> &CopterState {
        &self.snapshot.state
    }

    /// Body to NED rotation built from the stored quaternion as is.
    ///
    /// The quaternion is not normalized first, so if it has drifted off unit
    /// norm the matrix is no longer exactly orthogonal.
    pub fn orientation_matrix(&self) -> RotationMatrix {
        RotationMatrix::from(&self.raw_quaternion())
    }

    /// The stored quaternion, not normalized.
    pub fn raw_quaternion(&self) -> Quaternion {
        self.snapshot.state.quaternion()
    }

    /// The stored quaternion divided by its norm. Stored state is unchanged.
    pub fn quaternion(&self) -> Quaternion {
        self.raw_quaternion().normalize()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.snapshot.state.velocity()
    }

    pub fn position(&self) -> Vector3<f64> {
        self.snapshot.state.position()
    }

    pub fn angular_rate(&self) -> Vector3<f64> {
        self.controls.angular_rate()
    }

    /// Applied thrust after clamping [N].
    pub fn thrust(&self) -> f64 {
        self.controls.thrust()
    }

    /// `thrust_limit - thrust_command`, negative when the raw command exceeds the limit.
    pub fn thrust_headroom(&self) -> f64 {
        self.parameters.thrust_limit() - self.controls.thrust_command()
    }

    pub fn gravity_force(&self) -> Vector3<f64> {
        gravity_force(&self.parameters)
    }

    pub fn ground_contact_force(&self) -> Vector3<f64> {
        ground_contact_force(
            self.parameters.ground_contact(),
            &self.position(),
            &self.velocity(),
        )
    }

    pub fn drag_force(&self) -> Vector3<f64> {
        drag_force(&self.velocity())
    }

    pub fn thrust_force(&self) -> Vector3<f64> {
        thrust_force(&self.orientation_matrix(), self.controls.thrust())
    }

    /// Acceleration in NED [m/s^2].
    pub fn coordinate_acceleration(&self) -> Vector3<f64> {
        (self.gravity_force() + self.ground_contact_force() + self.drag_force() + self.thrust_force())
            / self.parameters.mass()
    }

    /// Specific force in the body frame, what an accelerometer would read.
    pub fn proper_acceleration(&self) -> Vector3<f64> {
        self.orientation_matrix()
            .transform(&(self.coordinate_acceleration() - self.parameters.gravity()))
    }

    /// Body up `(0, 0, -1)` in NED.
    pub fn up_vector(&self) -> Vector3<f64> {
        self.orientation_matrix()
            .rotate(&Vector3::new(0.0, 0.0, -1.0))
    }

    /// Body forward `(1, 0, 0)` in NED.
    pub fn forward_vector(&self) -> Vector3<f64> {
        self.orientation_matrix()
            .rotate(&Vector3::new(1.0, 0.0, 0.0))
    }

    /// Body right `(0, 1, 0)` in NED.
    pub fn right_vector(&self) -> Vector3<f64> {
        self.orientation_matrix()
            .rotate(&Vector3::new(0.0, 1.0, 0.0))
    }
}

impl OdeModel for CopterDynamics {
    type State = CopterState;

    fn f(
        &mut self,
        t: f64,
        state: &CopterState,
        derivative: &mut CopterState,
    ) -> Result<(), Box<dyn Error>> {
        *derivative = self.derivative(state, t);
        Ok(())
    }
}
