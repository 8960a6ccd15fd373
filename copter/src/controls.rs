use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Commands held constant between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    /// Thrust as commanded, before clamping [N].
    thrust_command: f64,
    /// Thrust actually applied, in `[0, thrust_limit]` [N].
    thrust: f64,
    /// Body angular rate [rad/s].
    angular_rate: Vector3<f64>,
}

impl ControlInputs {
    /// Stores the raw command and clamps the applied thrust into `[0, thrust_limit]`.
    ///
    /// Out of range commands are not an error. A NaN command is applied as
    /// NaN.
    pub fn set_thrust(&mut self, thrust_command: f64, thrust_limit: f64) {
        self.thrust_command = thrust_command;
        self.thrust = if thrust_command.is_nan() {
            thrust_command
        } else {
            thrust_command.max(0.0).min(thrust_limit)
        };
    }

    pub fn set_angular_rate(&mut self, angular_rate: Vector3<f64>) {
        self.angular_rate = angular_rate;
    }

    pub fn thrust_command(&self) -> f64 {
        self.thrust_command
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn angular_rate(&self) -> Vector3<f64> {
        self.angular_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thrust_clamping() {
        let mut controls = ControlInputs::default();

        controls.set_thrust(-5.0, 20.0);
        assert_eq!(controls.thrust(), 0.0);
        assert_eq!(controls.thrust_command(), -5.0);

        controls.set_thrust(100.0, 20.0);
        assert_eq!(controls.thrust(), 20.0);
        assert_eq!(controls.thrust_command(), 100.0);

        controls.set_thrust(10.0, 20.0);
        assert_eq!(controls.thrust(), 10.0);
    }

    #[test]
    fn test_nan_thrust_propagates() {
        let mut controls = ControlInputs::default();
        controls.set_thrust(f64::NAN, 20.0);
        assert!(controls.thrust().is_nan());
        assert!(controls.thrust_command().is_nan());
    }

    #[test]
    fn test_angular_rate_replaced() {
        let mut controls = ControlInputs::default();
        controls.set_angular_rate(Vector3::new(1.0, 2.0, 3.0));
        controls.set_angular_rate(Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(controls.angular_rate(), Vector3::new(0.0, 0.0, -1.0));
    }
}
