use copter_diffeq::Integrator;
use serde::{Deserialize, Serialize};

use crate::{sim::CopterSim, state::CopterState};

/// One row of flight data, flat so it serializes to a single CSV record.
///
/// Vectors are NED except `proper_acc_*` and `rate_*`, which are body frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub t: f64,
    pub q_s: f64,
    pub q_x: f64,
    pub q_y: f64,
    pub q_z: f64,
    pub vel_n: f64,
    pub vel_e: f64,
    pub vel_d: f64,
    pub pos_n: f64,
    pub pos_e: f64,
    pub pos_d: f64,
    pub proper_acc_x: f64,
    pub proper_acc_y: f64,
    pub proper_acc_z: f64,
    pub thrust: f64,
    pub thrust_headroom: f64,
    pub rate_x: f64,
    pub rate_y: f64,
    pub rate_z: f64,
}

impl Telemetry {
    pub fn from_sim<I: Integrator<CopterState>>(sim: &CopterSim<I>) -> Self {
        let q = sim.quaternion();
        let v = sim.velocity();
        let p = sim.position();
        let a = sim.proper_acceleration();
        let w = sim.angular_rate();
        Self {
            t: sim.time(),
            q_s: q.s,
            q_x: q.x,
            q_y: q.y,
            q_z: q.z,
            vel_n: v[0],
            vel_e: v[1],
            vel_d: v[2],
            pos_n: p[0],
            pos_e: p[1],
            pos_d: p[2],
            proper_acc_x: a[0],
            proper_acc_y: a[1],
            proper_acc_z: a[2],
            thrust: sim.thrust(),
            thrust_headroom: sim.thrust_headroom(),
            rate_x: w[0],
            rate_y: w[1],
            rate_z: w[2],
        }
    }
}
