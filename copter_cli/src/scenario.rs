use std::{fs, io, path::Path};

use copter::{CopterConfig, CopterErrors, CopterSim, GRAVITY, Telemetry};
use log::{debug, info};
use nalgebra::Vector3;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioErrors {
    #[error("{0}")]
    Copter(#[from] CopterErrors),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse scenario: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("could not serialize scenario: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
}

/// A control change that takes effect at the first step starting at or after `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub time: f64,
    /// [N]
    pub thrust: f64,
    /// Body rate [rad/s].
    pub angular_rate: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: CopterConfig,
    /// [s]
    pub duration: f64,
    pub schedule: Vec<Command>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            config: CopterConfig::default(),
            duration: 1.0,
            schedule: Vec::new(),
        }
    }
}

impl Scenario {
    /// Climb, hover, yaw a quarter turn, then cut thrust and land.
    pub fn demo() -> Self {
        let hover = GRAVITY;
        Self {
            config: CopterConfig::default(),
            duration: 10.0,
            schedule: vec![
                Command {
                    time: 0.0,
                    thrust: hover + 2.0,
                    angular_rate: [0.0; 3],
                },
                Command {
                    time: 1.0,
                    thrust: hover,
                    angular_rate: [0.0; 3],
                },
                Command {
                    time: 2.0,
                    thrust: hover,
                    angular_rate: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
                },
                Command {
                    time: 3.0,
                    thrust: hover,
                    angular_rate: [0.0; 3],
                },
                Command {
                    time: 4.0,
                    thrust: 0.0,
                    angular_rate: [0.0; 3],
                },
            ],
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioErrors> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ScenarioErrors> {
        let scenario: Self = ron::from_str(contents)?;
        scenario.config.validate()?;
        if !(scenario.duration > 0.0 && scenario.duration.is_finite()) {
            return Err(ScenarioErrors::InvalidDuration(scenario.duration));
        }
        Ok(scenario)
    }

    pub fn to_ron_string(&self) -> Result<String, ScenarioErrors> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    /// Number of steps of `config.dt` needed to cover `duration`.
    pub fn steps(&self) -> usize {
        // a duration that is a whole number of steps should not gain one to rounding
        (self.duration / self.config.dt * (1.0 - 1e-9)).ceil() as usize
    }

    /// Runs the scenario, writing a telemetry row before the first step and
    /// after every step. Returns the number of rows written.
    pub fn run<W: io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<usize, ScenarioErrors> {
        let mut sim = CopterSim::from_config(&self.config)?;

        let mut schedule = self.schedule.clone();
        schedule.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut pending = schedule.iter().peekable();
        // step start times accumulate rounding, so allow a sliver of a step
        let slack = 1e-9 * sim.dt();

        let steps = self.steps();
        let mut rows = 0;
        for step in 0..=steps {
            if step > 0 {
                sim.step()?;
            }
            let now = sim.time();
            while let Some(command) = pending.next_if(|c| now + slack >= c.time) {
                debug!(
                    "t = {now:.3}: thrust {} N, angular rate {:?} rad/s",
                    command.thrust,
                    command.angular_rate
                );
                sim.set_thrust(command.thrust);
                sim.set_angular_rate(Vector3::from(command.angular_rate));
            }
            writer.serialize(Telemetry::from_sim(&sim))?;
            rows += 1;
        }
        writer.flush()?;

        let p = sim.position();
        info!(
            "ran {steps} steps to t = {:.3} s, final position [{:.3}, {:.3}, {:.3}] m",
            sim.time(),
            p[0],
            p[1],
            p[2]
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    const TOL: f64 = 1e-9;

    fn rows(scenario: &Scenario) -> Vec<Telemetry> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let count = scenario.run(&mut writer).unwrap();
        let bytes = writer.into_inner().unwrap();
        let rows: Vec<Telemetry> = csv::Reader::from_reader(bytes.as_slice())
            .deserialize()
            .map(|row| row.unwrap())
            .collect();
        assert_eq!(rows.len(), count);
        rows
    }

    #[test]
    fn test_step_count() {
        let mut scenario = Scenario::default();
        scenario.duration = 0.1;
        assert_eq!(scenario.steps(), 10);
        scenario.duration = 0.105;
        assert_eq!(scenario.steps(), 11);
    }

    #[test]
    fn test_rows_and_times() {
        let mut scenario = Scenario::default();
        scenario.duration = 0.05;
        let rows = rows(&scenario);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].t, 0.0);
        assert_abs_diff_eq!(rows[5].t, 0.05, epsilon = TOL);
    }

    #[test]
    fn test_commands_held_from_their_time() {
        let mut scenario = Scenario::default();
        scenario.duration = 0.05;
        // out of order on purpose
        scenario.schedule = vec![
            Command {
                time: 0.03,
                thrust: 5.0,
                angular_rate: [0.0, 0.0, 1.0],
            },
            Command {
                time: 0.0,
                thrust: 25.0,
                angular_rate: [0.0; 3],
            },
        ];
        let rows = rows(&scenario);
        assert_eq!(rows[0].thrust, 20.0);
        assert_eq!(rows[0].thrust_headroom, -5.0);
        assert_eq!(rows[2].thrust, 20.0);
        assert_eq!(rows[3].thrust, 5.0);
        assert_eq!(rows[3].rate_z, 1.0);
        assert_eq!(rows[5].thrust, 5.0);
    }

    #[test]
    fn test_hover_scenario_holds_altitude() {
        let mut scenario = Scenario::default();
        scenario.schedule = vec![Command {
            time: 0.0,
            thrust: GRAVITY,
            angular_rate: [0.0; 3],
        }];
        let rows = rows(&scenario);
        for row in rows {
            assert_abs_diff_eq!(row.pos_d, -5.0, epsilon = TOL);
        }
    }

    #[test]
    fn test_demo_round_trip() {
        let demo = Scenario::demo();
        let parsed = Scenario::from_ron_str(&demo.to_ron_string().unwrap()).unwrap();
        assert_eq!(parsed, demo);
    }

    #[test]
    fn test_invalid_duration() {
        assert!(matches!(
            Scenario::from_ron_str("(duration: 0.0)"),
            Err(ScenarioErrors::InvalidDuration(_))
        ));
        assert!(matches!(
            Scenario::from_ron_str("(config: (dt: -0.1))"),
            Err(ScenarioErrors::Copter(CopterErrors::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_bundled_scenario_parses() {
        let text = include_str!("../../scenarios/hover_and_turn.ron");
        let scenario = Scenario::from_ron_str(text).unwrap();
        assert_eq!(scenario.duration, 10.0);
        assert_eq!(scenario.schedule.len(), 5);
        assert_eq!(scenario.config.dt, 0.01);
    }
}
