//! The simulation driver: a fixed-step clock over the whole patch.

use rand::Rng;

use crate::{
    error::SimError,
    grass::Grass,
    integrators::Dopri45,
    oscillator::Physics,
    types::Float,
    wind::{WindSource, WIND_MARGIN},
    GRAVITY,
};

/// Startup configuration surface. Everything here is fixed once the
/// simulator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub left: Float,
    pub right: Float,
    pub num_blades: usize,
    pub joints_per_blade: usize,
    pub wind_strength: Float,
    pub gravity: Float,
    pub spring_k: Float,
    pub damping_c: Float,
    pub dt: Float,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            left: -200.0,
            right: 200.0,
            num_blades: 200,
            joints_per_blade: 3,
            wind_strength: 50.0,
            gravity: GRAVITY,
            spring_k: 1.0,
            damping_c: 7.5,
            dt: 1.0 / 30.0,
        }
    }
}

impl SimConfig {
    /// The default wind layout: one source entering from the left, and a
    /// second mid-span source once the span is at least 400 wide.
    pub fn default_wind_sources(&self) -> Vec<WindSource> {
        let mut winds = vec![WindSource::new(
            self.left - WIND_MARGIN,
            50.0,
            40.0,
            self.wind_strength,
        )];
        if self.right - self.left >= 400.0 {
            winds.push(WindSource::new(0.0, 50.0, 40.0, self.wind_strength));
        }
        winds
    }
}

/// Whether simulation time is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Paused,
    Running,
}

/// Outcome of one completed `step` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Simulation clock after the call.
    pub time: Float,
    /// False when the simulator was paused and nothing changed.
    pub advanced: bool,
    /// Joints whose integration failed and were held at their last state.
    pub integration_failures: usize,
}

/// Drives global time forward over a [`Grass`] patch. Starts paused; the
/// external shell owns input, rendering and wind movement, and calls
/// [`Simulator::step`] once per frame.
#[derive(Debug, Clone)]
pub struct Simulator {
    pub grass: Grass,
    physics: Physics,
    solver: Dopri45,
    dt: Float,
    cur_time: Float,
    run_state: RunState,
}

impl Simulator {
    pub fn new(grass: Grass, physics: Physics, dt: Float) -> Result<Self, SimError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "timestep must be positive and finite, got {dt}"
            )));
        }

        Ok(Simulator {
            grass,
            physics,
            solver: Dopri45::default(),
            dt,
            cur_time: 0.0,
            run_state: RunState::Paused,
        })
    }

    /// Build the patch and driver in one go from a [`SimConfig`]. Jitter
    /// draws come from `rng`, so a seeded generator reproduces the exact
    /// same meadow.
    pub fn from_config(config: &SimConfig, rng: &mut impl Rng) -> Result<Self, SimError> {
        let grass = Grass::new(
            config.left,
            config.right,
            config.num_blades,
            config.joints_per_blade,
            rng,
        )?;
        let physics = Physics {
            gravity: config.gravity,
            spring_k: config.spring_k,
            damping_c: config.damping_c,
        };
        Simulator::new(grass, physics, config.dt)
    }

    pub fn time(&self) -> Float {
        self.cur_time
    }

    pub fn dt(&self) -> Float {
        self.dt
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn pause(&mut self) {
        self.run_state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.run_state = RunState::Running;
    }

    /// Re-base the global clock and every joint's last-integrated time.
    pub fn set_time(&mut self, t: Float) -> Result<(), SimError> {
        if !t.is_finite() {
            return Err(SimError::OutOfRange(format!("time must be finite, got {t}")));
        }
        self.cur_time = t;
        for blade in &mut self.grass.blades {
            blade.set_time(t);
        }
        Ok(())
    }

    /// Advance one fixed tick with `winds` frozen for its duration.
    ///
    /// Inputs are validated before any node is touched, so a rejected call
    /// leaves the whole simulation exactly as it was. While paused the call
    /// succeeds without advancing anything. Per-joint integration failures
    /// do not fail the tick; they are counted in the report and the affected
    /// joints hold their last good state.
    pub fn step(&mut self, winds: &[WindSource]) -> Result<StepReport, SimError> {
        for (i, wind) in winds.iter().enumerate() {
            if !wind.is_finite() {
                return Err(SimError::OutOfRange(format!(
                    "wind source {i} has a non-finite component"
                )));
            }
        }

        if self.run_state == RunState::Paused {
            return Ok(StepReport {
                time: self.cur_time,
                advanced: false,
                integration_failures: 0,
            });
        }

        self.cur_time += self.dt;

        // Blades never alias each other's state, so this loop could fan out
        // across threads with a join at the end; the serial order is not
        // load-bearing. Within each blade the root-to-tip order is.
        let mut failures = 0;
        for (b, blade) in self.grass.blades.iter_mut().enumerate() {
            for (joint, source) in blade.step(self.cur_time, winds, self.physics, &self.solver) {
                let err = SimError::Integration {
                    blade: b,
                    joint,
                    source,
                };
                log::warn!("t = {:.3}: {err}; joint holds its last state", self.cur_time);
                failures += 1;
            }
        }

        Ok(StepReport {
            time: self.cur_time,
            advanced: true,
            integration_failures: failures,
        })
    }
}

#[cfg(test)]
mod simulate_tests {
    use na::Vector2;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::assert_close;

    use super::*;

    fn small_config() -> SimConfig {
        SimConfig {
            num_blades: 6,
            ..SimConfig::default()
        }
    }

    fn positions(sim: &Simulator) -> Vec<Vector2<Float>> {
        sim.grass
            .blades
            .iter()
            .flat_map(|blade| blade.nodes.iter().map(|node| node.position))
            .collect()
    }

    #[test]
    fn starts_paused_and_paused_steps_change_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = Simulator::from_config(&small_config(), &mut rng).unwrap();
        let winds = small_config().default_wind_sources();

        assert_eq!(sim.run_state(), RunState::Paused);
        let before = positions(&sim);

        let report = sim.step(&winds).unwrap();
        assert!(!report.advanced);
        assert_close!(sim.time(), 0.0, 0.0);
        assert_eq!(positions(&sim), before);
    }

    #[test]
    fn pause_and_resume_transition_the_state_machine() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = Simulator::from_config(&small_config(), &mut rng).unwrap();

        sim.resume();
        assert_eq!(sim.run_state(), RunState::Running);
        let report = sim.step(&[]).unwrap();
        assert!(report.advanced);
        assert_close!(sim.time(), sim.dt(), 1e-15);

        sim.pause();
        let frozen = positions(&sim);
        sim.step(&[]).unwrap();
        assert_eq!(positions(&sim), frozen);
        assert_close!(sim.time(), sim.dt(), 1e-15);
    }

    /// Two seeded runs with identical wind trajectories must produce
    /// bit-for-bit identical position traces.
    #[test]
    fn seeded_runs_are_deterministic() {
        let config = small_config();

        let run = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut sim = Simulator::from_config(&config, &mut rng).unwrap();
            let mut winds = config.default_wind_sources();
            sim.resume();

            let mut trace = vec![];
            for _ in 0..100 {
                sim.step(&winds).unwrap();
                for wind in &mut winds {
                    wind.translate(10.0, config.left, config.right, WIND_MARGIN);
                }
                trace.push(positions(&sim));
            }
            trace
        };

        assert_eq!(run(), run());
    }

    /// A non-finite wind source fails the whole tick atomically.
    #[test]
    fn non_finite_wind_rejects_the_step_without_mutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = small_config();
        let mut sim = Simulator::from_config(&config, &mut rng).unwrap();
        let mut winds = config.default_wind_sources();
        sim.resume();

        for _ in 0..5 {
            sim.step(&winds).unwrap();
        }
        let time_before = sim.time();
        let before = positions(&sim);

        winds.push(WindSource::new(0.0, 50.0, 40.0, Float::NAN));
        let result = sim.step(&winds);

        assert!(matches!(result, Err(SimError::OutOfRange(_))));
        assert_close!(sim.time(), time_before, 0.0);
        assert_eq!(positions(&sim), before);
    }

    #[test]
    fn set_time_rebases_every_joint() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = Simulator::from_config(&small_config(), &mut rng).unwrap();

        sim.set_time(5.0).unwrap();
        assert_close!(sim.time(), 5.0, 0.0);
        for blade in &sim.grass.blades {
            for node in blade.nodes.iter().skip(1) {
                assert_close!(node.state.as_ref().unwrap().t, 5.0, 0.0);
            }
        }

        assert!(matches!(
            sim.set_time(Float::INFINITY),
            Err(SimError::OutOfRange(_))
        ));
    }

    #[test]
    fn invalid_timestep_is_rejected_at_construction() {
        let mut rng = StdRng::seed_from_u64(1);
        let grass = Grass::new(-10.0, 10.0, 2, 3, &mut rng).unwrap();

        for dt in [0.0, -1.0, Float::NAN] {
            let result = Simulator::new(grass.clone(), Physics::default(), dt);
            assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn wide_spans_get_a_second_wind_source() {
        let config = SimConfig::default();
        assert_eq!(config.default_wind_sources().len(), 2);

        let narrow = SimConfig {
            left: -100.0,
            right: 100.0,
            ..SimConfig::default()
        };
        assert_eq!(narrow.default_wind_sources().len(), 1);
    }
}
