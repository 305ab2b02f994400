//! Damped torsional oscillator: the per-joint dynamical model.
//!
//! Each dynamic joint carries an angle and angular velocity governed by
//!
//! ```text
//! dθ/dt = ω
//! dω/dt = g·cos(θ) + (F_spring + F_wind) / mass
//! ```
//!
//! where the spring-damper term pulls θ toward the joint's rest angle and
//! the wind term applies only while the joint's resolved position sits
//! inside a wind source. The wind list and the position are frozen for the
//! duration of one external tick; the solver may still take several internal
//! sub-steps within it.

use na::{vector, Vector2};

use crate::{
    integrators::{Dopri45, IntegrationError},
    types::Float,
    wind::WindSource,
    GRAVITY,
};

/// Physical constants shared by every joint in the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    pub gravity: Float,
    pub spring_k: Float,
    pub damping_c: Float,
}

impl Default for Physics {
    fn default() -> Self {
        Physics {
            gravity: GRAVITY,
            spring_k: 1.0,
            damping_c: 7.5,
        }
    }
}

/// Everything the torque balance of one joint depends on, frozen for the
/// duration of one tick.
pub struct TorqueEnv<'a> {
    pub rest_angle_deg: Float,
    pub mass: Float,
    pub position: Vector2<Float>,
    pub winds: &'a [WindSource],
    pub physics: Physics,
}

/// Right-hand side of the joint ODE. `y` is (θ, ω); returns (dθ/dt, dω/dt).
///
/// The spring term measures the deflection in degrees, matching the
/// rest-angle units; this is part of the tuning of `spring_k`.
pub fn joint_derivative(y: &Vector2<Float>, env: &TorqueEnv) -> Vector2<Float> {
    let theta = y.x;
    let omega = y.y;
    let p = &env.physics;

    let F_spring = -p.spring_k * (theta.to_degrees() - env.rest_angle_deg) - p.damping_c * omega;

    let mut F_wind = 0.0;
    for wind in env.winds {
        if wind.contains(&env.position) {
            F_wind -= wind.strength * theta.sin();
        }
    }

    let a = p.gravity * theta.cos() + (F_spring + F_wind) / env.mass;
    vector![omega, a]
}

/// Angular state of one joint: angle, angular velocity, and the time the
/// state was last integrated to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorState {
    pub theta: Float,
    pub omega: Float,
    pub t: Float,
}

impl OscillatorState {
    pub fn new(theta: Float) -> Self {
        OscillatorState {
            theta,
            omega: 0.0,
            t: 0.0,
        }
    }

    /// Integrate this joint from its last time to `t1` under the frozen
    /// environment. On failure the state is left untouched and the error
    /// returned, so the caller decides how to degrade.
    pub fn advance(
        &mut self,
        t1: Float,
        env: &TorqueEnv,
        solver: &Dopri45,
    ) -> Result<(), IntegrationError> {
        let y = solver.integrate(vector![self.theta, self.omega], self.t, t1, |_t, y| {
            joint_derivative(y, env)
        })?;

        self.theta = y.x;
        self.omega = y.y;
        self.t = t1;
        Ok(())
    }
}
