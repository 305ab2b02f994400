//! Adaptive Dormand-Prince 4(5) integration over a two-component state.
//!
//! The solver is stateless: callers pass the state, the interval and the
//! right-hand side, and get back either the state at the target time or an
//! explicit failure. Nothing is committed on failure.

use na::{vector, Vector2};
use thiserror::Error;

use crate::types::Float;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationError {
    /// An intermediate state or derivative stopped being finite.
    #[error("state became non-finite")]
    NonFinite,

    /// The step budget ran out before reaching the target time.
    #[error("step budget exhausted")]
    StepBudgetExhausted,

    /// Repeated rejections drove the step size below the useful minimum.
    #[error("step size underflow")]
    StepUnderflow,
}

/// Embedded Dormand-Prince 4(5) with proportional step-size control.
///
/// Local error is estimated from the difference between the 4th and 5th
/// order solutions and scaled component-wise by
/// `abs_tol + rel_tol * max(|y0|, |y1|)`; a step is accepted when the
/// scaled RMS error is at most 1.
#[derive(Debug, Clone, Copy)]
pub struct Dopri45 {
    pub rel_tol: Float,
    pub abs_tol: Float,
    pub max_steps: usize,
}

impl Default for Dopri45 {
    fn default() -> Self {
        Dopri45 {
            rel_tol: 1e-6,
            abs_tol: 1e-8,
            max_steps: 1000,
        }
    }
}

const SAFETY: Float = 0.9;
const MIN_SCALE: Float = 0.2;
const MAX_SCALE: Float = 5.0;
const H_MIN: Float = 1e-12;

impl Dopri45 {
    /// Advance `y` from `t0` to `t1` under `f`, taking as many internal
    /// steps as the error control demands. `t1 <= t0` is a no-op.
    pub fn integrate<F>(
        &self,
        y0: Vector2<Float>,
        t0: Float,
        t1: Float,
        f: F,
    ) -> Result<Vector2<Float>, IntegrationError>
    where
        F: Fn(Float, &Vector2<Float>) -> Vector2<Float>,
    {
        if t1 <= t0 {
            return Ok(y0);
        }

        let mut t = t0;
        let mut y = y0;
        let mut h = t1 - t0;
        let mut k1 = f(t, &y); // FSAL: reused from the last accepted stage

        let mut steps = 0;
        while t < t1 {
            if steps >= self.max_steps {
                return Err(IntegrationError::StepBudgetExhausted);
            }
            steps += 1;

            if h < H_MIN {
                return Err(IntegrationError::StepUnderflow);
            }
            let h_step = h.min(t1 - t);

            let k2 = f(t + h_step / 5.0, &(y + h_step * (1.0 / 5.0) * k1));
            let k3 = f(
                t + h_step * 3.0 / 10.0,
                &(y + h_step * (3.0 / 40.0 * k1 + 9.0 / 40.0 * k2)),
            );
            let k4 = f(
                t + h_step * 4.0 / 5.0,
                &(y + h_step * (44.0 / 45.0 * k1 - 56.0 / 15.0 * k2 + 32.0 / 9.0 * k3)),
            );
            let k5 = f(
                t + h_step * 8.0 / 9.0,
                &(y + h_step
                    * (19372.0 / 6561.0 * k1 - 25360.0 / 2187.0 * k2 + 64448.0 / 6561.0 * k3
                        - 212.0 / 729.0 * k4)),
            );
            let k6 = f(
                t + h_step,
                &(y + h_step
                    * (9017.0 / 3168.0 * k1 - 355.0 / 33.0 * k2 + 46732.0 / 5247.0 * k3
                        + 49.0 / 176.0 * k4
                        - 5103.0 / 18656.0 * k5)),
            );

            // 5th order solution; its derivative doubles as stage 7.
            let y5 = y + h_step
                * (35.0 / 384.0 * k1 + 500.0 / 1113.0 * k3 + 125.0 / 192.0 * k4
                    - 2187.0 / 6784.0 * k5
                    + 11.0 / 84.0 * k6);
            let k7 = f(t + h_step, &y5);

            // 4th order solution, for the embedded error estimate only.
            let y4 = y + h_step
                * (5179.0 / 57600.0 * k1 + 7571.0 / 16695.0 * k3 + 393.0 / 640.0 * k4
                    - 92097.0 / 339200.0 * k5
                    + 187.0 / 2100.0 * k6
                    + 1.0 / 40.0 * k7);

            if !(y5.x.is_finite() && y5.y.is_finite() && y4.x.is_finite() && y4.y.is_finite()) {
                return Err(IntegrationError::NonFinite);
            }

            let err = self.scaled_error(&y, &y5, &y4);
            if err <= 1.0 {
                t += h_step;
                y = y5;
                k1 = k7;
            }

            let scale = if err > 0.0 {
                (SAFETY * err.powf(-0.2)).clamp(MIN_SCALE, MAX_SCALE)
            } else {
                MAX_SCALE
            };
            h = h_step * scale;
        }

        Ok(y)
    }

    /// Scaled RMS of the embedded error estimate.
    fn scaled_error(
        &self,
        y0: &Vector2<Float>,
        y5: &Vector2<Float>,
        y4: &Vector2<Float>,
    ) -> Float {
        let mut sum = 0.0;
        for i in 0..2 {
            let scale = self.abs_tol + self.rel_tol * y0[i].abs().max(y5[i].abs());
            let e = (y5[i] - y4[i]) / scale;
            sum += e * e;
        }
        (sum / 2.0).sqrt()
    }
}
