//! Discrete-time PID controller.
//!
//! Every update runs the same fixed sequence:
//! - error = setpoint - measured
//! - integral accumulates `error * dt`, then is clamped to the anti-windup band
//! - derivative is the backward difference against the previous call's error
//! - the raw sum P + I + D is clamped to the output limits
//!
//! The integral band is independent of the output limits. The raw, unclamped
//! sum never feeds back into the state.

use crate::error::{ControlError, ControlResult};
use hl_core::{Real, ensure_finite, ensure_positive};
use serde::{Deserialize, Serialize};

/// Anti-windup band applied to the integral accumulator: `[-limit, limit]`.
pub const DEFAULT_INTEGRAL_LIMIT: Real = 100.0;

/// Default output limits, interpreted as percent of actuator authority.
pub const DEFAULT_OUTPUT_MIN: Real = 0.0;
pub const DEFAULT_OUTPUT_MAX: Real = 100.0;

/// PID tuning gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: Real,
    /// Integral gain.
    pub ki: Real,
    /// Derivative gain.
    pub kd: Real,
}

impl PidGains {
    pub fn new(kp: Real, ki: Real, kd: Real) -> Self {
        Self { kp, ki, kd }
    }
}

/// Mutable controller state, advanced exactly once per successful update.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidState {
    /// Error seen on the previous update.
    pub previous_error: Real,
    /// Integral accumulator (sum of `error * dt`), always within the anti-windup band.
    pub integral: Real,
}

/// Breakdown of a single update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTerms {
    pub error: Real,
    pub p_term: Real,
    pub i_term: Real,
    pub d_term: Real,
    /// P + I + D before clamping.
    pub raw_output: Real,
    /// Raw output clamped to the output limits.
    pub output: Real,
}

/// Stateful PID controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    gains: PidGains,
    out_min: Real,
    out_max: Real,
    integral_limit: Real,
    state: PidState,
}

impl PidController {
    /// Create a new PID controller with zeroed state.
    ///
    /// # Arguments
    ///
    /// * `kp`, `ki`, `kd` - Tuning gains
    /// * `out_min`, `out_max` - Output clamp bounds (`out_min <= out_max`)
    pub fn new(kp: Real, ki: Real, kd: Real, out_min: Real, out_max: Real) -> ControlResult<Self> {
        Self::from_gains(PidGains::new(kp, ki, kd), out_min, out_max)
    }

    pub fn from_gains(gains: PidGains, out_min: Real, out_max: Real) -> ControlResult<Self> {
        ensure_finite(gains.kp, "kp must be finite")?;
        ensure_finite(gains.ki, "ki must be finite")?;
        ensure_finite(gains.kd, "kd must be finite")?;
        ensure_finite(out_min, "out_min must be finite")?;
        ensure_finite(out_max, "out_max must be finite")?;
        if out_min > out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must not exceed out_max",
            });
        }
        Ok(Self {
            gains,
            out_min,
            out_max,
            integral_limit: DEFAULT_INTEGRAL_LIMIT,
            state: PidState::default(),
        })
    }

    /// Replace the anti-windup band with `[-limit, limit]`.
    pub fn with_integral_limit(mut self, limit: Real) -> ControlResult<Self> {
        self.integral_limit = ensure_positive(limit, "integral limit must be positive")?;
        Ok(self)
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn output_limits(&self) -> (Real, Real) {
        (self.out_min, self.out_max)
    }

    pub fn integral_limit(&self) -> Real {
        self.integral_limit
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Forget the error history and the accumulated integral.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    /// Compute the clamped control signal for one time slice.
    ///
    /// `dt` is the real elapsed time represented by this step and must be
    /// strictly positive. Otherwise [`ControlError::NonPositiveDt`] is
    /// returned and the state is left as it was. Non-finite setpoint or
    /// measurement is rejected the same way with [`ControlError::NonFiniteInput`].
    pub fn update(&mut self, setpoint: Real, measured: Real, dt: Real) -> ControlResult<Real> {
        self.update_terms(setpoint, measured, dt).map(|terms| terms.output)
    }

    /// Same as [`update`](Self::update) but returns every term of the step.
    pub fn update_terms(
        &mut self,
        setpoint: Real,
        measured: Real,
        dt: Real,
    ) -> ControlResult<PidTerms> {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "rejected PID update with non-positive time step");
            return Err(ControlError::NonPositiveDt { dt });
        }
        for (what, value) in [("setpoint", setpoint), ("measured", measured)] {
            if !value.is_finite() {
                tracing::warn!(what, value, "rejected PID update with non-finite input");
                return Err(ControlError::NonFiniteInput { what, value });
            }
        }

        let error = setpoint - measured;

        let p_term = self.gains.kp * error;

        let integral = (self.state.integral + error * dt)
            .clamp(-self.integral_limit, self.integral_limit);
        let i_term = self.gains.ki * integral;

        let derivative = (error - self.state.previous_error) / dt;
        let d_term = self.gains.kd * derivative;

        let raw_output = p_term + i_term + d_term;

        self.state = PidState {
            previous_error: error,
            integral,
        };

        Ok(PidTerms {
            error,
            p_term,
            i_term,
            d_term,
            raw_output,
            output: raw_output.clamp(self.out_min, self.out_max),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn step() -> impl Strategy<Value = (Real, Real, Real)> {
        (-1.0e4_f64..1.0e4, -1.0e4_f64..1.0e4, 1.0e-3_f64..10.0)
    }

    proptest! {
        #[test]
        fn output_always_within_limits(
            kp in -50.0_f64..50.0,
            ki in -50.0_f64..50.0,
            kd in -50.0_f64..50.0,
            lo in -100.0_f64..100.0,
            span in 0.0_f64..200.0,
            steps in prop::collection::vec(step(), 1..40),
        ) {
            let hi = lo + span;
            let mut pid = PidController::new(kp, ki, kd, lo, hi).unwrap();
            for (sp, pv, dt) in steps {
                let out = pid.update(sp, pv, dt).unwrap();
                prop_assert!(out >= lo && out <= hi);
            }
        }

        #[test]
        fn integral_always_within_band(
            ki in -10.0_f64..10.0,
            steps in prop::collection::vec(step(), 1..60),
        ) {
            let mut pid = PidController::new(1.0, ki, 0.1, 0.0, 100.0).unwrap();
            for (sp, pv, dt) in steps {
                pid.update(sp, pv, dt).unwrap();
                let integral = pid.state().integral;
                prop_assert!((-DEFAULT_INTEGRAL_LIMIT..=DEFAULT_INTEGRAL_LIMIT).contains(&integral));
            }
        }
    }
}
