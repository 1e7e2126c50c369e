//! Run configuration.

use hl_controls::{DEFAULT_OUTPUT_MAX, DEFAULT_OUTPUT_MIN, PidGains};
use hl_core::{Real, ensure_finite};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::plant::PlantParams;

/// Upper bound on `total_duration / dt`; the record is preallocated for every tick.
pub const MAX_STEPS: usize = 10_000_000;

/// Everything needed to reproduce one closed-loop run.
///
/// Missing fields in a YAML/JSON document fall back to [`SimConfig::default`],
/// which is the reference kettle scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Controller gains.
    pub gains: PidGains,
    /// Lower bound on heater power (percent).
    pub output_min: Real,
    /// Upper bound on heater power (percent).
    pub output_max: Real,
    /// Setpoint, constant for the whole run.
    pub target_temperature: Real,
    /// Plant temperature at t = 0.
    pub initial_temperature: Real,
    /// Fixed step (seconds).
    pub dt: Real,
    /// Simulated span (seconds).
    pub total_duration: Real,
    /// Plant calibration.
    pub plant: PlantParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::new(2.0, 0.1, 0.05),
            output_min: DEFAULT_OUTPUT_MIN,
            output_max: DEFAULT_OUTPUT_MAX,
            target_temperature: 80.0,
            initial_temperature: 20.0,
            dt: 0.1,
            total_duration: 100.0,
            plant: PlantParams::default(),
        }
    }
}

impl SimConfig {
    /// Reject anything the loop cannot run with. Called before any state is built.
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.dt, "dt must be finite")?;
        if self.dt <= 0.0 {
            return Err(SimError::InvalidConfig {
                what: "dt must be positive",
            });
        }
        ensure_finite(self.total_duration, "total_duration must be finite")?;
        if self.total_duration <= 0.0 {
            return Err(SimError::InvalidConfig {
                what: "total_duration must be positive",
            });
        }
        let ratio = self.total_duration / self.dt;
        if !ratio.is_finite() || ratio > MAX_STEPS as Real {
            return Err(SimError::InvalidConfig {
                what: "total_duration / dt exceeds the step limit",
            });
        }
        ensure_finite(self.output_min, "output_min must be finite")?;
        ensure_finite(self.output_max, "output_max must be finite")?;
        if self.output_min > self.output_max {
            return Err(SimError::InvalidConfig {
                what: "output_min must not exceed output_max",
            });
        }
        ensure_finite(self.target_temperature, "target_temperature must be finite")?;
        ensure_finite(self.initial_temperature, "initial_temperature must be finite")?;
        self.plant.validate()
    }

    /// Number of ticks: `floor(total_duration / dt)`.
    pub fn step_count(&self) -> usize {
        (self.total_duration / self.dt).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_reference_scenario() {
        let cfg = SimConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.step_count(), 1000);
        assert_eq!(cfg.gains, PidGains::new(2.0, 0.1, 0.05));
        assert_eq!((cfg.output_min, cfg.output_max), (0.0, 100.0));
    }

    #[test]
    fn rejects_bad_time_settings() {
        let zero_dt = SimConfig {
            dt: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(
            zero_dt.validate(),
            Err(SimError::InvalidConfig {
                what: "dt must be positive"
            })
        );

        let negative_duration = SimConfig {
            total_duration: -5.0,
            ..SimConfig::default()
        };
        assert!(negative_duration.validate().is_err());

        let nan_dt = SimConfig {
            dt: Real::NAN,
            ..SimConfig::default()
        };
        assert!(nan_dt.validate().is_err());
    }

    #[test]
    fn rejects_inverted_output_limits() {
        let cfg = SimConfig {
            output_min: 50.0,
            output_max: 10.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_step_count_beyond_limit() {
        let tiny_dt = SimConfig {
            dt: 1e-300,
            total_duration: 1e10,
            ..SimConfig::default()
        };
        assert_eq!(
            tiny_dt.validate(),
            Err(SimError::InvalidConfig {
                what: "total_duration / dt exceeds the step limit"
            })
        );

        let at_limit = SimConfig {
            dt: 1.0,
            total_duration: MAX_STEPS as Real,
            ..SimConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let just_over = SimConfig {
            dt: 1.0,
            total_duration: MAX_STEPS as Real + 1.0,
            ..SimConfig::default()
        };
        assert!(just_over.validate().is_err());
    }

    #[test]
    fn step_count_floors() {
        let cfg = SimConfig {
            dt: 0.25,
            total_duration: 10.1,
            ..SimConfig::default()
        };
        assert_eq!(cfg.step_count(), 40);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "target_temperature: 60.0\ngains:\n  kp: 1.5\n  ki: 0.2\n  kd: 0.0\n";
        let cfg: SimConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.target_temperature, 60.0);
        assert_eq!(cfg.gains.kp, 1.5);
        assert_eq!(cfg.dt, 0.1);
        assert_eq!(cfg.plant, PlantParams::default());
    }
}
