//! Control loop performance metrics.
//!
//! Computes standard step-response metrics (rise time, settling time, overshoot,
//! steady-state error, actuator saturation) from a recorded run.

use hl_core::Real;
use hl_sim::{SimConfig, SimRecord};
use serde::{Deserialize, Serialize};

/// Settling band as a fraction of the larger of step size and setpoint magnitude.
pub const SETTLING_BAND: Real = 0.02;

/// Standard control loop performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoopMetrics {
    /// Final temperature minus setpoint
    pub steady_state_error: Option<Real>,
    /// Hottest recorded temperature
    pub peak_temperature: Option<Real>,
    /// Peak excursion beyond the setpoint, in degrees (None if never crossed)
    pub overshoot: Option<Real>,
    /// Overshoot as a percentage of the commanded step
    pub overshoot_pct: Option<Real>,
    /// Time to travel from 10% to 90% of the step toward the setpoint (seconds)
    pub rise_time_s: Option<Real>,
    /// Time after which the temperature stays within the settling band (seconds)
    pub settling_time_s: Option<Real>,
    /// Percentage of ticks with power pinned at the upper limit
    pub saturation_pct_upper: Option<Real>,
    /// Percentage of ticks with power pinned at the lower limit
    pub saturation_pct_lower: Option<Real>,
}

impl LoopMetrics {
    /// Returns true if at least some metrics were computed
    pub fn has_data(&self) -> bool {
        self.steady_state_error.is_some()
    }
}

/// Compute metrics for a recorded run.
///
/// # Arguments
/// * `record` - Recorded run
/// * `config` - Configuration the run was produced with; supplies the initial
///   temperature and the output limits used for saturation stats
pub fn compute_loop_metrics(record: &SimRecord, config: &SimConfig) -> LoopMetrics {
    let initial_temperature = config.initial_temperature;
    let (Some(final_temp), Some(&target)) = (record.final_temperature(), record.targets.last())
    else {
        return LoopMetrics::default();
    };

    let mut metrics = LoopMetrics {
        steady_state_error: Some(final_temp - target),
        peak_temperature: record.peak_temperature(),
        ..LoopMetrics::default()
    };

    let step = target - initial_temperature;
    if step.abs() > 1e-9 {
        // Excursion past the setpoint in the direction of travel
        let excursion = if step > 0.0 {
            record.peak_temperature().map(|peak| peak - target)
        } else {
            record
                .temperatures
                .iter()
                .copied()
                .reduce(Real::min)
                .map(|low| target - low)
        };
        if let Some(over) = excursion.filter(|o| *o > 0.0) {
            metrics.overshoot = Some(over);
            metrics.overshoot_pct = Some(over / step.abs() * 100.0);
        }

        let t10 = time_to_fraction(record, initial_temperature, step, 0.1);
        let t90 = time_to_fraction(record, initial_temperature, step, 0.9);
        if let (Some(a), Some(b)) = (t10, t90) {
            metrics.rise_time_s = Some(b - a);
        }
    }

    let reference = step.abs().max(target.abs());
    if reference > 1e-9 {
        metrics.settling_time_s = settling_time(record, target, SETTLING_BAND * reference);
    }

    let (lo, hi) = (config.output_min, config.output_max);
    metrics.saturation_pct_upper = Some(saturation_pct(&record.powers, |p| p >= hi));
    metrics.saturation_pct_lower = Some(saturation_pct(&record.powers, |p| p <= lo));

    metrics
}

/// First time the temperature covers `fraction` of the step, linearly interpolated.
fn time_to_fraction(record: &SimRecord, initial: Real, step: Real, fraction: Real) -> Option<Real> {
    let level = initial + fraction * step;
    let reached = |v: Real| if step > 0.0 { v >= level } else { v <= level };

    let mut prev: Option<(Real, Real)> = None;
    for (&t, &v) in record.times.iter().zip(&record.temperatures) {
        if reached(v) {
            if let Some((pt, pv)) = prev {
                let dv = v - pv;
                if dv.abs() > 1e-12 {
                    return Some(pt + (level - pv) / dv * (t - pt));
                }
            }
            return Some(t);
        }
        prev = Some((t, v));
    }
    None
}

/// Start time of the tick after the last sample outside `target ± band`.
fn settling_time(record: &SimRecord, target: Real, band: Real) -> Option<Real> {
    let outside = |v: &Real| (v - target).abs() > band;
    match record.temperatures.iter().rposition(outside) {
        None => record.times.first().copied(),
        Some(last) => record.times.get(last + 1).copied(),
    }
}

fn saturation_pct(powers: &[Real], pinned: impl Fn(Real) -> bool) -> Real {
    if powers.is_empty() {
        return 0.0;
    }
    let count = powers.iter().filter(|&&p| pinned(p)).count();
    count as Real / powers.len() as Real * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(temps: &[Real], powers: &[Real], target: Real) -> SimRecord {
        SimRecord {
            times: (0..temps.len()).map(|i| i as Real).collect(),
            temperatures: temps.to_vec(),
            powers: powers.to_vec(),
            targets: vec![target; temps.len()],
        }
    }

    fn starting_at(initial_temperature: Real) -> SimConfig {
        SimConfig {
            initial_temperature,
            ..SimConfig::default()
        }
    }

    #[test]
    fn empty_record_has_no_metrics() {
        let m = compute_loop_metrics(&SimRecord::default(), &starting_at(20.0));
        assert!(!m.has_data());
    }

    #[test]
    fn overshoot_and_error() {
        let r = record(
            &[40.0, 70.0, 90.0, 85.0, 80.0],
            &[100.0, 100.0, 0.0, 0.0, 50.0],
            80.0,
        );
        let m = compute_loop_metrics(&r, &starting_at(20.0));
        assert_eq!(m.steady_state_error, Some(0.0));
        assert_eq!(m.peak_temperature, Some(90.0));
        assert_eq!(m.overshoot, Some(10.0));
        let pct = m.overshoot_pct.unwrap();
        assert!((pct - 10.0 / 60.0 * 100.0).abs() < 1e-9);
        assert_eq!(m.saturation_pct_upper, Some(40.0));
        assert_eq!(m.saturation_pct_lower, Some(40.0));
        // 85 is outside the 1.6 band; settled from t=4
        assert_eq!(m.settling_time_s, Some(4.0));
    }

    #[test]
    fn no_overshoot_when_approaching_from_below() {
        let r = record(&[30.0, 50.0, 70.0, 79.0], &[100.0; 4], 80.0);
        let m = compute_loop_metrics(&r, &starting_at(20.0));
        assert_eq!(m.overshoot, None);
        // 10% level = 26 reached at t=0, 90% level = 74 between t=2 and t=3
        let rise = m.rise_time_s.unwrap();
        assert!((rise - (2.0 + 4.0 / 9.0)).abs() < 1e-9);
        assert_eq!(m.settling_time_s, Some(3.0));
    }

    #[test]
    fn never_settles() {
        let r = record(&[30.0, 40.0, 50.0], &[100.0; 3], 80.0);
        let m = compute_loop_metrics(&r, &starting_at(20.0));
        assert_eq!(m.settling_time_s, None);
        assert_eq!(m.rise_time_s, None);
    }

    #[test]
    fn cooling_step_overshoots_downward() {
        let r = record(&[60.0, 35.0, 38.0, 40.0], &[0.0, 0.0, 20.0, 20.0], 40.0);
        let m = compute_loop_metrics(&r, &starting_at(80.0));
        assert_eq!(m.overshoot, Some(5.0));
        assert_eq!(m.saturation_pct_lower, Some(50.0));
    }

    #[test]
    fn settles_onto_zero_setpoint() {
        // Band is 2% of the 20 degree step, not of the zero target
        let r = record(&[10.0, 2.0, 0.5, 0.1], &[0.0; 4], 0.0);
        let m = compute_loop_metrics(&r, &starting_at(20.0));
        assert_eq!(m.settling_time_s, Some(3.0));
    }
}
