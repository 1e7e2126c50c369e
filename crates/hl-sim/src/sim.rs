//! Simulation runner and result recording.

use hl_controls::PidController;
use hl_core::Real;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::plant::ThermalPlant;

/// Progress snapshot emitted while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    /// Ticks completed so far.
    pub step: usize,
    pub total_steps: usize,
    /// Time stamp of the last completed tick (seconds).
    pub sim_time_s: Real,
    pub temperature: Real,
    pub power: Real,
    pub fraction_complete: Real,
}

/// One tick of a recorded run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimSample {
    pub time_s: Real,
    pub temperature: Real,
    pub power: Real,
    pub target: Real,
}

/// Record of simulation results: four parallel series, one entry per tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimRecord {
    /// Tick start times `i * dt` (seconds)
    pub times: Vec<Real>,
    /// Plant temperature after the tick
    pub temperatures: Vec<Real>,
    /// Heater power applied during the tick (percent)
    pub powers: Vec<Real>,
    /// Setpoint during the tick
    pub targets: Vec<Real>,
}

impl SimRecord {
    fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            temperatures: Vec::with_capacity(n),
            powers: Vec::with_capacity(n),
            targets: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, sample: SimSample) {
        self.times.push(sample.time_s);
        self.temperatures.push(sample.temperature);
        self.powers.push(sample.power);
        self.targets.push(sample.target);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn final_temperature(&self) -> Option<Real> {
        self.temperatures.last().copied()
    }

    pub fn peak_temperature(&self) -> Option<Real> {
        self.temperatures.iter().copied().reduce(Real::max)
    }

    pub fn sample(&self, i: usize) -> Option<SimSample> {
        Some(SimSample {
            time_s: *self.times.get(i)?,
            temperature: *self.temperatures.get(i)?,
            power: *self.powers.get(i)?,
            target: *self.targets.get(i)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = SimSample> + '_ {
        (0..self.len()).filter_map(|i| self.sample(i))
    }
}

/// Run a closed-loop simulation with a freshly built controller and plant.
pub fn run_sim(config: &SimConfig) -> SimResult<SimRecord> {
    run_sim_with_progress(config, None)
}

/// Same as [`run_sim`], reporting progress about every 1% of the run and once at the end.
pub fn run_sim_with_progress(
    config: &SimConfig,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord> {
    if let Err(e) = config.validate() {
        warn!(error = %e, "rejected simulation config");
        return Err(e);
    }

    let mut pid = PidController::from_gains(config.gains, config.output_min, config.output_max)?;
    let mut plant = ThermalPlant::new(config.plant, config.initial_temperature);

    let total_steps = config.step_count();
    let report_every = (total_steps / 100).max(1);
    let dt = config.dt;
    let target = config.target_temperature;

    info!(
        target_temperature = target,
        initial_temperature = config.initial_temperature,
        dt,
        steps = total_steps,
        "starting simulation"
    );
    debug!(gains = ?config.gains, plant = ?config.plant, "simulation parameters");

    let mut record = SimRecord::with_capacity(total_steps);

    for i in 0..total_steps {
        let t = i as Real * dt;

        let power = pid.update(target, plant.temperature(), dt)?;
        let temperature = plant.step(power, dt);
        if !temperature.is_finite() {
            return Err(SimError::NonPhysical {
                what: "plant temperature became non-finite",
            });
        }

        record.push(SimSample {
            time_s: t,
            temperature,
            power,
            target,
        });

        let step = i + 1;
        if let Some(cb) = progress.as_mut()
            && (step % report_every == 0 || step == total_steps)
        {
            cb(SimProgress {
                step,
                total_steps,
                sim_time_s: t,
                temperature,
                power,
                fraction_complete: step as Real / total_steps as Real,
            });
        }
    }

    info!(
        steps = record.len(),
        final_temperature = record.final_temperature(),
        "simulation finished"
    );

    Ok(record)
}
