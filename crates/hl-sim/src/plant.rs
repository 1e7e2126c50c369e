//! First-order thermal plant.
//!
//! Heating is linear in heater power, cooling is Newtonian toward ambient,
//! and the state is advanced with one explicit Euler step per tick:
//!
//! ```text
//! heating = power * heating_coefficient * dt
//! cooling = (T - ambient) * cooling_coefficient * dt
//! T      += heating - cooling
//! ```

use hl_core::{Real, ensure_finite};
use serde::{Deserialize, Serialize};

use crate::error::SimResult;

/// Calibration constants of the thermal plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    /// Degrees per second gained per percent of heater power.
    pub heating_coefficient: Real,
    /// Fraction of the temperature excess over ambient lost per second.
    pub cooling_coefficient: Real,
    /// Temperature the plant relaxes toward with the heater off.
    pub ambient_temperature: Real,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            heating_coefficient: 0.1,
            cooling_coefficient: 0.02,
            ambient_temperature: 20.0,
        }
    }
}

impl PlantParams {
    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.heating_coefficient, "heating_coefficient must be finite")?;
        ensure_finite(self.cooling_coefficient, "cooling_coefficient must be finite")?;
        ensure_finite(self.ambient_temperature, "ambient_temperature must be finite")?;
        Ok(())
    }
}

/// Single lumped thermal mass.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalPlant {
    params: PlantParams,
    temperature: Real,
}

impl ThermalPlant {
    pub fn new(params: PlantParams, initial_temperature: Real) -> Self {
        Self {
            params,
            temperature: initial_temperature,
        }
    }

    pub fn temperature(&self) -> Real {
        self.temperature
    }

    /// Rate of change of temperature at the current state for the given power.
    pub fn rate(&self, power: Real) -> Real {
        power * self.params.heating_coefficient
            - (self.temperature - self.params.ambient_temperature)
                * self.params.cooling_coefficient
    }

    /// Advance the plant by `dt` with `power` applied; returns the new temperature.
    pub fn step(&mut self, power: Real, dt: Real) -> Real {
        let heating = (power * self.params.heating_coefficient) * dt;
        let cooling = (self.temperature - self.params.ambient_temperature)
            * self.params.cooling_coefficient
            * dt;
        self.temperature += heating - cooling;
        self.temperature
    }
}
