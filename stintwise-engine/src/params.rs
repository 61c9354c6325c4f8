//! Simulation inputs and their validation.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEGRADATION_REFERENCE_LAPS, MAX_FUEL_QUANTITY, MAX_RACE_LAPS, MS_PER_SEC,
};
use crate::numbers::{decimal_from_f64_3dp, round_f64_to_u64, u64_to_f64};

/// Race description and optional constraints for one simulation call.
///
/// Times are milliseconds unless the field name says seconds. Optional
/// values that are absent (or zero) disable the matching constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulationParams {
    pub race_duration_ms: u64,
    pub lap_time_ms: u64,
    #[serde(default)]
    pub window_duration_ms: Option<u64>,
    #[serde(default)]
    pub lap_degradation_secs: Option<f64>,
    #[serde(default)]
    pub pitstop_secs: Option<f64>,
    #[serde(default)]
    pub stint_duration_secs: Option<f64>,
    #[serde(default)]
    pub fuel_per_lap: Option<f64>,
    #[serde(default)]
    pub fuel_tank: Option<f64>,
    #[serde(default)]
    pub extra_laps: Option<f64>,
}

/// Errors raised when simulation parameters violate basic invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("{field} is too large (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("race of {race_ms} ms at {lap_ms} ms per lap exceeds {max_laps} laps")]
    TooManyLaps {
        race_ms: u64,
        lap_ms: u64,
        max_laps: u64,
    },
    #[error("pit window {window_ms} ms exceeds race duration {race_ms} ms")]
    WindowExceedsRace { window_ms: u64, race_ms: u64 },
}

/// Fuel inputs converted to millilitre-precision decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuelModel {
    pub per_lap: Decimal,
    pub tank: Option<Decimal>,
    pub extra_laps: Decimal,
}

impl FuelModel {
    /// Safety margin expressed in litres.
    #[must_use]
    pub fn extra_fuel(&self) -> Decimal {
        self.extra_laps * self.per_lap
    }
}

impl SimulationParams {
    #[must_use]
    pub fn new(race_duration_ms: u64, lap_time_ms: u64) -> Self {
        Self {
            race_duration_ms,
            lap_time_ms,
            ..Self::default()
        }
    }

    /// Load parameters from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into parameters.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_window(mut self, window_duration_ms: u64) -> Self {
        self.window_duration_ms = Some(window_duration_ms);
        self
    }

    #[must_use]
    pub fn with_degradation(mut self, secs_per_ten_laps: f64) -> Self {
        self.lap_degradation_secs = Some(secs_per_ten_laps);
        self
    }

    #[must_use]
    pub fn with_pitstop(mut self, secs: f64) -> Self {
        self.pitstop_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn with_stint_limit(mut self, secs: f64) -> Self {
        self.stint_duration_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn with_fuel(
        mut self,
        per_lap: f64,
        tank: Option<f64>,
        extra_laps: Option<f64>,
    ) -> Self {
        self.fuel_per_lap = Some(per_lap);
        self.fuel_tank = tank;
        self.extra_laps = extra_laps;
        self
    }

    /// Both race duration and lap time are known.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.race_duration_ms > 0 && self.lap_time_ms > 0
    }

    /// Check the optional inputs for negative, non-finite or oversized values.
    ///
    /// Zero race duration or lap time is not an error; it marks incomplete input.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let optional = [
            ("lap_degradation_secs", self.lap_degradation_secs),
            ("pitstop_secs", self.pitstop_secs),
            ("stint_duration_secs", self.stint_duration_secs),
            ("fuel_per_lap", self.fuel_per_lap),
            ("fuel_tank", self.fuel_tank),
            ("extra_laps", self.extra_laps),
        ];
        for (field, value) in optional {
            if let Some(value) = value
                && (!value.is_finite() || value < 0.0)
            {
                return Err(ParamsError::InvalidValue { field, value });
            }
        }

        let max_ms = u64_to_f64(u64::MAX);
        let durations = [
            ("lap_degradation_secs", self.lap_degradation_secs),
            ("pitstop_secs", self.pitstop_secs),
            ("stint_duration_secs", self.stint_duration_secs),
        ];
        for (field, value) in durations {
            if let Some(value) = value
                && value * MS_PER_SEC >= max_ms
            {
                return Err(ParamsError::OutOfRange { field, value });
            }
        }
        for &(field, value) in &optional[3..] {
            if let Some(value) = value
                && value > MAX_FUEL_QUANTITY
            {
                return Err(ParamsError::OutOfRange { field, value });
            }
        }

        if let Some(laps) = self.max_lap_count()
            && laps > MAX_RACE_LAPS
        {
            return Err(ParamsError::TooManyLaps {
                race_ms: self.race_duration_ms,
                lap_ms: self.lap_time_ms,
                max_laps: MAX_RACE_LAPS,
            });
        }

        if let Some(window_ms) = self.window_duration_ms
            && self.race_duration_ms > 0
            && window_ms > self.race_duration_ms
        {
            return Err(ParamsError::WindowExceedsRace {
                window_ms,
                race_ms: self.race_duration_ms,
            });
        }
        Ok(())
    }

    /// Upper bound on simulated laps: no lap is shorter than the baseline lap.
    #[must_use]
    pub const fn max_lap_count(&self) -> Option<u64> {
        if self.is_complete() {
            Some(self.race_duration_ms.div_ceil(self.lap_time_ms))
        } else {
            None
        }
    }

    /// Most stops that could land on distinct laps; 0 for incomplete input.
    #[must_use]
    pub fn max_stop_count(&self) -> u32 {
        self.max_lap_count()
            .map_or(0, |laps| u32::try_from(laps).unwrap_or(u32::MAX))
    }

    /// Lap-time growth per completed stint lap, in milliseconds.
    #[must_use]
    pub fn degradation_step_ms(&self) -> f64 {
        self.lap_degradation_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map_or(0.0, |secs| secs * MS_PER_SEC / DEGRADATION_REFERENCE_LAPS)
    }

    /// Time lost on a pit lap, in milliseconds.
    #[must_use]
    pub fn pit_loss_ms(&self) -> u64 {
        self.pitstop_secs
            .map_or(0, |secs| round_f64_to_u64(secs * MS_PER_SEC))
    }

    /// Maximum stint length in milliseconds, when constrained.
    #[must_use]
    pub fn stint_limit_ms(&self) -> Option<f64> {
        self.stint_duration_secs
            .filter(|secs| *secs > 0.0)
            .map(|secs| secs * MS_PER_SEC)
    }

    /// Pit window width in milliseconds; `None` means the whole race.
    #[must_use]
    pub fn window_ms(&self) -> Option<u64> {
        self.window_duration_ms.filter(|window| *window > 0)
    }

    /// Fuel model when a positive burn rate is configured.
    #[must_use]
    pub fn fuel_model(&self) -> Option<FuelModel> {
        let per_lap = self
            .fuel_per_lap
            .and_then(decimal_from_f64_3dp)
            .filter(|per_lap| *per_lap > Decimal::ZERO)?;
        let tank = self
            .fuel_tank
            .filter(|tank| *tank > 0.0)
            .and_then(decimal_from_f64_3dp);
        let extra_laps = self
            .extra_laps
            .and_then(decimal_from_f64_3dp)
            .filter(|laps| *laps > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO);
        Some(FuelModel {
            per_lap,
            tank,
            extra_laps,
        })
    }
}
