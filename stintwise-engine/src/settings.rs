//! User inputs that survive across sessions.
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_STOPS, DEFAULT_MIN_STOPS};
use crate::params::SimulationParams;

/// Persisted strategy inputs.
///
/// Race duration and lap time come from live data and are not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    #[serde(default)]
    pub window_duration_ms: Option<u64>,
    #[serde(default)]
    pub stint_duration_secs: Option<f64>,
    #[serde(default)]
    pub pitstop_secs: Option<f64>,
    #[serde(default)]
    pub lap_degradation_secs: Option<f64>,
    #[serde(default)]
    pub fuel_per_lap: Option<f64>,
    #[serde(default)]
    pub fuel_tank: Option<f64>,
    #[serde(default)]
    pub extra_laps: Option<f64>,
    #[serde(default = "default_min_stops")]
    pub min_stops: u32,
    #[serde(default = "default_max_stops")]
    pub max_stops: u32,
    #[serde(default)]
    pub selected: Option<usize>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            window_duration_ms: None,
            stint_duration_secs: None,
            pitstop_secs: None,
            lap_degradation_secs: None,
            fuel_per_lap: None,
            fuel_tank: None,
            extra_laps: None,
            min_stops: DEFAULT_MIN_STOPS,
            max_stops: DEFAULT_MAX_STOPS,
            selected: None,
        }
    }
}

impl StrategySettings {
    /// Capture the persisted subset of a planner's inputs.
    #[must_use]
    pub fn capture(
        params: &SimulationParams,
        min_stops: u32,
        max_stops: u32,
        selected: Option<usize>,
    ) -> Self {
        Self {
            window_duration_ms: params.window_duration_ms,
            stint_duration_secs: params.stint_duration_secs,
            pitstop_secs: params.pitstop_secs,
            lap_degradation_secs: params.lap_degradation_secs,
            fuel_per_lap: params.fuel_per_lap,
            fuel_tank: params.fuel_tank,
            extra_laps: params.extra_laps,
            min_stops,
            max_stops,
            selected,
        }
    }

    /// Overlay the stored constraints onto live race parameters.
    #[must_use]
    pub fn apply_to(&self, params: &SimulationParams) -> SimulationParams {
        SimulationParams {
            race_duration_ms: params.race_duration_ms,
            lap_time_ms: params.lap_time_ms,
            window_duration_ms: self.window_duration_ms,
            lap_degradation_secs: self.lap_degradation_secs,
            pitstop_secs: self.pitstop_secs,
            stint_duration_secs: self.stint_duration_secs,
            fuel_per_lap: self.fuel_per_lap,
            fuel_tank: self.fuel_tank,
            extra_laps: self.extra_laps,
        }
    }

    /// Load settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into settings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn default_min_stops() -> u32 {
    DEFAULT_MIN_STOPS
}

fn default_max_stops() -> u32 {
    DEFAULT_MAX_STOPS
}
