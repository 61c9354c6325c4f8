//! Simulation output records.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One simulated lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap: u32,
    /// Lap duration including any pit loss.
    pub lap_time_ms: u64,
    pub degradation_ms: u64,
    /// Cumulative race time at the end of this lap.
    pub race_time_ms: u64,
    pub stint: u32,
    pub stint_lap: u32,
    /// Lap time relative to the baseline lap, for bar widths.
    pub width: f64,
    /// Fuel at lap start relative to tank capacity, in `0.0..=1.0`.
    pub fuel_height: f64,
    pub window_open: bool,
    pub pits: bool,
    /// Litres added on this lap once fuel is modeled.
    pub refuel: Option<Decimal>,
    pub fuel_at_start: Option<Decimal>,
}

/// A scheduled stop, in lap order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitStop {
    pub lap: u32,
    pub refuel: Option<Decimal>,
}

/// Fuel totals for a candidate that modeled consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelSummary {
    pub initial_fuel: Decimal,
    pub fuel_used: Decimal,
    pub required_tank: Decimal,
}

/// A feasible lap-by-lap plan for one stop count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationCandidate {
    pub stop_count: u32,
    /// Sum of every lap time.
    pub race_time_ms: u64,
    pub laps: Vec<LapRecord>,
    pub pit_stops: Vec<PitStop>,
    #[serde(default)]
    pub fuel: Option<FuelSummary>,
}

impl SimulationCandidate {
    #[must_use]
    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Number of stints driven; one more than the stops.
    #[must_use]
    pub fn stint_count(&self) -> usize {
        self.pit_stops.len() + 1
    }

    #[must_use]
    pub fn slowest_lap_ms(&self) -> u64 {
        self.laps.iter().map(|lap| lap.lap_time_ms).max().unwrap_or(0)
    }

    /// Lap count of every stint, in order.
    #[must_use]
    pub fn stint_lengths(&self) -> Vec<u32> {
        let mut lengths = vec![0_u32; self.stint_count()];
        for lap in &self.laps {
            if let Some(slot) = lengths.get_mut(lap.stint as usize) {
                *slot += 1;
            }
        }
        lengths
    }
}
