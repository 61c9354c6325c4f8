//! Centralized tuning constants for the Stintwise strategy engine.
//!
//! These values define the deterministic math for lap simulation and
//! strategy ranking. Keeping them together means the model can only be
//! adjusted through reviewed code changes.

use rust_decimal::Decimal;

// Time units ---------------------------------------------------------------
pub(crate) const MS_PER_SEC: f64 = 1000.0;

/// Degradation inputs are measured over this many laps.
pub(crate) const DEGRADATION_REFERENCE_LAPS: f64 = 10.0;

/// Longest race, counted in baseline laps, that will be simulated.
pub const MAX_RACE_LAPS: u64 = 100_000;

// Fuel model ---------------------------------------------------------------
/// Fuel quantities are carried at millilitre precision.
pub(crate) const FUEL_DECIMALS: u32 = 3;

/// Spare litre added on top of the largest stint when sizing the tank.
pub(crate) const TANK_MARGIN_LITERS: Decimal = Decimal::ONE;

/// Upper bound for fuel inputs (litres, or laps for the margin).
pub(crate) const MAX_FUEL_QUANTITY: f64 = 1.0e12;

// Strategy search ----------------------------------------------------------
/// Upper bound on the ranked strategy list.
pub const MAX_RANKED_STRATEGIES: usize = 5;

/// Quiet period applied to bursts of input changes before a search runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// Settings -----------------------------------------------------------------
pub const DEFAULT_MIN_STOPS: u32 = 0;
pub const DEFAULT_MAX_STOPS: u32 = 4;
