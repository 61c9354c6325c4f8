//! Fuel sizing and per-lap fuel levels.
//!
//! Quantities are decimals at millilitre precision. Stint totals are rounded
//! to three places before any ceiling is taken so that accumulated drift can
//! never push a whole-litre requirement up or down by one.
use rust_decimal::Decimal;

use crate::candidate::{FuelSummary, LapRecord};
use crate::constants::{FUEL_DECIMALS, TANK_MARGIN_LITERS};
use crate::params::FuelModel;

/// Fuel levels and refuels for a simulated lap sequence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FuelPlan {
    pub summary: FuelSummary,
    /// Capacity used to normalize fuel heights.
    pub capacity: Decimal,
    /// Fuel at the start of each lap.
    pub levels: Vec<Decimal>,
    /// Litres added at each pit stop, in stop order.
    pub refuels: Vec<Decimal>,
}

/// Why a fuel plan could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FuelShortfall {
    TankTooSmall { tank: Decimal, required: Decimal },
}

/// Litres burned by each stint.
pub(crate) fn stint_totals(model: &FuelModel, stint_lengths: &[u32]) -> Vec<Decimal> {
    stint_lengths
        .iter()
        .map(|&laps| (model.per_lap * Decimal::from(laps)).round_dp(FUEL_DECIMALS))
        .collect()
}

/// Smallest tank that carries the longest stint plus the safety margin.
pub(crate) fn required_tank(model: &FuelModel, totals: &[Decimal]) -> Decimal {
    let longest = totals.iter().copied().max().unwrap_or(Decimal::ZERO);
    (model.extra_fuel() + longest).ceil() + TANK_MARGIN_LITERS
}

/// Whole litres to add so the car carries at least `requirement`.
///
/// The requirement is rounded to millilitres first, which drops float drift
/// from the burn-rate conversion; the refuel is the ceiling of what remains.
pub(crate) fn refuel_amount(requirement: Decimal) -> Decimal {
    let requirement = requirement.round_dp(FUEL_DECIMALS);
    if requirement <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        requirement.ceil()
    }
}

/// Walk the laps assigning fuel levels and refuels.
pub(crate) fn plan_fuel(
    model: &FuelModel,
    laps: &[LapRecord],
    stint_lengths: &[u32],
) -> Result<FuelPlan, FuelShortfall> {
    let totals = stint_totals(model, stint_lengths);
    let required = required_tank(model, &totals);
    if let Some(tank) = model.tank
        && tank < required
    {
        return Err(FuelShortfall::TankTooSmall { tank, required });
    }

    let extra = model.extra_fuel();
    let first = totals.first().copied().unwrap_or(Decimal::ZERO);
    let initial = (extra + first).ceil();

    let mut level = initial;
    let mut levels = Vec::with_capacity(laps.len());
    let mut refuels = Vec::new();
    for lap in laps {
        levels.push(level);
        level -= model.per_lap;
        if lap.pits {
            let next_stint = totals
                .get(lap.stint as usize + 1)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let refuel = refuel_amount(next_stint + extra - level);
            level += refuel;
            refuels.push(refuel);
        }
    }

    let lap_count = u32::try_from(laps.len()).unwrap_or(u32::MAX);
    Ok(FuelPlan {
        summary: FuelSummary {
            initial_fuel: initial,
            fuel_used: (model.per_lap * Decimal::from(lap_count)).round_dp(FUEL_DECIMALS),
            required_tank: required,
        },
        capacity: model.tank.unwrap_or(required),
        levels,
        refuels,
    })
}
