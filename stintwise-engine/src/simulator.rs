//! Lap-by-lap race simulation for a fixed number of pit stops.
use smallvec::SmallVec;

use crate::candidate::{LapRecord, PitStop, SimulationCandidate};
use crate::constants::MAX_RACE_LAPS;
use crate::fuel::{FuelShortfall, plan_fuel};
use crate::numbers::{decimal_to_f64, ms_ratio, round_f64_to_u64, u64_to_f64};
use crate::params::SimulationParams;

/// Scheduled pit times in milliseconds from race start.
pub type PitSchedule = SmallVec<[f64; 8]>;

/// Time range in which stops count toward the pit window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitWindow {
    pub open_ms: f64,
    pub close_ms: f64,
}

impl PitWindow {
    /// Window centered on half race distance, or the whole race when unset.
    #[must_use]
    pub fn for_params(params: &SimulationParams) -> Self {
        let race = u64_to_f64(params.race_duration_ms);
        match params.window_ms() {
            Some(window) => {
                let half_race = race / 2.0;
                let half_window = u64_to_f64(window) / 2.0;
                Self {
                    open_ms: half_race - half_window,
                    close_ms: half_race + half_window,
                }
            }
            None => Self {
                open_ms: 0.0,
                close_ms: race,
            },
        }
    }

    #[must_use]
    pub fn contains(&self, race_time_ms: u64) -> bool {
        let t = u64_to_f64(race_time_ms);
        t >= self.open_ms && t <= self.close_ms
    }
}

/// Place `stop_count` stops across the race.
///
/// A single stop lands at half race. With more stops the first and last are
/// pulled inside the window and the rest are spread evenly between them.
#[must_use]
pub fn schedule_pit_times(
    stop_count: u32,
    race_duration_ms: u64,
    window: PitWindow,
) -> PitSchedule {
    let race = u64_to_f64(race_duration_ms);
    match stop_count {
        0 => PitSchedule::new(),
        1 => smallvec::smallvec![race / 2.0],
        n => {
            let slots = f64::from(n) + 1.0;
            let first = window.open_ms.max(race / slots);
            let last = window.close_ms.min(f64::from(n) * race / slots);
            let span = f64::from(n - 1);
            (0..n)
                .map(|i| first + (last - first) * f64::from(i) / span)
                .collect()
        }
    }
}

fn falls_within(pit_time_ms: f64, lap_start_ms: u64, lap_time_ms: u64) -> bool {
    let start = u64_to_f64(lap_start_ms);
    pit_time_ms >= start && pit_time_ms < start + u64_to_f64(lap_time_ms)
}

/// Simulate a race with exactly `stop_count` stops.
///
/// Returns `None` for incomplete input, or when the plan breaks the stint or
/// fuel tank constraints, or when two stops collapse into the same lap.
/// More stops than the race has laps, races past [`MAX_RACE_LAPS`] and
/// race times beyond `u64` are rejected the same way.
#[must_use]
pub fn simulate(stop_count: u32, params: &SimulationParams) -> Option<SimulationCandidate> {
    let max_laps = params.max_lap_count()?;
    if max_laps > MAX_RACE_LAPS {
        log::debug!("race would run past {MAX_RACE_LAPS} laps");
        return None;
    }
    if u64::from(stop_count) > max_laps {
        log::debug!("{stop_count} stops: race holds at most {max_laps} laps");
        return None;
    }

    let window = PitWindow::for_params(params);
    let schedule = schedule_pit_times(stop_count, params.race_duration_ms, window);
    let base_lap_ms = params.lap_time_ms;
    let degradation_step = params.degradation_step_ms();
    let pit_loss_ms = params.pit_loss_ms();

    let mut laps: Vec<LapRecord> = Vec::new();
    let mut pit_stops: Vec<PitStop> = Vec::new();
    let mut stint_times: Vec<u64> = Vec::new();
    let mut stint_lengths: Vec<u32> = Vec::new();

    let mut race_time_ms = 0_u64;
    let mut lap = 0_u32;
    let mut stint = 0_u32;
    let mut stint_lap = 0_u32;
    let mut stint_time_ms = 0_u64;

    while race_time_ms < params.race_duration_ms {
        let degradation_ms = round_f64_to_u64(degradation_step * f64::from(stint_lap));
        let driven_ms = base_lap_ms.saturating_add(degradation_ms);
        let window_open = window.contains(race_time_ms);
        let pits = schedule
            .iter()
            .any(|&t| falls_within(t, race_time_ms, driven_ms));
        let lap_time_ms = if pits {
            driven_ms.saturating_add(pit_loss_ms)
        } else {
            driven_ms
        };

        let Some(next_race_time_ms) = race_time_ms.checked_add(lap_time_ms) else {
            log::debug!("{stop_count} stops: race time overflows on lap {lap}");
            return None;
        };
        race_time_ms = next_race_time_ms;
        stint_time_ms = stint_time_ms.saturating_add(lap_time_ms);
        laps.push(LapRecord {
            lap,
            lap_time_ms,
            degradation_ms,
            race_time_ms,
            stint,
            stint_lap,
            width: ms_ratio(lap_time_ms, base_lap_ms),
            fuel_height: 0.0,
            window_open,
            pits,
            refuel: None,
            fuel_at_start: None,
        });

        if pits {
            log::trace!("stop {} of {stop_count} on lap {lap}", pit_stops.len() + 1);
            pit_stops.push(PitStop { lap, refuel: None });
            stint_times.push(stint_time_ms);
            stint_lengths.push(stint_lap + 1);
            stint += 1;
            stint_lap = 0;
            stint_time_ms = 0;
        } else {
            stint_lap += 1;
        }
        lap += 1;
    }
    stint_times.push(stint_time_ms);
    stint_lengths.push(stint_lap);

    if pit_stops.len() != stop_count as usize {
        log::debug!(
            "{stop_count} stops: only {} landed on distinct laps",
            pit_stops.len()
        );
        return None;
    }

    if let Some(limit_ms) = params.stint_limit_ms()
        && let Some(longest) = stint_times.iter().copied().max()
        && u64_to_f64(longest) > limit_ms
    {
        log::debug!("{stop_count} stops: stint of {longest} ms exceeds {limit_ms} ms");
        return None;
    }

    let mut fuel = None;
    if let Some(model) = params.fuel_model() {
        let plan = match plan_fuel(&model, &laps, &stint_lengths) {
            Ok(plan) => plan,
            Err(FuelShortfall::TankTooSmall { tank, required }) => {
                log::debug!("{stop_count} stops: needs a {required} L tank, have {tank} L");
                return None;
            }
        };
        let capacity = decimal_to_f64(plan.capacity);
        for (record, level) in laps.iter_mut().zip(&plan.levels) {
            record.fuel_at_start = Some(*level);
            record.fuel_height = if capacity > 0.0 {
                (decimal_to_f64(*level) / capacity).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        for (stop, refuel) in pit_stops.iter_mut().zip(&plan.refuels) {
            stop.refuel = Some(*refuel);
            if let Some(record) = laps.get_mut(stop.lap as usize) {
                record.refuel = Some(*refuel);
            }
        }
        fuel = Some(plan.summary);
    }

    Some(SimulationCandidate {
        stop_count,
        race_time_ms,
        laps,
        pit_stops,
        fuel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const HOUR_MS: u64 = 3_600_000;
    const LAP_MS: u64 = 90_000;

    fn hour_race() -> SimulationParams {
        SimulationParams::new(HOUR_MS, LAP_MS)
    }

    #[test]
    fn schedule_places_single_stop_at_half_race() {
        let window = PitWindow::for_params(&hour_race());
        let times = schedule_pit_times(1, HOUR_MS, window);
        assert_eq!(times.as_slice(), &[1_800_000.0]);
        assert!(schedule_pit_times(0, HOUR_MS, window).is_empty());
    }

    #[test]
    fn schedule_spreads_stops_without_window() {
        let window = PitWindow::for_params(&hour_race());
        let times = schedule_pit_times(3, HOUR_MS, window);
        assert_eq!(times.as_slice(), &[900_000.0, 1_800_000.0, 2_700_000.0]);
    }

    #[test]
    fn schedule_clamps_to_window() {
        let params = hour_race().with_window(1_200_000);
        let window = PitWindow::for_params(&params);
        assert!((window.open_ms - 1_200_000.0).abs() < f64::EPSILON);
        assert!((window.close_ms - 2_400_000.0).abs() < f64::EPSILON);
        let times = schedule_pit_times(4, HOUR_MS, window);
        assert_eq!(
            times.as_slice(),
            &[1_200_000.0, 1_600_000.0, 2_000_000.0, 2_400_000.0]
        );
    }

    #[test]
    fn no_stop_race_runs_forty_laps() {
        let candidate = simulate(0, &hour_race()).unwrap();
        assert_eq!(candidate.lap_count(), 40);
        assert!(candidate.pit_stops.is_empty());
        assert_eq!(candidate.race_time_ms, HOUR_MS);
        assert!(candidate.fuel.is_none());
        assert!(candidate.laps.iter().all(|lap| (lap.width - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn single_stop_adds_pit_loss_on_lap_twenty() {
        let candidate = simulate(1, &hour_race().with_pitstop(30.0)).unwrap();
        assert_eq!(candidate.pit_stops, vec![PitStop { lap: 20, refuel: None }]);
        assert_eq!(candidate.race_time_ms, HOUR_MS + 30_000);
        let pit_lap = &candidate.laps[20];
        assert!(pit_lap.pits);
        assert_eq!(pit_lap.lap_time_ms, 120_000);
        assert_eq!(pit_lap.stint, 0);
        assert_eq!(candidate.laps[21].stint, 1);
        assert_eq!(candidate.laps[21].stint_lap, 0);
    }

    #[test]
    fn degradation_grows_within_stint_and_resets_after_stop() {
        let params = hour_race().with_degradation(1.0);
        let candidate = simulate(1, &params).unwrap();
        assert_eq!(candidate.laps[0].degradation_ms, 0);
        assert_eq!(candidate.laps[1].degradation_ms, 100);
        assert_eq!(candidate.laps[5].lap_time_ms, LAP_MS + 500);
        let stop_lap = candidate.pit_stops[0].lap as usize;
        assert_eq!(candidate.laps[stop_lap + 1].degradation_ms, 0);
    }

    #[test]
    fn window_flag_tracks_window_bounds() {
        let params = hour_race().with_window(1_200_000);
        let candidate = simulate(0, &params).unwrap();
        assert!(!candidate.laps[0].window_open);
        assert!(candidate.laps[20].window_open);
        assert!(!candidate.laps[39].window_open);
    }

    #[test]
    fn stops_sharing_a_lap_are_infeasible() {
        // Three stops inside a 1 s window cannot land on three distinct laps.
        let params = hour_race().with_window(1_000);
        assert!(simulate(3, &params).is_none());
        assert!(simulate(2, &params).is_some());
    }

    #[test]
    fn stint_limit_discards_long_stints() {
        let params = hour_race().with_stint_limit(1_500.0);
        assert!(simulate(0, &params).is_none());
        assert!(simulate(1, &params).is_none());
        assert!(simulate(2, &params).is_some());
    }

    #[test]
    fn fuel_walk_records_levels_and_refuel() {
        let params = hour_race().with_fuel(2.5, Some(60.0), None);
        let candidate = simulate(1, &params).unwrap();
        let fuel = candidate.fuel.unwrap();
        // 21 laps in the first stint at 2.5 L.
        assert_eq!(fuel.initial_fuel, Decimal::from(53));
        assert_eq!(fuel.required_tank, Decimal::from(54));
        assert_eq!(fuel.fuel_used, Decimal::from(100));
        let refuel = candidate.pit_stops[0].refuel.unwrap();
        assert_eq!(candidate.laps[20].refuel, Some(refuel));
        assert!(candidate
            .laps
            .iter()
            .all(|lap| lap.fuel_at_start.is_some_and(|f| f >= Decimal::ZERO)));
        assert!(candidate
            .laps
            .iter()
            .all(|lap| (0.0..=1.0).contains(&lap.fuel_height)));
    }

    #[test]
    fn oversized_pit_loss_and_degradation_do_not_overflow() {
        assert!(simulate(1, &hour_race().with_pitstop(1e20)).is_none());
        assert!(simulate(0, &hour_race().with_degradation(1e300)).is_none());

        // Saturated but representable lap times still produce a plan.
        let slow_stop = hour_race().with_pitstop(1e15);
        let candidate = simulate(1, &slow_stop).unwrap();
        assert_eq!(candidate.race_time_ms, 1_800_000 + 90_000 + 1_000_000_000_000_000_000);
        assert_eq!(candidate.lap_count(), 21);
    }

    #[test]
    fn stop_counts_beyond_lap_count_are_rejected_up_front() {
        assert!(simulate(41, &hour_race()).is_none());
        assert!(simulate(20_000_000, &hour_race()).is_none());
        assert!(simulate(u32::MAX, &hour_race()).is_none());
        // A race of u64::MAX ms at 1 ms per lap is never walked.
        assert!(simulate(0, &SimulationParams::new(u64::MAX, 1)).is_none());
    }

    #[test]
    fn incomplete_input_produces_nothing() {
        assert!(simulate(0, &SimulationParams::new(0, LAP_MS)).is_none());
        assert!(simulate(0, &SimulationParams::new(HOUR_MS, 0)).is_none());
    }
}
