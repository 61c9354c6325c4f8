use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use stintwise_engine::numbers::u64_to_f64;
use stintwise_engine::{
    MAX_RANKED_STRATEGIES, SimulationCandidate, SimulationParams, search, simulate,
};

const SWEEP_SEEDS: u64 = 64;
const MAX_STOPS: u32 = 5;

fn random_params(rng: &mut ChaCha8Rng) -> SimulationParams {
    let race_minutes: u64 = rng.gen_range(10..=180);
    let lap_ms: u64 = rng.gen_range(60_000..=150_000);
    let mut params = SimulationParams::new(race_minutes * 60_000, lap_ms);
    if rng.gen_bool(0.5) {
        let window = rng.gen_range(0..=params.race_duration_ms);
        params = params.with_window(window);
    }
    if rng.gen_bool(0.6) {
        params = params.with_degradation(rng.gen_range(0.0..4.0));
    }
    if rng.gen_bool(0.7) {
        params = params.with_pitstop(rng.gen_range(0.0..45.0));
    }
    if rng.gen_bool(0.3) {
        params = params.with_stint_limit(rng.gen_range(600.0..4_000.0));
    }
    if rng.gen_bool(0.6) {
        let tank = rng.gen_bool(0.7).then(|| rng.gen_range(20.0..120.0));
        let extra = rng.gen_bool(0.5).then(|| rng.gen_range(0.0..3.0));
        params = params.with_fuel(rng.gen_range(0.8..4.5), tank, extra);
    }
    params
}

fn assert_candidate_invariants(stops: u32, params: &SimulationParams, c: &SimulationCandidate) {
    assert_eq!(c.pit_stops.len(), stops as usize);
    assert_eq!(c.stop_count, stops);

    let total: u64 = c.laps.iter().map(|lap| lap.lap_time_ms).sum();
    assert_eq!(total, c.race_time_ms);
    assert!(c.race_time_ms >= params.race_duration_ms);
    assert!(c.race_time_ms < params.race_duration_ms + c.slowest_lap_ms());

    let mut previous = 0;
    for (index, lap) in c.laps.iter().enumerate() {
        assert_eq!(lap.lap as usize, index);
        assert!(lap.race_time_ms > previous);
        previous = lap.race_time_ms;
    }
    assert_eq!(c.laps.last().map(|lap| lap.race_time_ms), Some(c.race_time_ms));

    let mut stint_times: Vec<u64> = vec![0];
    for lap in &c.laps {
        let stint = lap.stint as usize;
        assert!(stint + 1 >= stint_times.len(), "stint {stint} reopened");
        assert!(stint <= stint_times.len(), "stint {stint} skipped");
        if stint == stint_times.len() {
            stint_times.push(0);
        }
        stint_times[stint] += lap.lap_time_ms;
    }
    assert!(stint_times.len() <= stops as usize + 1);
    if let Some(limit_ms) = params.stint_limit_ms() {
        for (stint, time_ms) in stint_times.iter().enumerate() {
            assert!(
                u64_to_f64(*time_ms) <= limit_ms,
                "stint {stint} runs {time_ms} ms over a {limit_ms} ms limit"
            );
        }
    }

    if let (Some(fuel), Some(tank)) = (c.fuel, params.fuel_model().and_then(|m| m.tank)) {
        assert!(
            fuel.required_tank <= tank,
            "needs {} L from a {tank} L tank",
            fuel.required_tank
        );
    }

    if c.fuel.is_some() {
        for lap in &c.laps {
            let level = lap.fuel_at_start.expect("fuel level recorded");
            assert!(level >= Decimal::ZERO, "negative fuel on lap {}", lap.lap);
        }
        for stop in &c.pit_stops {
            assert!(stop.refuel.is_some());
        }
    }
}

#[test]
fn feasible_candidates_hold_invariants() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let params = random_params(&mut rng);
        for stops in 0..=MAX_STOPS {
            if let Some(candidate) = simulate(stops, &params) {
                assert_candidate_invariants(stops, &params, &candidate);
            }
        }
    }
}

#[test]
fn simulation_is_deterministic() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let params = random_params(&mut rng);
        for stops in 0..=MAX_STOPS {
            assert_eq!(simulate(stops, &params), simulate(stops, &params));
        }
    }
}

#[test]
fn search_honours_ranking_contract() {
    for seed in 0..SWEEP_SEEDS {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let params = random_params(&mut rng);
        let ranked = search(0, 8, &params);
        assert!(ranked.len() <= MAX_RANKED_STRATEGIES);
        for (i, a) in ranked.iter().enumerate() {
            assert_eq!(a.stop_count, a.candidate.stop_count);
            for b in &ranked[i + 1..] {
                assert_ne!(a.stop_count, b.stop_count);
            }
        }
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.lap_count() > b.lap_count()
                    || (a.lap_count() == b.lap_count() && a.race_time_ms() <= b.race_time_ms())
            );
        }
    }
}
