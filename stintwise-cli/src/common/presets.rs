use stintwise_engine::SimulationParams;

/// A named race format with sensible stop-count bounds.
#[derive(Debug, Clone)]
pub struct RacePreset {
    pub key: &'static str,
    pub description: &'static str,
    pub params: SimulationParams,
    pub min_stops: u32,
    pub max_stops: u32,
}

impl RacePreset {
    fn new(
        key: &'static str,
        description: &'static str,
        params: SimulationParams,
        stops: (u32, u32),
    ) -> Self {
        Self {
            key,
            description,
            params,
            min_stops: stops.0,
            max_stops: stops.1,
        }
    }
}

pub fn catalog_presets() -> Vec<RacePreset> {
    vec![
        RacePreset::new(
            "sprint",
            "30 minute sprint, 1:45 laps, no constraints beyond a 25 s stop",
            SimulationParams::new(1_800_000, 105_000).with_pitstop(25.0),
            (0, 2),
        ),
        RacePreset::new(
            "feature",
            "60 minute feature race with a 20 minute mandatory pit window",
            SimulationParams::new(3_600_000, 90_000)
                .with_window(1_200_000)
                .with_pitstop(30.0)
                .with_degradation(1.5),
            (1, 3),
        ),
        RacePreset::new(
            "endurance",
            "6 hour endurance, 65 minute stint cap, 100 L tank",
            SimulationParams::new(21_600_000, 120_000)
                .with_pitstop(60.0)
                .with_stint_limit(3_900.0)
                .with_degradation(0.8)
                .with_fuel(3.2, Some(100.0), Some(1.0)),
            (4, 9),
        ),
        RacePreset::new(
            "fuel-limited",
            "90 minute race where a 70 L tank forces extra stops",
            SimulationParams::new(5_400_000, 100_000)
                .with_pitstop(35.0)
                .with_fuel(2.8, Some(70.0), Some(1.0)),
            (1, 4),
        ),
    ]
}

pub fn find_preset(name: &str) -> Option<RacePreset> {
    catalog_presets()
        .into_iter()
        .find(|preset| preset.key.eq_ignore_ascii_case(name.trim()))
}

pub fn list_presets() -> Vec<(&'static str, &'static str)> {
    catalog_presets()
        .into_iter()
        .map(|preset| (preset.key, preset.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stintwise_engine::search;

    #[test]
    fn every_preset_is_valid_and_has_a_feasible_strategy() {
        for preset in catalog_presets() {
            preset.params.validate().unwrap();
            assert!(preset.params.is_complete(), "{} incomplete", preset.key);
            assert!(preset.min_stops <= preset.max_stops);
            let ranked = search(preset.min_stops, preset.max_stops, &preset.params);
            assert!(!ranked.is_empty(), "{} has no feasible strategy", preset.key);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_preset("Feature").map(|p| p.key), Some("feature"));
        assert!(find_preset("rally").is_none());
        assert_eq!(list_presets().len(), catalog_presets().len());
    }

    #[test]
    fn fuel_limited_preset_rejects_single_stop() {
        let preset = find_preset("fuel-limited").unwrap();
        let ranked = search(preset.min_stops, preset.max_stops, &preset.params);
        assert!(ranked.iter().all(|strategy| strategy.stop_count >= 2));
    }
}
