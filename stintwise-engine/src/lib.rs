//! Stintwise Strategy Engine
//!
//! Platform-agnostic pit-stop strategy logic: a lap-by-lap race simulator
//! for a fixed number of stops and a ranked search across stop counts.
//! This crate performs no I/O; persistence and presentation belong to callers.

pub mod candidate;
pub mod constants;
pub mod debounce;
mod fuel;
pub mod numbers;
pub mod params;
pub mod planner;
pub mod search;
pub mod settings;
pub mod simulator;

// Re-export commonly used types
pub use candidate::{FuelSummary, LapRecord, PitStop, SimulationCandidate};
pub use constants::{DEFAULT_DEBOUNCE_MS, MAX_RANKED_STRATEGIES};
pub use debounce::{DebounceGate, Generation};
pub use params::{FuelModel, ParamsError, SimulationParams};
pub use planner::{SearchOutcome, SearchRequest, StrategyPlanner};
pub use search::{RankedStrategy, StrategyBoard, search};
pub use settings::StrategySettings;
pub use simulator::{PitSchedule, PitWindow, schedule_pit_times, simulate};

/// Trait for abstracting settings persistence.
/// Platform-specific implementations should provide this
pub trait SettingsStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save strategy settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be saved.
    fn save_settings(&self, key: &str, settings: &StrategySettings) -> Result<(), Self::Error>;

    /// Load strategy settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be loaded.
    fn load_settings(&self, key: &str) -> Result<Option<StrategySettings>, Self::Error>;

    /// Delete saved settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be deleted.
    fn delete_settings(&self, key: &str) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        saves: Rc<RefCell<HashMap<String, StrategySettings>>>,
    }

    impl SettingsStore for MemoryStore {
        type Error = Infallible;

        fn save_settings(
            &self,
            key: &str,
            settings: &StrategySettings,
        ) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(key.to_string(), settings.clone());
            Ok(())
        }

        fn load_settings(&self, key: &str) -> Result<Option<StrategySettings>, Self::Error> {
            Ok(self.saves.borrow().get(key).cloned())
        }

        fn delete_settings(&self, key: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn planner_settings_roundtrip_through_store() {
        let store = MemoryStore::default();
        let params = SimulationParams::new(3_600_000, 90_000)
            .with_pitstop(30.0)
            .with_stint_limit(2_000.0);
        let mut planner = StrategyPlanner::new(params, 1, 3);
        assert!(planner.flush());
        assert!(planner.select(1));
        planner.save_to(&store, "slot-one").unwrap();

        let mut fresh = StrategyPlanner::new(SimulationParams::new(3_600_000, 90_000), 0, 1);
        assert!(fresh.restore_from(&store, "slot-one", 0).unwrap());
        assert!(fresh.flush());
        assert_eq!(fresh.stop_range(), (1, 3));
        assert_eq!(fresh.params().pitstop_secs, Some(30.0));
        assert_eq!(fresh.board().selected_index(), Some(1));

        store.delete_settings("slot-one").unwrap();
        assert!(!fresh.restore_from(&store, "slot-one", 10).unwrap());
    }
}
