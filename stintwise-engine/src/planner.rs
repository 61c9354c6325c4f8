//! Caller-side planning session around the strategy search.
use crate::SettingsStore;
use crate::debounce::{DebounceGate, Generation};
use crate::params::SimulationParams;
use crate::search::{RankedStrategy, StrategyBoard, search};
use crate::settings::StrategySettings;

/// Snapshot of the inputs for one search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub generation: Generation,
    pub params: SimulationParams,
    pub min_stops: u32,
    pub max_stops: u32,
}

impl SearchRequest {
    /// Run the search for this snapshot.
    #[must_use]
    pub fn run(&self) -> SearchOutcome {
        SearchOutcome {
            generation: self.generation,
            strategies: search(self.min_stops, self.max_stops, &self.params),
        }
    }
}

/// Search results tagged with the generation that requested them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub generation: Generation,
    pub strategies: Vec<RankedStrategy>,
}

/// Owns the inputs, the debounce gate, and the latest ranked board.
#[derive(Debug, Clone)]
pub struct StrategyPlanner {
    params: SimulationParams,
    min_stops: u32,
    max_stops: u32,
    gate: DebounceGate,
    board: StrategyBoard,
    board_generation: Option<Generation>,
    restored_selection: Option<usize>,
}

impl StrategyPlanner {
    /// Construct a planner whose first search is due immediately.
    #[must_use]
    pub fn new(params: SimulationParams, min_stops: u32, max_stops: u32) -> Self {
        Self::with_gate(params, min_stops, max_stops, DebounceGate::default())
    }

    #[must_use]
    pub fn with_gate(
        params: SimulationParams,
        min_stops: u32,
        max_stops: u32,
        mut gate: DebounceGate,
    ) -> Self {
        gate.notify(0);
        Self {
            params,
            min_stops,
            max_stops,
            gate,
            board: StrategyBoard::default(),
            board_generation: None,
            restored_selection: None,
        }
    }

    /// Replace the parameters; unchanged values do not restart the gate.
    pub fn set_params(&mut self, params: SimulationParams, now_ms: u64) {
        if params != self.params {
            self.params = params;
            self.gate.notify(now_ms);
        }
    }

    /// Replace the stop-count range; unchanged values do not restart the gate.
    pub fn set_stop_range(&mut self, min_stops: u32, max_stops: u32, now_ms: u64) {
        if (min_stops, max_stops) != (self.min_stops, self.max_stops) {
            self.min_stops = min_stops;
            self.max_stops = max_stops;
            self.gate.notify(now_ms);
        }
    }

    /// Take the pending search request once the inputs have been quiet long enough.
    pub fn pending_request(&mut self, now_ms: u64) -> Option<SearchRequest> {
        self.gate.poll(now_ms).map(|generation| self.request(generation))
    }

    fn request(&self, generation: Generation) -> SearchRequest {
        SearchRequest {
            generation,
            params: self.params.clone(),
            min_stops: self.min_stops,
            max_stops: self.max_stops,
        }
    }

    /// Install search results unless newer input has superseded them.
    pub fn accept(&mut self, outcome: SearchOutcome) -> bool {
        if !self.gate.is_current(outcome.generation) {
            log::debug!(
                "discarding stale search results from generation {}",
                outcome.generation.value()
            );
            return false;
        }
        self.board = StrategyBoard::new(outcome.strategies);
        self.board_generation = Some(outcome.generation);
        if let Some(index) = self.restored_selection.take() {
            self.board.select(index);
        }
        true
    }

    /// Run the search synchronously when the gate fires.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.pending_request(now_ms) {
            Some(request) => self.accept(request.run()),
            None => false,
        }
    }

    /// Run any pending search now, ignoring the quiet period.
    pub fn flush(&mut self) -> bool {
        match self.gate.flush() {
            Some(generation) => self.accept(self.request(generation).run()),
            None => false,
        }
    }

    /// Drop a pending search without running it.
    pub fn cancel_pending(&mut self) {
        self.gate.cancel();
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn select(&mut self, index: usize) -> bool {
        self.board.select(index)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&RankedStrategy> {
        self.board.selected()
    }

    #[must_use]
    pub const fn board(&self) -> &StrategyBoard {
        &self.board
    }

    #[must_use]
    pub const fn board_generation(&self) -> Option<Generation> {
        self.board_generation
    }

    #[must_use]
    pub const fn params(&self) -> &SimulationParams {
        &self.params
    }

    #[must_use]
    pub const fn stop_range(&self) -> (u32, u32) {
        (self.min_stops, self.max_stops)
    }

    /// Persistable view of the current inputs and selection.
    #[must_use]
    pub fn settings(&self) -> StrategySettings {
        StrategySettings::capture(
            &self.params,
            self.min_stops,
            self.max_stops,
            self.board.selected_index(),
        )
    }

    /// Apply stored settings; the stored selection is restored after the next search.
    pub fn apply_settings(&mut self, settings: &StrategySettings, now_ms: u64) {
        let params = settings.apply_to(&self.params);
        self.set_params(params, now_ms);
        self.set_stop_range(settings.min_stops, settings.max_stops, now_ms);
        self.restored_selection = settings.selected;
    }

    /// Save the current settings under `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the settings cannot be written.
    pub fn save_to<S: SettingsStore>(&self, store: &S, key: &str) -> Result<(), S::Error> {
        store.save_settings(key, &self.settings())
    }

    /// Restore settings saved under `key`, returning whether any were found.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the settings cannot be read.
    pub fn restore_from<S: SettingsStore>(
        &mut self,
        store: &S,
        key: &str,
        now_ms: u64,
    ) -> Result<bool, S::Error> {
        match store.load_settings(key)? {
            Some(settings) => {
                self.apply_settings(&settings, now_ms);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
