//! Ranked search across a range of stop counts.
use serde::{Deserialize, Serialize};

use crate::candidate::SimulationCandidate;
use crate::constants::MAX_RANKED_STRATEGIES;
use crate::params::SimulationParams;
use crate::simulator::simulate;

/// A feasible candidate tagged with the stop count that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStrategy {
    pub stop_count: u32,
    pub candidate: SimulationCandidate,
}

impl RankedStrategy {
    #[must_use]
    pub fn lap_count(&self) -> usize {
        self.candidate.lap_count()
    }

    #[must_use]
    pub const fn race_time_ms(&self) -> u64 {
        self.candidate.race_time_ms
    }
}

/// Simulate every stop count in `min_stops..=max_stops` and rank the feasible ones.
///
/// More completed laps rank first; equal lap counts prefer the shorter race
/// time. Equal keys keep iteration order, so fewer stops win ties. At most
/// one entry per stop count and at most [`MAX_RANKED_STRATEGIES`] entries
/// are returned.
#[must_use]
pub fn search(min_stops: u32, max_stops: u32, params: &SimulationParams) -> Vec<RankedStrategy> {
    if !params.is_complete() {
        return Vec::new();
    }

    // Stop counts above the lap count can never land on distinct laps.
    let last_stops = max_stops.min(params.max_stop_count());
    let mut ranked: Vec<RankedStrategy> = (min_stops..=last_stops)
        .filter_map(|stop_count| {
            simulate(stop_count, params).map(|candidate| RankedStrategy {
                stop_count,
                candidate,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.lap_count()
            .cmp(&a.lap_count())
            .then_with(|| a.race_time_ms().cmp(&b.race_time_ms()))
    });

    let mut unique: Vec<RankedStrategy> = Vec::with_capacity(ranked.len());
    for strategy in ranked {
        if !unique.iter().any(|kept| kept.stop_count == strategy.stop_count) {
            unique.push(strategy);
        }
    }
    unique.truncate(MAX_RANKED_STRATEGIES);

    log::debug!(
        "search {min_stops}..={max_stops}: {} ranked strategies",
        unique.len()
    );
    unique
}

/// Ranked strategies plus the caller's current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyBoard {
    strategies: Vec<RankedStrategy>,
    selected: Option<usize>,
}

impl StrategyBoard {
    /// Board for a fresh result list, selecting the top entry when present.
    #[must_use]
    pub fn new(strategies: Vec<RankedStrategy>) -> Self {
        let selected = if strategies.is_empty() { None } else { Some(0) };
        Self {
            strategies,
            selected,
        }
    }

    /// Run a search and select its top entry.
    #[must_use]
    pub fn from_search(min_stops: u32, max_stops: u32, params: &SimulationParams) -> Self {
        Self::new(search(min_stops, max_stops, params))
    }

    #[must_use]
    pub fn strategies(&self) -> &[RankedStrategy] {
        &self.strategies
    }

    #[must_use]
    pub const fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn selected(&self) -> Option<&RankedStrategy> {
        self.selected.and_then(|index| self.strategies.get(index))
    }

    /// Change the selection; returns `false` and keeps the old one when out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.strategies.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }
}
