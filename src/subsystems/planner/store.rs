//! Itinerary store — the one piece of state with invariants.
//!
//! Both lists are only ever replaced wholesale. Every commit bumps
//! `generation` so the shell can tell stale snapshots apart.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{ItineraryItem, Location, TravelFilters};
use super::regenerate::regenerate;
use super::seed;
use super::sync::{Selection, sync_locations};

/// Read-only view handed to the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySnapshot {
    pub generation: u64,
    /// Sorted by day, the way the timeline shows it.
    pub itinerary: Vec<ItineraryItem>,
    pub locations: Vec<Location>,
    pub preferences: Vec<String>,
    pub filters: TravelFilters,
}

/// A plan computed at request time and committed later.
#[derive(Debug, Clone)]
pub struct PendingPlan {
    pub itinerary: Vec<ItineraryItem>,
    pub locations: Vec<Location>,
}

pub struct ItineraryStore {
    source: Vec<ItineraryItem>,
    pool: Vec<Location>,
    itinerary: Vec<ItineraryItem>,
    locations: Vec<Location>,
    preferences: Vec<String>,
    filters: TravelFilters,
    generation: u64,
    sample: Selection,
    rng: StdRng,
}

impl ItineraryStore {
    pub fn new(
        source: Vec<ItineraryItem>,
        pool: Vec<Location>,
        initial_locations: Vec<Location>,
        sample: Selection,
        rng: StdRng,
    ) -> Self {
        Self {
            itinerary: source.clone(),
            source,
            pool,
            locations: initial_locations,
            preferences: Vec::new(),
            filters: TravelFilters::default(),
            generation: 0,
            sample,
            rng,
        }
    }

    /// Store over the built-in Sri Lanka seed set.
    pub fn with_seed_data(seed: Option<u64>, sample_min: usize, sample_max: usize) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::new(
            seed::mock_itinerary(),
            seed::sri_lanka_locations(),
            seed::initial_locations(),
            Selection::Sample { min: sample_min, max: sample_max },
            rng,
        )
    }

    /// New plan with one map location per day, names matched. Commits now.
    pub fn regenerate(&mut self) -> ItinerarySnapshot {
        let itinerary = regenerate(&self.source, &mut self.rng);
        let locations = sync_locations(&itinerary, &self.pool, Selection::MatchItinerary, &mut self.rng);
        info!(days = itinerary.len(), locations = locations.len(), "itinerary regenerated");
        self.commit(PendingPlan { itinerary, locations })
    }

    /// Record `text` and compute the plan it triggers. The caller commits
    /// after the simulated processing delay.
    pub fn prepare_preference(&mut self, text: String) -> PendingPlan {
        debug!(preference = %text, "preference recorded");
        self.preferences.push(text);
        let itinerary = regenerate(&self.source, &mut self.rng);
        let locations = sync_locations(&itinerary, &self.pool, self.sample, &mut self.rng);
        PendingPlan { itinerary, locations }
    }

    /// Replace both lists.
    pub fn commit(&mut self, plan: PendingPlan) -> ItinerarySnapshot {
        self.itinerary = plan.itinerary;
        self.locations = plan.locations;
        self.generation += 1;
        debug!(generation = self.generation, "plan committed");
        self.snapshot()
    }

    pub fn set_filters(&mut self, filters: TravelFilters) -> TravelFilters {
        self.filters = filters.normalized();
        info!(filters = ?self.filters, "filters updated");
        self.filters.clone()
    }

    pub fn snapshot(&self) -> ItinerarySnapshot {
        let mut itinerary = self.itinerary.clone();
        itinerary.sort_by_key(|e| e.day);
        ItinerarySnapshot {
            generation: self.generation,
            itinerary,
            locations: self.locations.clone(),
            preferences: self.preferences.clone(),
            filters: self.filters.clone(),
        }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn filters(&self) -> &TravelFilters {
        &self.filters
    }

    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
