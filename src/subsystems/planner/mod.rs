//! Planner subsystem — owns the itinerary store and answers `planner/*`.
//!
//! ```text
//! planner/itinerary     Empty              → Itinerary
//! planner/command       Planner(cmd)       → Itinerary | Filters | Empty
//! planner/filters       Empty              → Filters
//! planner/map           Empty              → Map
//! planner/map/select    MapSelect{name}    → Selected
//! ```
//!
//! `planner/command` is also accepted as a notification; the chat subsystem
//! uses it to forward preferences without waiting.

pub mod map;
pub mod model;
pub mod regenerate;
pub mod seed;
pub mod store;
pub mod sync;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::subsystems::events::{EventHub, ShellEvent};
use crate::supervisor::bus::{BusError, BusPayload, BusResult};
use crate::supervisor::dispatch::BusHandler;

use map::MapView;
use model::{LatLng, TravelFilters};
use store::ItineraryStore;

pub const TOAST_UPDATED: (&str, &str) = (
    "Itinerary Updated",
    "Your travel plan has been refreshed based on your preferences.",
);
pub const TOAST_REGENERATED: (&str, &str) =
    ("Itinerary Regenerated", "Your Sri Lanka adventure has been refreshed!");
pub const TOAST_EXPORT: (&str, &str) = ("Download Started", "Your itinerary is being prepared as a PDF.");

// ── Commands & errors ─────────────────────────────────────────────────────────

/// Typed commands the shell sends to the planner.
#[derive(Debug, Clone)]
pub enum PlannerCommand {
    RegenerateRequested,
    PreferenceSubmitted { text: String },
    FiltersChanged(TravelFilters),
    ExportRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlannerError {
    #[error("candidate pool too small: requested {requested}, available {available}")]
    CandidatePoolTooSmall { requested: usize, available: usize },

    #[error("itinerary days are not dense: expected day {expected}, found {found}")]
    NonDenseDays { expected: u32, found: u32 },
}

// ── Subsystem ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PlannerSubsystem {
    store: Arc<RwLock<ItineraryStore>>,
    events: Arc<EventHub>,
    update_delay: Duration,
    center: LatLng,
    has_api_key: bool,
}

impl PlannerSubsystem {
    pub fn new(
        store: ItineraryStore,
        events: Arc<EventHub>,
        update_delay: Duration,
        center: LatLng,
        has_api_key: bool,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            events,
            update_delay,
            center,
            has_api_key,
        }
    }

    pub fn from_config(config: &Config, events: Arc<EventHub>) -> Self {
        let store = ItineraryStore::with_seed_data(
            config.planner.seed,
            config.planner.sample_min,
            config.planner.sample_max,
        );
        let center = LatLng { lat: config.map.center_lat, lng: config.map.center_lng };
        Self::new(store, events, config.planner.update_delay(), center, config.map_api_key.is_some())
    }

    /// Apply a command. Preference updates return immediately and commit in
    /// a background task after `update_delay`.
    pub async fn apply(&self, command: PlannerCommand) -> BusResult {
        match command {
            PlannerCommand::RegenerateRequested => {
                let snapshot = self.store.write().await.regenerate();
                self.events.publish(ShellEvent::ItineraryUpdated(Box::new(snapshot.clone())));
                self.events.notify(TOAST_REGENERATED.0, TOAST_REGENERATED.1);
                Ok(BusPayload::Itinerary(Box::new(snapshot)))
            }
            PlannerCommand::PreferenceSubmitted { text } => {
                let pending = self.store.write().await.prepare_preference(text);
                let store = self.store.clone();
                let events = self.events.clone();
                let delay = self.update_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let snapshot = store.write().await.commit(pending);
                    info!(generation = snapshot.generation, "itinerary updated from preferences");
                    events.publish(ShellEvent::ItineraryUpdated(Box::new(snapshot)));
                    events.notify(TOAST_UPDATED.0, TOAST_UPDATED.1);
                });
                Ok(BusPayload::Empty)
            }
            PlannerCommand::FiltersChanged(filters) => {
                let applied = self.store.write().await.set_filters(filters);
                Ok(BusPayload::Filters(applied))
            }
            PlannerCommand::ExportRequested => {
                let snapshot = self.store.read().await.snapshot();
                info!(generation = snapshot.generation, "export requested");
                self.events.notify(TOAST_EXPORT.0, TOAST_EXPORT.1);
                Ok(BusPayload::Itinerary(Box::new(snapshot)))
            }
        }
    }

    pub async fn map_view(&self) -> MapView {
        let store = self.store.read().await;
        MapView::build(self.center, self.has_api_key, store.locations())
    }

    async fn dispatch(&self, method: &str, payload: BusPayload) -> BusResult {
        match (method, payload) {
            ("planner/itinerary", BusPayload::Empty) => {
                Ok(BusPayload::Itinerary(Box::new(self.store.read().await.snapshot())))
            }
            ("planner/command", BusPayload::Planner(cmd)) => self.apply(cmd).await,
            ("planner/filters", BusPayload::Empty) => {
                Ok(BusPayload::Filters(self.store.read().await.filters().clone()))
            }
            ("planner/map", BusPayload::Empty) => Ok(BusPayload::Map(self.map_view().await)),
            ("planner/map/select", BusPayload::MapSelect { name }) => {
                let store = self.store.read().await;
                let selected = map::select(store.locations(), &name).cloned();
                debug!(%name, found = selected.is_some(), "map marker selected");
                Ok(BusPayload::Selected(selected))
            }
            (
                "planner/itinerary" | "planner/command" | "planner/filters" | "planner/map"
                | "planner/map/select",
                _,
            ) => Err(BusError::unsupported_payload(method)),
            _ => Err(BusError::method_not_found(method)),
        }
    }
}

impl BusHandler for PlannerSubsystem {
    fn prefix(&self) -> &str {
        "planner"
    }

    fn handle_request(&self, method: &str, payload: BusPayload, reply_tx: oneshot::Sender<BusResult>) {
        let this = self.clone();
        let method = method.to_string();
        tokio::spawn(async move {
            let result = this.dispatch(&method, payload).await;
            let _ = reply_tx.send(result);
        });
    }

    fn handle_notification(&self, method: &str, payload: BusPayload) {
        match (method, payload) {
            ("planner/command", BusPayload::Planner(cmd)) => {
                let this = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = this.apply(cmd).await {
                        warn!("planner command failed: {e}");
                    }
                });
            }
            (other, _) => debug!(method = %other, "planner ignoring notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::planner::regenerate::check_dense_days;

    fn planner() -> (PlannerSubsystem, Arc<EventHub>) {
        let events = Arc::new(EventHub::new());
        let store = ItineraryStore::with_seed_data(Some(3), 4, 6);
        let center = LatLng { lat: 7.8731, lng: 80.7718 };
        let p = PlannerSubsystem::new(store, events.clone(), Duration::from_millis(1500), center, false);
        (p, events)
    }

    fn titles(events: &EventHub) -> Vec<String> {
        events
            .since(0)
            .into_iter()
            .filter_map(|e| match e.event {
                ShellEvent::Notification(n) => Some(n.title),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn regenerate_commits_now_and_toasts() {
        let (p, events) = planner();
        let reply = p.apply(PlannerCommand::RegenerateRequested).await.unwrap();
        let BusPayload::Itinerary(snap) = reply else { panic!("expected itinerary") };
        assert_eq!(snap.generation, 1);
        assert!(check_dense_days(snap.itinerary.iter().map(|e| e.day)).is_ok());
        assert_eq!(titles(&events), vec!["Itinerary Regenerated"]);
    }

    #[tokio::test(start_paused = true)]
    async fn preference_commits_after_delay() {
        let (p, events) = planner();
        p.apply(PlannerCommand::PreferenceSubmitted { text: "I love beaches and wildlife".into() })
            .await
            .unwrap();

        let snap = p.store.read().await.snapshot();
        assert_eq!(snap.preferences, vec!["I love beaches and wildlife".to_string()]);
        assert_eq!(snap.generation, 0);
        assert!(events.since(0).is_empty());

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert_eq!(p.store.read().await.generation(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(p.store.read().await.generation(), 1);
        assert_eq!(titles(&events), vec!["Itinerary Updated"]);
    }

    #[tokio::test]
    async fn export_returns_snapshot_without_changing_it() {
        let (p, events) = planner();
        let reply = p.apply(PlannerCommand::ExportRequested).await.unwrap();
        let BusPayload::Itinerary(snap) = reply else { panic!("expected itinerary") };
        assert_eq!(snap.generation, 0);
        assert_eq!(titles(&events), vec!["Download Started"]);
    }

    #[tokio::test]
    async fn filters_are_clamped() {
        let (p, _) = planner();
        let filters = TravelFilters { adventure_level: 9, budget: 43, ..Default::default() };
        let BusPayload::Filters(applied) = p.apply(PlannerCommand::FiltersChanged(filters)).await.unwrap() else {
            panic!("expected filters")
        };
        assert_eq!(applied.adventure_level, 5);
        assert_eq!(applied.budget, 50);
    }

    #[tokio::test]
    async fn map_select_and_routing_errors() {
        let (p, _) = planner();
        let reply = p.dispatch("planner/map/select", BusPayload::MapSelect { name: "kandy".into() }).await;
        match reply {
            Ok(BusPayload::Selected(Some(loc))) => assert_eq!(loc.name, "Kandy"),
            other => panic!("unexpected: {other:?}"),
        }
        let err = p.dispatch("planner/map", BusPayload::MapSelect { name: "x".into() }).await.unwrap_err();
        assert_eq!(err.code, crate::supervisor::bus::ERR_INVALID_PARAMS);
        let err = p.dispatch("planner/nope", BusPayload::Empty).await.unwrap_err();
        assert_eq!(err.code, crate::supervisor::bus::ERR_METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn map_view_follows_locations() {
        let (p, _) = planner();
        let view = p.map_view().await;
        assert_eq!(view.markers.len(), 6);
        assert_eq!(view.route.len(), 5);
        assert!(!view.has_api_key);
    }
}
