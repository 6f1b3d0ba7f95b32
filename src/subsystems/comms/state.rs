//! Shared state for the Comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and are restricted to the typed
//! methods below. The raw [`BusHandle`] is private; channels cannot call
//! arbitrary bus methods or supervisor internals.
//!
//! [`CommsState::report_event`] lets a running channel signal the comms
//! manager without going through the supervisor bus.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use crate::error::AppError;
use crate::subsystems::chat::{ChatMessage, ChatPhase};
use crate::subsystems::events::{EventHub, SequencedEvent};
use crate::subsystems::planner::PlannerCommand;
use crate::subsystems::planner::map::MapView;
use crate::subsystems::planner::model::{Location, TravelFilters};
use crate::subsystems::planner::store::ItinerarySnapshot;
use crate::supervisor::bus::{BusHandle, BusPayload};

// ── Events ────────────────────────────────────────────────────────────────────

/// Events a channel sends back to the comms subsystem manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
    /// A new session/connection was established on the channel.
    SessionStarted { channel_id: String },
}

// ── State ─────────────────────────────────────────────────────────────────────

pub struct CommsState {
    /// Private so channels can't call arbitrary methods.
    bus: BusHandle,
    events: Arc<EventHub>,
    event_tx: mpsc::Sender<CommsEvent>,
}

fn unexpected(method: &str) -> AppError {
    AppError::Comms(format!("unexpected reply payload for {method}"))
}

impl CommsState {
    pub fn new(bus: BusHandle, events: Arc<EventHub>, event_tx: mpsc::Sender<CommsEvent>) -> Self {
        Self { bus, events, event_tx }
    }

    async fn call(&self, method: &str, payload: BusPayload) -> Result<BusPayload, AppError> {
        match self.bus.request(method, payload).await {
            Err(e) => Err(AppError::Comms(format!("bus error: {e}"))),
            Ok(Err(e)) => Err(AppError::Comms(format!("{method} error {}: {}", e.code, e.message))),
            Ok(Ok(reply)) => Ok(reply),
        }
    }

    async fn itinerary_call(&self, method: &str, payload: BusPayload) -> Result<ItinerarySnapshot, AppError> {
        match self.call(method, payload).await? {
            BusPayload::Itinerary(snapshot) => Ok(*snapshot),
            _ => Err(unexpected(method)),
        }
    }

    // ── chat ──────────────────────────────────────────────────────────────

    /// Submit user text. `None` means the input was blank and ignored.
    pub async fn send_chat(&self, channel_id: &str, content: String) -> Result<Option<ChatMessage>, AppError> {
        let payload = BusPayload::ChatSubmit { channel_id: channel_id.to_string(), content };
        match self.call("chat/submit", payload).await? {
            BusPayload::ChatTurn { accepted } => Ok(accepted),
            _ => Err(unexpected("chat/submit")),
        }
    }

    pub async fn set_draft(&self, channel_id: &str, content: String) -> Result<(), AppError> {
        let payload = BusPayload::ChatSubmit { channel_id: channel_id.to_string(), content };
        self.call("chat/draft", payload).await.map(|_| ())
    }

    pub async fn transcript(&self) -> Result<(Vec<ChatMessage>, ChatPhase), AppError> {
        match self.call("chat/transcript", BusPayload::Empty).await? {
            BusPayload::Transcript { messages, phase } => Ok((messages, phase)),
            _ => Err(unexpected("chat/transcript")),
        }
    }

    // ── planner ───────────────────────────────────────────────────────────

    pub async fn itinerary(&self) -> Result<ItinerarySnapshot, AppError> {
        self.itinerary_call("planner/itinerary", BusPayload::Empty).await
    }

    pub async fn regenerate(&self) -> Result<ItinerarySnapshot, AppError> {
        self.itinerary_call("planner/command", BusPayload::Planner(PlannerCommand::RegenerateRequested))
            .await
    }

    pub async fn export(&self) -> Result<ItinerarySnapshot, AppError> {
        self.itinerary_call("planner/command", BusPayload::Planner(PlannerCommand::ExportRequested))
            .await
    }

    pub async fn filters(&self) -> Result<TravelFilters, AppError> {
        match self.call("planner/filters", BusPayload::Empty).await? {
            BusPayload::Filters(filters) => Ok(filters),
            _ => Err(unexpected("planner/filters")),
        }
    }

    /// Returns the filters as stored, after clamping.
    pub async fn set_filters(&self, filters: TravelFilters) -> Result<TravelFilters, AppError> {
        let payload = BusPayload::Planner(PlannerCommand::FiltersChanged(filters));
        match self.call("planner/command", payload).await? {
            BusPayload::Filters(applied) => Ok(applied),
            _ => Err(unexpected("planner/command")),
        }
    }

    pub async fn map_view(&self) -> Result<MapView, AppError> {
        match self.call("planner/map", BusPayload::Empty).await? {
            BusPayload::Map(view) => Ok(view),
            _ => Err(unexpected("planner/map")),
        }
    }

    pub async fn select_location(&self, name: &str) -> Result<Option<Location>, AppError> {
        let payload = BusPayload::MapSelect { name: name.to_string() };
        match self.call("planner/map/select", payload).await? {
            BusPayload::Selected(location) => Ok(location),
            _ => Err(unexpected("planner/map/select")),
        }
    }

    // ── management ────────────────────────────────────────────────────────

    pub async fn management_health(&self) -> Result<String, AppError> {
        match self.call("manage/health", BusPayload::Empty).await? {
            BusPayload::JsonResponse { data } => Ok(data),
            _ => Err(unexpected("manage/health")),
        }
    }

    pub async fn management_tree(&self) -> Result<String, AppError> {
        match self.call("manage/tree", BusPayload::Empty).await? {
            BusPayload::JsonResponse { data } => Ok(data),
            _ => Err(unexpected("manage/tree")),
        }
    }

    // ── shell events ──────────────────────────────────────────────────────

    pub fn subscribe_events(&self) -> broadcast::Receiver<SequencedEvent> {
        self.events.subscribe()
    }

    pub fn events_since(&self, after: u64) -> Vec<SequencedEvent> {
        self.events.since(after)
    }

    /// Non-blocking: drops the event with a warning if the manager is behind
    /// or gone.
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}
