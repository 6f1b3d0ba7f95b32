//! Supervisor event bus — typed request/notification channel between the
//! shell (comms channels) and the subsystems.
//!
//! Every message carries a `method` string of the form
//! `"prefix[/component[/action]]"`; the supervisor routes on `prefix` only.
//! Payloads are a closed enum so handlers match on types, not JSON.

use std::{error::Error, fmt};

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::subsystems::chat::{ChatMessage, ChatPhase};
use crate::subsystems::planner::PlannerCommand;
use crate::subsystems::planner::map::MapView;
use crate::subsystems::planner::model::{Location, TravelFilters};
use crate::subsystems::planner::store::ItinerarySnapshot;

// ── Error codes ──────────────────────────────────────────────────────────────

pub const ERR_METHOD_NOT_FOUND: i32 = -32601;
pub const ERR_INVALID_PARAMS: i32 = -32602;
pub const ERR_INTERNAL: i32 = -32000;

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum BusPayload {
    Empty,
    /// Raw text typed by the user on `channel_id`.
    ChatSubmit { channel_id: String, content: String },
    /// Reply to `ChatSubmit`: the appended user message, or `None` when the
    /// submission was ignored.
    ChatTurn { accepted: Option<ChatMessage> },
    Transcript { messages: Vec<ChatMessage>, phase: ChatPhase },
    Planner(PlannerCommand),
    Itinerary(Box<ItinerarySnapshot>),
    Filters(TravelFilters),
    Map(MapView),
    MapSelect { name: String },
    Selected(Option<Location>),
    JsonResponse { data: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusError {
    pub code: i32,
    pub message: String,
}

impl BusError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(ERR_METHOD_NOT_FOUND, format!("method not found: {method}"))
    }

    pub fn unsupported_payload(method: &str) -> Self {
        Self::new(ERR_INVALID_PARAMS, format!("unsupported payload for method: {method}"))
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl Error for BusError {}

pub type BusResult = Result<BusPayload, BusError>;

// ── Messages ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum BusMessage {
    Request {
        id: Uuid,
        method: String,
        payload: BusPayload,
        reply_tx: oneshot::Sender<BusResult>,
    },
    Notification {
        method: String,
        payload: BusPayload,
    },
}

// ── Handle ───────────────────────────────────────────────────────────────────

/// Cloneable sending side of the bus.
#[derive(Clone)]
pub struct BusHandle {
    tx: mpsc::Sender<BusMessage>,
}

impl BusHandle {
    pub fn new(tx: mpsc::Sender<BusMessage>) -> Self {
        Self { tx }
    }

    /// Send a request and wait for the handler's reply.
    pub async fn request(
        &self,
        method: impl Into<String>,
        payload: BusPayload,
    ) -> Result<BusResult, BusCallError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BusMessage::Request {
                id: Uuid::new_v4(),
                method: method.into(),
                payload,
                reply_tx,
            })
            .await
            .map_err(|_| BusCallError::Send)?;

        reply_rx.await.map_err(|_| BusCallError::Recv)
    }

    /// Fire-and-forget notification. Waits for queue capacity when the
    /// supervisor is busy; errors only when the supervisor is gone.
    pub async fn send_notification(
        &self,
        method: impl Into<String>,
        payload: BusPayload,
    ) -> Result<(), BusCallError> {
        self.tx
            .send(BusMessage::Notification { method: method.into(), payload })
            .await
            .map_err(|_| BusCallError::Send)
    }
}

/// Owns the supervisor-side receiver.
pub struct SupervisorBus {
    pub rx: mpsc::Receiver<BusMessage>,
    pub handle: BusHandle,
}

impl SupervisorBus {
    pub fn new(buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer);
        Self { rx, handle: BusHandle::new(tx) }
    }
}

/// Call-level transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusCallError {
    Send,
    Recv,
}

impl fmt::Display for BusCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusCallError::Send => write!(f, "bus send failed: supervisor is not running"),
            BusCallError::Recv => write!(f, "bus recv failed: handler dropped reply sender"),
        }
    }
}

impl Error for BusCallError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_round_trips_through_receiver() {
        let mut bus = SupervisorBus::new(4);
        let handle = bus.handle.clone();

        let responder = tokio::spawn(async move {
            match bus.rx.recv().await {
                Some(BusMessage::Request { method, reply_tx, .. }) => {
                    assert_eq!(method, "planner/itinerary");
                    let _ = reply_tx.send(Ok(BusPayload::Empty));
                }
                other => panic!("unexpected message: {other:?}"),
            }
        });

        let reply = handle.request("planner/itinerary", BusPayload::Empty).await.unwrap();
        assert!(matches!(reply, Ok(BusPayload::Empty)));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn request_fails_when_supervisor_gone() {
        let bus = SupervisorBus::new(4);
        let handle = bus.handle.clone();
        drop(bus);
        let err = handle.request("chat", BusPayload::Empty).await.unwrap_err();
        assert_eq!(err, BusCallError::Send);
    }

    #[tokio::test]
    async fn dropped_reply_is_recv_error() {
        let mut bus = SupervisorBus::new(4);
        let handle = bus.handle.clone();
        tokio::spawn(async move {
            // Receive and drop without replying.
            let _ = bus.rx.recv().await;
        });
        let err = handle.request("chat", BusPayload::Empty).await.unwrap_err();
        assert_eq!(err, BusCallError::Recv);
    }

    #[tokio::test]
    async fn send_notification_waits_for_capacity() {
        let mut bus = SupervisorBus::new(1);
        let handle = bus.handle.clone();
        handle.send_notification("planner/a", BusPayload::Empty).await.unwrap();

        let sender = handle.clone();
        let pending = tokio::spawn(async move { sender.send_notification("planner/b", BusPayload::Empty).await });

        for expected in ["planner/a", "planner/b"] {
            match bus.rx.recv().await {
                Some(BusMessage::Notification { method, .. }) => assert_eq!(method, expected),
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert_eq!(pending.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn send_notification_fails_when_supervisor_gone() {
        let bus = SupervisorBus::new(1);
        let handle = bus.handle.clone();
        drop(bus);
        assert_eq!(handle.send_notification("planner", BusPayload::Empty).await.unwrap_err(), BusCallError::Send);
    }

    #[test]
    fn bus_error_display_includes_code() {
        let e = BusError::method_not_found("nope/x");
        assert_eq!(e.code, ERR_METHOD_NOT_FOUND);
        assert_eq!(e.to_string(), "method not found: nope/x (-32601)");
    }
}
