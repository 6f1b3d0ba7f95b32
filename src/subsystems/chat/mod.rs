//! Chat subsystem — transcript, canned agent replies, and preference
//! forwarding to the planner.
//!
//! ```text
//! chat/submit      ChatSubmit{channel_id, content}  → ChatTurn{accepted}
//! chat/draft       ChatSubmit{channel_id, content}  → Empty
//! chat/transcript  Empty                            → Transcript
//! ```
//!
//! Each accepted submission starts its own reply timer. Timers are not
//! cancellable, so overlapping sends may interleave their replies.

mod replies;
mod session;

pub use replies::{AGENT_REPLIES, CannedReplies, GREETING};
pub use session::{ChatError, ChatMessage, ChatPhase, ChatSession, Sender};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::subsystems::events::{EventHub, ShellEvent};
use crate::subsystems::planner::PlannerCommand;
use crate::supervisor::bus::{BusError, BusHandle, BusPayload, BusResult};
use crate::supervisor::dispatch::BusHandler;

struct ChatState {
    session: ChatSession,
    replies: CannedReplies,
}

#[derive(Clone)]
pub struct ChatSubsystem {
    state: Arc<Mutex<ChatState>>,
    bus: BusHandle,
    events: Arc<EventHub>,
    reply_delay: Duration,
}

impl ChatSubsystem {
    pub fn new(bus: BusHandle, events: Arc<EventHub>, replies: CannedReplies, reply_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState { session: ChatSession::new(), replies })),
            bus,
            events,
            reply_delay,
        }
    }

    pub fn from_config(config: &Config, bus: BusHandle, events: Arc<EventHub>) -> Self {
        Self::new(bus, events, CannedReplies::new(config.chat.seed), config.chat.reply_delay())
    }

    /// Run one chat turn. Returns the appended user message, or `None` when
    /// the input was blank and nothing happened.
    pub async fn submit(&self, channel_id: &str, content: String) -> Option<ChatMessage> {
        let accepted = {
            let mut state = self.state.lock().await;
            match state.session.submit(content.clone()) {
                Ok(message) => message,
                Err(ChatError::InvalidInput) => {
                    debug!(%channel_id, "blank chat input ignored");
                    return None;
                }
            }
        };
        info!(%channel_id, id = %accepted.id, "chat message accepted");
        self.events.publish(ShellEvent::ChatMessage(accepted.clone()));

        let forward = BusPayload::Planner(PlannerCommand::PreferenceSubmitted { text: content });
        if let Err(e) = self.bus.send_notification("planner/command", forward).await {
            warn!("preference not forwarded to planner: {e}");
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let delay = self.reply_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = {
                let mut state = state.lock().await;
                let text = state.replies.pick();
                state.session.deliver_reply(text)
            };
            debug!(id = %reply.id, "agent reply delivered");
            events.publish(ShellEvent::ChatMessage(reply));
        });

        Some(accepted)
    }

    pub async fn set_draft(&self, content: String) {
        self.state.lock().await.session.set_draft(content);
    }

    pub async fn transcript(&self) -> (Vec<ChatMessage>, ChatPhase) {
        let state = self.state.lock().await;
        (state.session.messages().to_vec(), state.session.phase())
    }

    async fn dispatch(&self, method: &str, payload: BusPayload) -> BusResult {
        match (method, payload) {
            ("chat/submit", BusPayload::ChatSubmit { channel_id, content }) => {
                let accepted = self.submit(&channel_id, content).await;
                Ok(BusPayload::ChatTurn { accepted })
            }
            ("chat/draft", BusPayload::ChatSubmit { content, .. }) => {
                self.set_draft(content).await;
                Ok(BusPayload::Empty)
            }
            ("chat/transcript", BusPayload::Empty) => {
                let (messages, phase) = self.transcript().await;
                Ok(BusPayload::Transcript { messages, phase })
            }
            ("chat/submit" | "chat/draft" | "chat/transcript", _) => Err(BusError::unsupported_payload(method)),
            _ => Err(BusError::method_not_found(method)),
        }
    }
}

impl BusHandler for ChatSubsystem {
    fn prefix(&self) -> &str {
        "chat"
    }

    fn handle_request(&self, method: &str, payload: BusPayload, reply_tx: oneshot::Sender<BusResult>) {
        let this = self.clone();
        let method = method.to_string();
        tokio::spawn(async move {
            let result = this.dispatch(&method, payload).await;
            let _ = reply_tx.send(result);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::bus::{BusMessage, SupervisorBus};

    fn chat() -> (ChatSubsystem, SupervisorBus, Arc<EventHub>) {
        let bus = SupervisorBus::new(16);
        let events = Arc::new(EventHub::new());
        let chat = ChatSubsystem::new(
            bus.handle.clone(),
            events.clone(),
            CannedReplies::new(Some(11)),
            Duration::from_millis(1000),
        );
        (chat, bus, events)
    }

    #[tokio::test(start_paused = true)]
    async fn turn_appends_user_then_agent_after_delay() {
        let (chat, mut bus, events) = chat();
        let accepted = chat.submit("pty0", "I love beaches and wildlife".into()).await.unwrap();
        assert_eq!(accepted.sender, Sender::User);

        let (messages, phase) = chat.transcript().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(phase, ChatPhase::AwaitingReply);

        match bus.rx.try_recv() {
            Ok(BusMessage::Notification { method, payload }) => {
                assert_eq!(method, "planner/command");
                match payload {
                    BusPayload::Planner(PlannerCommand::PreferenceSubmitted { text }) => {
                        assert_eq!(text, "I love beaches and wildlife")
                    }
                    other => panic!("unexpected payload: {other:?}"),
                }
            }
            other => panic!("expected a notification, got {other:?}"),
        }
        assert!(bus.rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(chat.transcript().await.0.len(), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let (messages, phase) = chat.transcript().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].sender, Sender::Agent);
        assert!(AGENT_REPLIES.contains(&messages[2].text.as_str()));
        assert_eq!(phase, ChatPhase::Idle);
        assert_eq!(events.since(0).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_does_nothing() {
        let (chat, mut bus, events) = chat();
        assert!(chat.submit("pty0", "   ".into()).await.is_none());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(chat.transcript().await.0.len(), 1);
        assert!(bus.rx.try_recv().is_err());
        assert!(events.since(0).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn preference_reaches_planner_when_bus_is_full() {
        let mut bus = SupervisorBus::new(1);
        let events = Arc::new(EventHub::new());
        let chat = ChatSubsystem::new(
            bus.handle.clone(),
            events,
            CannedReplies::new(Some(3)),
            Duration::from_millis(1000),
        );
        bus.handle.send_notification("planner/command", BusPayload::Empty).await.unwrap();

        let turn = {
            let chat = chat.clone();
            tokio::spawn(async move { chat.submit("pty0", "I love beaches and wildlife".into()).await })
        };

        assert!(matches!(bus.rx.recv().await, Some(BusMessage::Notification { payload: BusPayload::Empty, .. })));
        match bus.rx.recv().await {
            Some(BusMessage::Notification { method, payload }) => {
                assert_eq!(method, "planner/command");
                assert!(matches!(
                    payload,
                    BusPayload::Planner(PlannerCommand::PreferenceSubmitted { ref text }) if text == "I love beaches and wildlife"
                ));
            }
            other => panic!("expected the forwarded preference, got {other:?}"),
        }
        assert!(turn.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn draft_marks_composing() {
        let (chat, _bus, _) = chat();
        let reply = chat
            .dispatch("chat/draft", BusPayload::ChatSubmit { channel_id: "http0".into(), content: "tea".into() })
            .await;
        assert!(matches!(reply, Ok(BusPayload::Empty)));
        assert_eq!(chat.transcript().await.1, ChatPhase::Composing);
    }

    #[tokio::test]
    async fn wrong_payload_is_invalid_params() {
        let (chat, _bus, _) = chat();
        let err = chat.dispatch("chat/submit", BusPayload::Empty).await.unwrap_err();
        assert_eq!(err.code, crate::supervisor::bus::ERR_INVALID_PARAMS);
    }
}
