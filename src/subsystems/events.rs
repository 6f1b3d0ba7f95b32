//! Shell event hub — typed events from subsystems to comms channels.
//!
//! Live subscribers get events over a `broadcast` channel; a short ring of
//! recent events is kept with sequence numbers so polling channels (HTTP)
//! can ask for "everything after N".

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::subsystems::chat::ChatMessage;
use crate::subsystems::planner::store::ItinerarySnapshot;

const RECENT_CAPACITY: usize = 256;
const BROADCAST_CAPACITY: usize = 64;

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// A fire-and-forget toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: ToastVariant,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ShellEvent {
    ChatMessage(ChatMessage),
    ItineraryUpdated(Box<ItinerarySnapshot>),
    Notification(Notification),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: ShellEvent,
}

// ── Hub ───────────────────────────────────────────────────────────────────────

struct Recent {
    next_seq: u64,
    events: VecDeque<SequencedEvent>,
}

pub struct EventHub {
    tx: broadcast::Sender<SequencedEvent>,
    recent: Mutex<Recent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            recent: Mutex::new(Recent { next_seq: 1, events: VecDeque::with_capacity(RECENT_CAPACITY) }),
        }
    }

    /// Publish `event` and return its sequence number (starting at 1).
    pub fn publish(&self, event: ShellEvent) -> u64 {
        let sequenced = {
            let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
            let seq = recent.next_seq;
            recent.next_seq += 1;
            let sequenced = SequencedEvent { seq, event };
            if recent.events.len() == RECENT_CAPACITY {
                recent.events.pop_front();
            }
            recent.events.push_back(sequenced.clone());
            sequenced
        };
        let seq = sequenced.seq;
        // No live subscribers is fine; pollers still see it in `since`.
        let receivers = self.tx.send(sequenced).unwrap_or(0);
        trace!(seq, receivers, "shell event published");
        seq
    }

    pub fn notify(&self, title: &str, description: &str) -> u64 {
        self.publish(ShellEvent::Notification(Notification::new(title, description)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.tx.subscribe()
    }

    /// Retained events with `seq > after`, oldest first.
    pub fn since(&self, after: u64) -> Vec<SequencedEvent> {
        let recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.events.iter().filter(|e| e.seq > after).cloned().collect()
    }

    /// Sequence number of the most recent event, 0 if none.
    pub fn last_seq(&self) -> u64 {
        let recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        recent.next_seq - 1
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_start_at_one() {
        let hub = EventHub::new();
        assert_eq!(hub.last_seq(), 0);
        assert_eq!(hub.notify("a", "b"), 1);
        assert_eq!(hub.notify("c", "d"), 2);
        assert_eq!(hub.last_seq(), 2);
    }

    #[test]
    fn since_filters_and_keeps_order() {
        let hub = EventHub::new();
        for i in 0..5 {
            hub.notify(&format!("t{i}"), "");
        }
        let seqs: Vec<u64> = hub.since(3).iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![4, 5]);
        assert!(hub.since(5).is_empty());
    }

    #[test]
    fn ring_drops_oldest() {
        let hub = EventHub::new();
        for _ in 0..(RECENT_CAPACITY + 10) {
            hub.notify("x", "y");
        }
        let all = hub.since(0);
        assert_eq!(all.len(), RECENT_CAPACITY);
        assert_eq!(all[0].seq, 11);
    }

    #[tokio::test]
    async fn subscribers_receive_live_events() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();
        hub.notify("Itinerary Regenerated", "Your Sri Lanka adventure has been refreshed!");
        let got = rx.recv().await.unwrap();
        match got.event {
            ShellEvent::Notification(n) => {
                assert_eq!(n.title, "Itinerary Regenerated");
                assert_eq!(n.variant, ToastVariant::Default);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn event_serialises_with_type_tag() {
        let json = serde_json::to_value(ShellEvent::Notification(Notification::new("a", "b"))).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["data"]["variant"], "default");
    }
}
