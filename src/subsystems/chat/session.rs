//! Chat transcript and turn state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::replies::GREETING;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// `Sent` only exists at the instant of submission; afterwards the session
/// reports `AwaitingReply` until every pending reply has landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    Idle,
    Composing,
    Sent,
    AwaitingReply,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("chat input is empty")]
    InvalidInput,
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    draft: String,
    pending: usize,
}

impl ChatSession {
    /// New transcript holding the agent greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(GREETING, Sender::Agent)],
            draft: String::new(),
            pending: 0,
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn phase(&self) -> ChatPhase {
        if self.pending > 0 {
            ChatPhase::AwaitingReply
        } else if !self.draft.trim().is_empty() {
            ChatPhase::Composing
        } else {
            ChatPhase::Idle
        }
    }

    /// Append the user message and open a reply slot. The text is kept as
    /// typed; only the emptiness check trims.
    pub fn submit(&mut self, text: String) -> Result<ChatMessage, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::InvalidInput);
        }
        let message = ChatMessage::new(text, Sender::User);
        self.messages.push(message.clone());
        self.draft.clear();
        self.pending += 1;
        debug!(phase = ?ChatPhase::Sent, pending = self.pending, "chat message submitted");
        Ok(message)
    }

    /// Append an agent reply and close one reply slot.
    pub fn deliver_reply(&mut self, text: &str) -> ChatMessage {
        let message = ChatMessage::new(text, Sender::Agent);
        self.messages.push(message.clone());
        self.pending = self.pending.saturating_sub(1);
        message
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_greeting() {
        let s = ChatSession::new();
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].sender, Sender::Agent);
        assert_eq!(s.phase(), ChatPhase::Idle);
    }

    #[test]
    fn whitespace_is_rejected_without_side_effects() {
        let mut s = ChatSession::new();
        assert_eq!(s.submit("   \t".into()), Err(ChatError::InvalidInput));
        assert_eq!(s.submit(String::new()), Err(ChatError::InvalidInput));
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn phases_follow_the_turn() {
        let mut s = ChatSession::new();
        s.set_draft("beaches");
        assert_eq!(s.phase(), ChatPhase::Composing);

        let msg = s.submit("  beaches ".into()).unwrap();
        assert_eq!(msg.text, "  beaches ");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(s.phase(), ChatPhase::AwaitingReply);

        s.deliver_reply("ok");
        assert_eq!(s.phase(), ChatPhase::Idle);
        assert_eq!(s.messages().len(), 3);
    }

    #[test]
    fn overlapping_sends_wait_for_every_reply() {
        let mut s = ChatSession::new();
        s.submit("one".into()).unwrap();
        s.submit("two".into()).unwrap();
        s.deliver_reply("a");
        assert_eq!(s.phase(), ChatPhase::AwaitingReply);
        s.deliver_reply("b");
        assert_eq!(s.phase(), ChatPhase::Idle);
    }

    #[test]
    fn message_serialises_sender_lowercase() {
        let s = ChatSession::new();
        let json = serde_json::to_value(&s.messages()[0]).unwrap();
        assert_eq!(json["sender"], "agent");
        assert!(json["timestamp"].is_string());
    }
}
