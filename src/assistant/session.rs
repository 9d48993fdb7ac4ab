//! One conversation's transcript.

use crate::llm::{Message, Role};
use uuid::Uuid;

/// A conversation with its running transcript.
///
/// The first message is always the system prompt. A session is driven by one
/// turn at a time; callers that share it across tasks must serialize access.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    transcript: Vec<Message>,
    max_messages: usize,
}

impl Session {
    /// Start a session with `system_prompt` and no cap.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: vec![Message::system(system_prompt)],
            max_messages: 0,
        }
    }

    /// Cap the transcript at `max_messages` (including the system prompt). Zero disables the cap.
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.len() <= 1
    }

    /// Drop everything but the system prompt.
    pub fn clear(&mut self) {
        self.transcript.truncate(1);
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Current length, to roll back to if a turn fails.
    pub(crate) fn checkpoint(&self) -> usize {
        self.transcript.len()
    }

    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.transcript.truncate(checkpoint.max(1));
    }

    /// Keep the system prompt plus the most recent messages that fit the cap.
    ///
    /// A function result is never left at the front without the user
    /// message that produced it. The most recent turn is always kept whole,
    /// even when it alone exceeds the cap.
    pub(crate) fn trim(&mut self) {
        if self.max_messages == 0 || self.transcript.len() <= self.max_messages {
            return;
        }
        let Some(last_user) = self.transcript.iter().rposition(|m| m.role == Role::User) else {
            return;
        };

        let keep = self.max_messages.saturating_sub(1);
        let mut start = self.transcript.len() - keep;
        while start < last_user && self.transcript[start].role != Role::User {
            start += 1;
        }
        self.transcript.drain(1..start.min(last_user).max(1));
    }
}
