use serde::{Deserialize, Serialize};

use crate::api::{Citation, HistoryMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// One transcript entry. `content` grows by appending while the message is
/// being streamed; `citations` is replaced wholesale whenever the stream
/// delivers a new list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            citations: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn has_citations(&self) -> bool {
        !self.citations.is_empty()
    }
}

/// The in-memory session transcript.
///
/// Append-only: streaming only ever overwrites the single assistant entry
/// created for the current answer, never inserts or removes earlier ones.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Overwrite the assistant entry currently being streamed with a fresh
    /// snapshot. The caller must have pushed that entry already.
    pub fn update_streaming(&mut self, snapshot: Message) {
        debug_assert!(snapshot.role.is_assistant());
        match self.messages.last_mut() {
            Some(last) if last.role.is_assistant() => *last = snapshot,
            _ => self.messages.push(snapshot),
        }
    }

    /// The `{role, content}` turns sent along with the next question.
    ///
    /// Call this before pushing the new user message: the question travels
    /// in the request's `query` field, not in `history`.
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .map(|m| HistoryMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }
}
