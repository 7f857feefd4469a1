//! State of one debug conversation.

use serde::Serialize;

/// Lifecycle of the current send.
///
/// `Idle → Sending → Streaming* → Completed | Failed`. From `Completed` or
/// `Failed` a new send starts over at `Sending`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Sending,
    Streaming,
    Completed,
    Failed(String),
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Sending | SessionState::Streaming)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// How the dialog talks to the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DebugMode {
    /// Streamed SSE reply.
    #[default]
    Chat,
    /// Single request; a background task is polled unless the backend
    /// delivers the result to `notify_url`.
    Api { notify_url: Option<String> },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugSession {
    pub state: SessionState,
    pub messages: Vec<ChatMessage>,
    /// The background task of the current api-mode send, if any.
    pub task_id: Option<String>,
}

impl DebugSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assistant message the current send writes into.
    pub fn last_assistant_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|message| message.role == Role::Assistant)
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|message| message.role == Role::Assistant)
            .map(|message| message.content.as_str())
    }
}
