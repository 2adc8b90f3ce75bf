//! Run context: maps lifecycle events onto AG-UI events for one run

use super::protocol::AgUiEvent;
use crate::streaming::LifecycleEvent;
use crate::MessageRole;
use serde::{Deserialize, Serialize};

/// Generate a prefixed, time-ordered unique ID
pub(crate) fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, ulid::Ulid::new().to_string().to_lowercase())
}

/// Identifiers for one run of the chat agent.
///
/// A run produces one reasoning block holding one reasoning message, and one
/// answer message. Every AG-UI event of the run carries one of these IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Conversation thread
    pub thread_id: String,
    /// This request/response cycle
    pub run_id: String,
    /// Reasoning block ID (THINKING_START / THINKING_END)
    pub reasoning_id: String,
    /// Reasoning text message ID
    pub reasoning_message_id: String,
    /// Answer text message ID
    pub message_id: String,
}

impl RunContext {
    /// Create a context with fresh IDs for a run in `thread_id`.
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: generate_id("run"),
            reasoning_id: generate_id("reasoning"),
            reasoning_message_id: generate_id("reasoning-msg"),
            message_id: generate_id("msg"),
        }
    }

    /// Create a context for a new thread
    pub fn new_thread() -> Self {
        Self::new(generate_id("thread"))
    }

    /// Set a specific run ID (supplied by the client)
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// The event that opens the run
    pub fn started(&self) -> AgUiEvent {
        AgUiEvent::RunStarted {
            thread_id: self.thread_id.clone(),
            run_id: self.run_id.clone(),
        }
    }

    /// The terminal event for a failed run
    pub fn error(&self, message: impl Into<String>) -> AgUiEvent {
        AgUiEvent::RunError {
            message: message.into(),
        }
    }

    /// Map one lifecycle event onto its AG-UI event.
    pub fn to_agui(&self, event: &LifecycleEvent) -> AgUiEvent {
        match event {
            LifecycleEvent::ReasoningStart => AgUiEvent::ThinkingStart {
                message_id: self.reasoning_id.clone(),
            },
            LifecycleEvent::ReasoningMessageStart => AgUiEvent::ThinkingTextMessageStart {
                message_id: self.reasoning_message_id.clone(),
                role: MessageRole::Assistant,
            },
            LifecycleEvent::ReasoningDelta(delta) => AgUiEvent::ThinkingTextMessageContent {
                message_id: self.reasoning_message_id.clone(),
                delta: delta.clone(),
            },
            LifecycleEvent::ReasoningMessageEnd => AgUiEvent::ThinkingTextMessageEnd {
                message_id: self.reasoning_message_id.clone(),
            },
            LifecycleEvent::ReasoningEnd => AgUiEvent::ThinkingEnd {
                message_id: self.reasoning_id.clone(),
            },
            LifecycleEvent::AnswerStart => AgUiEvent::TextMessageStart {
                message_id: self.message_id.clone(),
                role: MessageRole::Assistant,
            },
            LifecycleEvent::AnswerDelta(delta) => AgUiEvent::TextMessageContent {
                message_id: self.message_id.clone(),
                delta: delta.clone(),
            },
            LifecycleEvent::AnswerEnd => AgUiEvent::TextMessageEnd {
                message_id: self.message_id.clone(),
            },
            LifecycleEvent::ResponseComplete => AgUiEvent::RunFinished {
                thread_id: self.thread_id.clone(),
                run_id: self.run_id.clone(),
            },
        }
    }

    /// Map a complete lifecycle sequence, prefixed with RUN_STARTED.
    pub fn to_agui_run<'a, I>(&self, events: I) -> Vec<AgUiEvent>
    where
        I: IntoIterator<Item = &'a LifecycleEvent>,
    {
        std::iter::once(self.started())
            .chain(events.into_iter().map(|event| self.to_agui(event)))
            .collect()
    }
}
