//! Event type discriminator

use serde::{Deserialize, Serialize};

/// AG-UI event type, as carried in the `type` field on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RunStarted,
    ThinkingStart,
    ThinkingTextMessageStart,
    ThinkingTextMessageContent,
    ThinkingTextMessageEnd,
    ThinkingEnd,
    TextMessageStart,
    TextMessageContent,
    TextMessageEnd,
    RunFinished,
    RunError,
}

impl EventType {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::RunStarted => "RUN_STARTED",
            Self::ThinkingStart => "THINKING_START",
            Self::ThinkingTextMessageStart => "THINKING_TEXT_MESSAGE_START",
            Self::ThinkingTextMessageContent => "THINKING_TEXT_MESSAGE_CONTENT",
            Self::ThinkingTextMessageEnd => "THINKING_TEXT_MESSAGE_END",
            Self::ThinkingEnd => "THINKING_END",
            Self::TextMessageStart => "TEXT_MESSAGE_START",
            Self::TextMessageContent => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd => "TEXT_MESSAGE_END",
            Self::RunFinished => "RUN_FINISHED",
            Self::RunError => "RUN_ERROR",
        }
    }

    /// Whether no further events follow this one in a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunFinished | Self::RunError)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
