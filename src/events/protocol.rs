//! AG-UI wire events

use super::traits::EventType;
use crate::MessageRole;
use serde::{Deserialize, Serialize};

/// One AG-UI protocol event.
///
/// Serializes as a JSON object whose `type` field is the SCREAMING_SNAKE_CASE
/// event name and whose other fields are camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgUiEvent {
    #[serde(rename_all = "camelCase")]
    RunStarted { thread_id: String, run_id: String },

    #[serde(rename_all = "camelCase")]
    ThinkingStart { message_id: String },

    #[serde(rename_all = "camelCase")]
    ThinkingTextMessageStart { message_id: String, role: MessageRole },

    #[serde(rename_all = "camelCase")]
    ThinkingTextMessageContent { message_id: String, delta: String },

    #[serde(rename_all = "camelCase")]
    ThinkingTextMessageEnd { message_id: String },

    #[serde(rename_all = "camelCase")]
    ThinkingEnd { message_id: String },

    #[serde(rename_all = "camelCase")]
    TextMessageStart { message_id: String, role: MessageRole },

    #[serde(rename_all = "camelCase")]
    TextMessageContent { message_id: String, delta: String },

    #[serde(rename_all = "camelCase")]
    TextMessageEnd { message_id: String },

    #[serde(rename_all = "camelCase")]
    RunFinished { thread_id: String, run_id: String },

    /// Upstream failure; nothing follows
    RunError { message: String },
}

impl AgUiEvent {
    /// Get the event type
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RunStarted { .. } => EventType::RunStarted,
            Self::ThinkingStart { .. } => EventType::ThinkingStart,
            Self::ThinkingTextMessageStart { .. } => EventType::ThinkingTextMessageStart,
            Self::ThinkingTextMessageContent { .. } => EventType::ThinkingTextMessageContent,
            Self::ThinkingTextMessageEnd { .. } => EventType::ThinkingTextMessageEnd,
            Self::ThinkingEnd { .. } => EventType::ThinkingEnd,
            Self::TextMessageStart { .. } => EventType::TextMessageStart,
            Self::TextMessageContent { .. } => EventType::TextMessageContent,
            Self::TextMessageEnd { .. } => EventType::TextMessageEnd,
            Self::RunFinished { .. } => EventType::RunFinished,
            Self::RunError { .. } => EventType::RunError,
        }
    }

    /// Get the message ID, for events scoped to a message
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::ThinkingStart { message_id }
            | Self::ThinkingTextMessageStart { message_id, .. }
            | Self::ThinkingTextMessageContent { message_id, .. }
            | Self::ThinkingTextMessageEnd { message_id }
            | Self::ThinkingEnd { message_id }
            | Self::TextMessageStart { message_id, .. }
            | Self::TextMessageContent { message_id, .. }
            | Self::TextMessageEnd { message_id } => Some(message_id),
            Self::RunStarted { .. } | Self::RunFinished { .. } | Self::RunError { .. } => None,
        }
    }

    /// Serialize to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
