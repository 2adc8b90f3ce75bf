//! reasonsplit
//!
//! Splits a streamed LLM chat completion into a *reasoning* channel and an
//! *answer* channel so a chat UI can show the model's thinking separately
//! from its final answer.
//!
//! The model is instructed (see [`ChatConfig::system_prompt`]) to answer as
//!
//! ```text
//! Reasoning: <step-by-step thinking>
//!
//! Answer: <final answer>
//! ```
//!
//! and [`StreamClassifier`] turns the raw deltas into [`LifecycleEvent`]s:
//!
//! ```rust
//! use reasonsplit::{classify, LifecycleEvent, MarkerConfig};
//!
//! let events = classify(MarkerConfig::default(), ["Reason", "ing: step one. ", "Answer: ", "42"]);
//! assert!(events.contains(&LifecycleEvent::ReasoningDelta("step one.".to_string())));
//! assert!(events.contains(&LifecycleEvent::AnswerDelta("42".to_string())));
//! ```
//!
//! ## Modules
//!
//! 1. [`streaming`]: the incremental classifier and its async adapter
//! 2. [`completion`]: request building and OpenAI chunk parsing
//! 3. [`events`]: AG-UI protocol events and SSE encoding
//! 4. [`render`]: accumulation of both channels into a chat message
//!
//! Inbound chat messages are normalized to the completion API's role/content
//! shape by [`CompletionMessage::from_inbound`].

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub use config::{ChatConfig, MarkerConfig};
pub use error::{Error, Result};

// ============================================================================
// Classification
// ============================================================================

pub mod streaming;
pub use streaming::{classify, LifecycleEvent, ParserState, StreamClassifier};
#[cfg(feature = "streaming")]
pub use streaming::classify_stream;

pub mod completion;
pub use completion::{ChunkDelta, CompletionRequest};

pub mod events;
pub use events::{AgUiEvent, EventEncoder, RunContext};

pub mod render;
pub use render::{ChatMessage, EventRenderer, RenderError, RenderFailure, Sender};
#[cfg(feature = "streaming")]
pub use render::render_stream;

// ============================================================================
// Message Types
// ============================================================================

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System-level instructions
    System,
    /// User input
    User,
    /// Assistant response
    Assistant,
    /// Tool execution result
    Tool,
}

impl MessageRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }

    /// Map a client-supplied role onto a completion role.
    ///
    /// `developer` is an alias for `system`; anything unrecognized is `user`.
    pub fn parse_lenient(role: &str) -> Self {
        match role {
            "system" | "developer" => Self::System,
            "assistant" => Self::Assistant,
            "tool" => Self::Tool,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat message as sent by the client.
///
/// Field names follow the AG-UI client (`toolCallId`). Every field is
/// optional; missing values fall back to defaults during conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Client message ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw role string (`user`, `developer`, `activity`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Message content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<InboundContent>,
    /// Tool invocation this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl InboundMessage {
    /// Create a message with a role and plain text
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(InboundContent::Text(text.into())),
            ..Self::default()
        }
    }

    /// Set the tool call ID
    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Whether this message only exists for the UI and is never sent upstream
    pub fn is_activity(&self) -> bool {
        self.role.as_deref() == Some("activity")
    }
}

/// Content of an inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundContent {
    /// Plain text
    Text(String),
    /// Ordered text or typed segments
    Segments(Vec<ContentSegment>),
    /// Any other JSON value
    Structured(serde_json::Value),
}

impl InboundContent {
    /// Flatten to the single string the completion API expects.
    ///
    /// Segments are joined with newlines; structured values are serialized
    /// to compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Segments(segments) => segments
                .iter()
                .map(ContentSegment::text)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Structured(value) => value.to_string(),
        }
    }
}

/// One element of segmented content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentSegment {
    /// Bare string
    Text(String),
    /// Object segment such as `{"type": "text", "text": "..."}`
    Typed {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Anything else; contributes no text
    Other(serde_json::Value),
}

impl ContentSegment {
    /// Create a text segment
    pub fn text_block(text: impl Into<String>) -> Self {
        Self::Typed {
            kind: Some("text".to_string()),
            text: Some(text.into()),
        }
    }

    /// Text this segment contributes to the flattened content
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Typed { text, .. } => text.as_deref().unwrap_or(""),
            Self::Other(_) => "",
        }
    }
}

/// A message in the completion API's role/content shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: MessageRole,
    pub content: String,
    /// Only set on tool messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl CompletionMessage {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
            tool_call_id: None,
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
            tool_call_id: None,
        }
    }

    /// Normalize a client message. Never fails; missing parts get defaults.
    pub fn from_inbound(message: &InboundMessage) -> Self {
        let role = message
            .role
            .as_deref()
            .map(MessageRole::parse_lenient)
            .unwrap_or(MessageRole::User);
        let content = message
            .content
            .as_ref()
            .map(InboundContent::to_text)
            .unwrap_or_default();
        let tool_call_id = match role {
            MessageRole::Tool => message.tool_call_id.clone(),
            _ => None,
        };

        Self {
            role,
            content,
            tool_call_id,
        }
    }
}

impl From<&InboundMessage> for CompletionMessage {
    fn from(message: &InboundMessage) -> Self {
        Self::from_inbound(message)
    }
}

// ============================================================================
// Tests
// ============================================================================
