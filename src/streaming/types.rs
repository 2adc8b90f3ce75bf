//! Type definitions for classified response streams.

use serde::{Deserialize, Serialize};

/// Where the classifier is within one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserState {
    /// The reasoning prefix has not been seen yet
    AwaitingReasoning,
    /// Text is attributed to the reasoning channel
    InReasoning,
    /// Text is attributed to the answer channel
    InAnswer,
}

/// Lifecycle event emitted by the stream classifier.
///
/// Every response produces exactly one sequence of the shape
///
/// ```text
/// ReasoningStart, ReasoningMessageStart, ReasoningDelta*, ReasoningMessageEnd,
/// ReasoningEnd, AnswerStart, AnswerDelta*, AnswerEnd, ResponseComplete
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "delta", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Reasoning block begins
    ReasoningStart,
    /// Reasoning text channel opens
    ReasoningMessageStart,
    /// Reasoning content
    ReasoningDelta(String),
    /// Reasoning text channel closes
    ReasoningMessageEnd,
    /// Reasoning block ends
    ReasoningEnd,
    /// Answer channel opens
    AnswerStart,
    /// Answer content
    AnswerDelta(String),
    /// Answer channel closes
    AnswerEnd,
    /// Nothing follows
    ResponseComplete,
}

impl LifecycleEvent {
    /// Position of this event kind in the fixed response grammar.
    ///
    /// Ranks never decrease along a valid sequence; delta events are the only
    /// kinds allowed to repeat.
    pub fn phase_rank(&self) -> u8 {
        match self {
            Self::ReasoningStart => 0,
            Self::ReasoningMessageStart => 1,
            Self::ReasoningDelta(_) => 2,
            Self::ReasoningMessageEnd => 3,
            Self::ReasoningEnd => 4,
            Self::AnswerStart => 5,
            Self::AnswerDelta(_) => 6,
            Self::AnswerEnd => 7,
            Self::ResponseComplete => 8,
        }
    }

    /// Whether this event carries channel content.
    pub fn is_delta(&self) -> bool {
        matches!(self, Self::ReasoningDelta(_) | Self::AnswerDelta(_))
    }

    /// Short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReasoningStart => "reasoning_start",
            Self::ReasoningMessageStart => "reasoning_message_start",
            Self::ReasoningDelta(_) => "reasoning_delta",
            Self::ReasoningMessageEnd => "reasoning_message_end",
            Self::ReasoningEnd => "reasoning_end",
            Self::AnswerStart => "answer_start",
            Self::AnswerDelta(_) => "answer_delta",
            Self::AnswerEnd => "answer_end",
            Self::ResponseComplete => "response_complete",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
