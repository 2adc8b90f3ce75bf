//! Accumulates a classified response for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::generate_id;
use crate::streaming::LifecycleEvent;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A finished chat message as shown in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Reasoning shown collapsed above the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: generate_id("msg"),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            thinking: None,
        }
    }

    /// Create a bot message; empty reasoning is omitted
    pub fn bot(text: impl Into<String>, thinking: impl Into<String>) -> Self {
        let thinking = thinking.into();
        Self {
            id: generate_id("msg"),
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            thinking: (!thinking.is_empty()).then_some(thinking),
        }
    }

    /// The generic message shown when a run fails
    pub fn failure(reason: impl std::fmt::Display) -> Self {
        Self::bot(format!("Sorry, I encountered an error: {}", reason), "")
    }
}

/// Lifecycle events arrived in an order the response grammar forbids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("event {event} cannot follow {after}")]
    OutOfOrder {
        event: &'static str,
        after: &'static str,
    },

    #[error("response incomplete, last event was {last}")]
    Incomplete { last: &'static str },
}

/// Builds the reasoning and answer text of one response from its events.
///
/// The renderer checks each event against the response grammar, so a
/// channel opened twice or content outside its channel is reported rather
/// than silently displayed.
#[derive(Debug, Clone, Default)]
pub struct EventRenderer {
    reasoning: String,
    answer: String,
    last: Option<LifecycleEvent>,
}

impl EventRenderer {
    /// Create an empty renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: &LifecycleEvent) -> Result<(), RenderError> {
        if !Self::may_follow(self.last.as_ref(), event) {
            return Err(RenderError::OutOfOrder {
                event: event.name(),
                after: self.last.as_ref().map_or("nothing", LifecycleEvent::name),
            });
        }

        match event {
            LifecycleEvent::ReasoningDelta(delta) => self.reasoning.push_str(delta),
            LifecycleEvent::AnswerDelta(delta) => self.answer.push_str(delta),
            _ => {}
        }
        self.last = Some(event.clone());
        Ok(())
    }

    fn may_follow(last: Option<&LifecycleEvent>, next: &LifecycleEvent) -> bool {
        const DELTA_RANKS: [u8; 2] = [2, 6];
        let next = next.phase_rank();
        match last.map(LifecycleEvent::phase_rank) {
            None => next == 0,
            Some(8) => false,
            Some(rank) => {
                next == rank + 1
                    || (next == rank && DELTA_RANKS.contains(&rank))
                    || (next == rank + 2 && DELTA_RANKS.contains(&(rank + 1)))
            }
        }
    }

    /// Reasoning received so far
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Answer received so far
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Whether reasoning text is currently streaming in
    pub fn is_reasoning_open(&self) -> bool {
        matches!(
            self.last,
            Some(LifecycleEvent::ReasoningMessageStart | LifecycleEvent::ReasoningDelta(_))
        )
    }

    /// Whether `ResponseComplete` has been applied
    pub fn is_complete(&self) -> bool {
        self.last == Some(LifecycleEvent::ResponseComplete)
    }

    /// Turn a complete response into a bot message.
    pub fn finish(self) -> Result<ChatMessage, RenderError> {
        if !self.is_complete() {
            return Err(RenderError::Incomplete {
                last: self.last.as_ref().map_or("nothing", LifecycleEvent::name),
            });
        }
        Ok(ChatMessage::bot(self.answer, self.reasoning))
    }

    /// Discard partial state after an upstream failure and return the
    /// message to display instead.
    pub fn fail(&mut self, reason: impl std::fmt::Display) -> ChatMessage {
        tracing::debug!(
            reasoning = self.reasoning.len(),
            answer = self.answer.len(),
            "discarding partial response"
        );
        *self = Self::default();
        ChatMessage::failure(reason)
    }
}

/// Failure while rendering a response stream
#[derive(Debug, Error)]
pub enum RenderFailure<E> {
    #[error("completion source failed: {0}")]
    Upstream(E),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Drive a renderer over a lifecycle event stream to the finished message.
#[cfg(feature = "streaming")]
pub async fn render_stream<S, E>(mut events: S) -> Result<ChatMessage, RenderFailure<E>>
where
    S: futures_util::Stream<Item = Result<LifecycleEvent, E>> + Unpin,
{
    use futures_util::StreamExt;

    let mut renderer = EventRenderer::new();
    while let Some(event) = events.next().await {
        let event = event.map_err(RenderFailure::Upstream)?;
        renderer.apply(&event)?;
        if renderer.is_complete() {
            break;
        }
    }
    Ok(renderer.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::classify;
    use crate::MarkerConfig;
    use LifecycleEvent::*;

    fn rendered(deltas: &[&str]) -> EventRenderer {
        let mut renderer = EventRenderer::new();
        for event in classify(MarkerConfig::default(), deltas.iter().copied()) {
            renderer.apply(&event).unwrap();
        }
        renderer
    }

    #[test]
    fn test_accumulates_both_channels() {
        let renderer = rendered(&["Reasoning: a", "b c", "\nAnswer: d", "e"]);

        assert_eq!(renderer.reasoning(), "ab c");
        assert_eq!(renderer.answer(), "de");
        assert!(renderer.is_complete());
    }

    #[test]
    fn test_finish_builds_bot_message() {
        let message = rendered(&["Reasoning: think", " Answer: 42"]).finish().unwrap();

        assert_eq!(message.sender, Sender::Bot);
        assert_eq!(message.text, "42");
        assert_eq!(message.thinking.as_deref(), Some("think"));
        assert!(message.id.starts_with("msg-"));
    }

    #[test]
    fn test_empty_reasoning_omitted_from_message() {
        let message = rendered(&["Answer: done"]).finish().unwrap();

        assert_eq!(message.text, "done");
        assert!(message.thinking.is_none());
        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("thinking").is_none());
        assert_eq!(json["sender"], "bot");
    }

    #[test]
    fn test_reasoning_open_tracking() {
        let mut renderer = EventRenderer::new();
        renderer.apply(&ReasoningStart).unwrap();
        assert!(!renderer.is_reasoning_open());
        renderer.apply(&ReasoningMessageStart).unwrap();
        assert!(renderer.is_reasoning_open());
        renderer.apply(&ReasoningDelta("x".to_string())).unwrap();
        assert!(renderer.is_reasoning_open());
        renderer.apply(&ReasoningMessageEnd).unwrap();
        assert!(!renderer.is_reasoning_open());
    }

    #[test]
    fn test_rejects_content_before_channel_opens() {
        let mut renderer = EventRenderer::new();
        let err = renderer.apply(&AnswerDelta("early".to_string())).unwrap_err();

        assert_eq!(
            err,
            RenderError::OutOfOrder {
                event: "answer_delta",
                after: "nothing",
            }
        );
        assert_eq!(renderer.answer(), "");
    }

    #[test]
    fn test_rejects_channel_opened_twice() {
        let mut renderer = EventRenderer::new();
        renderer.apply(&ReasoningStart).unwrap();
        renderer.apply(&ReasoningMessageStart).unwrap();

        assert!(renderer.apply(&ReasoningMessageStart).is_err());
        assert!(renderer.apply(&ReasoningStart).is_err());
    }

    #[test]
    fn test_rejects_events_after_completion() {
        let mut renderer = rendered(&["Answer: x"]);

        assert!(renderer.apply(&AnswerDelta("late".to_string())).is_err());
        assert!(renderer.apply(&ResponseComplete).is_err());
    }

    #[test]
    fn test_answer_may_follow_reasoning_without_deltas() {
        let mut renderer = EventRenderer::new();
        for event in [
            ReasoningStart,
            ReasoningMessageStart,
            ReasoningMessageEnd,
            ReasoningEnd,
            AnswerStart,
            AnswerEnd,
            ResponseComplete,
        ] {
            renderer.apply(&event).unwrap();
        }
        assert!(renderer.is_complete());
    }

    #[test]
    fn test_finish_before_completion_is_an_error() {
        let mut renderer = EventRenderer::new();
        renderer.apply(&ReasoningStart).unwrap();

        assert_eq!(
            renderer.finish().unwrap_err(),
            RenderError::Incomplete {
                last: "reasoning_start"
            }
        );
    }

    #[test]
    fn test_fail_discards_partial_state() {
        let mut renderer = EventRenderer::new();
        renderer.apply(&ReasoningStart).unwrap();
        renderer.apply(&ReasoningMessageStart).unwrap();
        renderer.apply(&ReasoningDelta("half a thought".to_string())).unwrap();

        let message = renderer.fail("connection reset");

        assert_eq!(message.text, "Sorry, I encountered an error: connection reset");
        assert!(message.thinking.is_none());
        assert_eq!(renderer.reasoning(), "");
        assert!(!renderer.is_complete());
        renderer.apply(&ReasoningStart).unwrap();
    }

    #[test]
    fn test_user_message() {
        let message = ChatMessage::user("hello");
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.text, "hello");
    }

    #[cfg(feature = "streaming")]
    mod async_stream {
        use super::*;
        use crate::streaming::classify_stream;
        use futures_util::stream;

        #[tokio::test]
        async fn test_render_stream_to_message() {
            let source = stream::iter(
                ["Reasoning: because.", " Answer: ", "yes"]
                    .into_iter()
                    .map(|d| Ok::<_, String>(d.to_string())),
            );
            let events = classify_stream(source, MarkerConfig::default());
            futures_util::pin_mut!(events);

            let message = render_stream(events).await.unwrap();
            assert_eq!(message.text, "yes");
            assert_eq!(message.thinking.as_deref(), Some("because."));
        }

        #[tokio::test]
        async fn test_render_stream_surfaces_upstream_error() {
            let source = stream::iter(vec![
                Ok("Reasoning: hm".to_string()),
                Err("timeout".to_string()),
            ]);
            let events = classify_stream(source, MarkerConfig::default());
            futures_util::pin_mut!(events);

            match render_stream(events).await {
                Err(RenderFailure::Upstream(reason)) => assert_eq!(reason, "timeout"),
                other => panic!("expected upstream failure, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_render_stream_reports_grammar_violation() {
            let events = stream::iter(vec![Ok::<_, String>(AnswerStart)]);

            assert!(matches!(
                render_stream(events).await,
                Err(RenderFailure::Render(RenderError::OutOfOrder { .. }))
            ));
        }
    }
}
