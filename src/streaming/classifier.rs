//! Incremental reasoning/answer classifier.

use super::types::{LifecycleEvent, ParserState};
use crate::config::MarkerConfig;

/// Splits a stream of text deltas into a reasoning channel and an answer
/// channel.
///
/// The classifier keeps every not-yet-attributed byte in a lookahead buffer
/// and searches the cumulative buffer, so markers split across any number of
/// deltas are still found. Text that could be the start of the answer marker
/// is never released early, and whitespace around each channel is trimmed.
///
/// One instance serves one response: feed deltas with [`push`](Self::push)
/// and end with [`finish`](Self::finish), which consumes the classifier.
#[derive(Debug, Clone)]
pub struct StreamClassifier {
    markers: MarkerConfig,
    state: ParserState,
    buffer: String,
    opened: bool,
    channel_has_content: bool,
}

impl Default for StreamClassifier {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

impl StreamClassifier {
    /// Create a classifier for one response.
    pub fn new(markers: MarkerConfig) -> Self {
        Self {
            markers,
            state: ParserState::AwaitingReasoning,
            buffer: String::new(),
            opened: false,
            channel_has_content: false,
        }
    }

    /// Current parser state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Text received but not yet attributed to a channel
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Markers this classifier splits on
    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    /// Feed one delta and return the events it produces.
    pub fn push(&mut self, delta: &str) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        self.open(&mut events);
        if delta.is_empty() {
            return events;
        }

        tracing::trace!(
            state = ?self.state,
            delta_len = delta.len(),
            buffered = self.buffer.len(),
            "classifying delta"
        );

        self.buffer.push_str(delta);
        match self.state {
            ParserState::AwaitingReasoning => self.scan_awaiting(&mut events),
            ParserState::InReasoning => self.scan_reasoning(&mut events),
            ParserState::InAnswer => self.flush_safe(&mut events),
        }
        events
    }

    /// Close the response.
    ///
    /// If the answer marker never appeared, whatever is still buffered is
    /// flushed as reasoning and an empty answer channel is opened so both
    /// channels are always opened and closed exactly once.
    ///
    /// When the reasoning prefix never appeared either, the chatter was
    /// already discarded and only the tail that could have started a marker
    /// is left, so `"The answer is A"` yields the reasoning text `"A"`.
    pub fn finish(mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        self.open(&mut events);

        if self.state != ParserState::InAnswer {
            tracing::warn!(
                state = ?self.state,
                buffered = self.buffer.len(),
                "stream ended without answer marker, closing with empty answer"
            );
            let fragment = if self.channel_has_content {
                self.buffer.trim_end()
            } else {
                self.buffer.trim()
            };
            if !fragment.is_empty() {
                events.push(LifecycleEvent::ReasoningDelta(fragment.to_string()));
            }
            events.push(LifecycleEvent::ReasoningMessageEnd);
            events.push(LifecycleEvent::ReasoningEnd);
            events.push(LifecycleEvent::AnswerStart);
        }

        // Held-back trailing whitespace of the answer is dropped here.
        events.push(LifecycleEvent::AnswerEnd);
        events.push(LifecycleEvent::ResponseComplete);
        events
    }

    fn open(&mut self, events: &mut Vec<LifecycleEvent>) {
        if !self.opened {
            self.opened = true;
            events.push(LifecycleEvent::ReasoningStart);
            events.push(LifecycleEvent::ReasoningMessageStart);
        }
    }

    fn scan_awaiting(&mut self, events: &mut Vec<LifecycleEvent>) {
        if let Some(marker_at) = self.buffer.find(&self.markers.answer_marker) {
            // The whole reasoning segment arrived before the prefix was
            // dispatched on its own.
            let before = &self.buffer[..marker_at];
            let reasoning = before
                .find(&self.markers.reasoning_prefix)
                .map(|at| before[at + self.markers.reasoning_prefix.len()..].trim().to_string());
            if let Some(text) = reasoning.filter(|text| !text.is_empty()) {
                events.push(LifecycleEvent::ReasoningDelta(text));
            }
            self.enter_answer(marker_at, events);
            return;
        }

        if let Some(prefix_at) = self.buffer.find(&self.markers.reasoning_prefix) {
            tracing::debug!(discarded = prefix_at, "reasoning prefix found");
            let consumed = prefix_at + self.markers.reasoning_prefix.len();
            self.buffer.drain(..consumed);
            self.state = ParserState::InReasoning;
            self.channel_has_content = false;
            self.flush_safe(events);
            return;
        }

        // Chatter before the prefix is dropped; only a tail that may still
        // grow into a marker is kept.
        let keep_from = [&self.markers.reasoning_prefix, &self.markers.answer_marker]
            .iter()
            .filter_map(|marker| partial_marker_start(&self.buffer, marker))
            .min()
            .unwrap_or(self.buffer.len());
        if keep_from > 0 {
            tracing::trace!(discarded = keep_from, "dropping text before reasoning prefix");
            self.buffer.drain(..keep_from);
        }
    }

    fn scan_reasoning(&mut self, events: &mut Vec<LifecycleEvent>) {
        let Some(marker_at) = self.buffer.find(&self.markers.answer_marker) else {
            self.flush_safe(events);
            return;
        };

        let before = self.buffer[..marker_at].trim_end();
        let before = if self.channel_has_content {
            before
        } else {
            before.trim_start()
        };
        if !before.is_empty() {
            events.push(LifecycleEvent::ReasoningDelta(before.to_string()));
        }
        self.enter_answer(marker_at, events);
    }

    fn enter_answer(&mut self, marker_at: usize, events: &mut Vec<LifecycleEvent>) {
        tracing::debug!(from = ?self.state, "answer marker found");
        let after = self
            .buffer
            .split_off(marker_at + self.markers.answer_marker.len());

        events.push(LifecycleEvent::ReasoningMessageEnd);
        events.push(LifecycleEvent::ReasoningEnd);
        events.push(LifecycleEvent::AnswerStart);

        self.state = ParserState::InAnswer;
        self.channel_has_content = false;
        self.buffer = after;
        self.flush_safe(events);
    }

    /// Emit the part of the buffer that can no longer change channel or
    /// become surrounding whitespace.
    fn flush_safe(&mut self, events: &mut Vec<LifecycleEvent>) {
        let mut limit = match self.state {
            ParserState::InReasoning => {
                partial_marker_start(&self.buffer, &self.markers.answer_marker)
                    .unwrap_or(self.buffer.len())
            }
            _ => self.buffer.len(),
        };

        // Leading whitespace may belong to a held-back marker such as
        // "\nAnswer:", so only what lies before the holdback is dropped.
        if !self.channel_has_content {
            let leading = self.buffer.len() - self.buffer.trim_start().len();
            let dropped = leading.min(limit);
            self.buffer.drain(..dropped);
            limit -= dropped;
        }

        let cut = self.buffer[..limit].trim_end().len();
        if cut == 0 {
            return;
        }

        let text: String = self.buffer.drain(..cut).collect();
        self.channel_has_content = true;
        events.push(match self.state {
            ParserState::InAnswer => LifecycleEvent::AnswerDelta(text),
            _ => LifecycleEvent::ReasoningDelta(text),
        });
    }
}

/// Start of the longest suffix of `text` that is a proper prefix of `marker`.
fn partial_marker_start(text: &str, marker: &str) -> Option<usize> {
    let floor = text.len().saturating_sub(marker.len().saturating_sub(1));
    (floor..text.len())
        .filter(|&at| text.is_char_boundary(at))
        .find(|&at| marker.starts_with(&text[at..]))
}

/// Classify a complete sequence of deltas in one call.
pub fn classify<I>(markers: MarkerConfig, deltas: I) -> Vec<LifecycleEvent>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut classifier = StreamClassifier::new(markers);
    let mut events = Vec::new();
    for delta in deltas {
        events.extend(classifier.push(delta.as_ref()));
    }
    events.extend(classifier.finish());
    events
}
