//! Completion request building and streamed chunk parsing.
//!
//! The completion source is an OpenAI-compatible chat completions endpoint
//! called with `stream: true`. This module builds the request body and pulls
//! the text deltas out of the response's SSE lines; the HTTP transport itself
//! belongs to the caller.

use serde::{Deserialize, Serialize};
use tiktoken_rs::cl100k_base;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::{CompletionMessage, InboundMessage};

/// A streaming chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub stream: bool,
}

impl CompletionRequest {
    /// Start a request holding only the system prompt for `config`.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![CompletionMessage::system(config.system_prompt())],
            stream: true,
        }
    }

    /// Append client history, verbatim apart from role/content normalization.
    ///
    /// UI-only `activity` messages are skipped.
    pub fn with_history<'a, I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = &'a InboundMessage>,
    {
        let mut skipped = 0usize;
        for message in history {
            if message.is_activity() {
                skipped += 1;
                continue;
            }
            self.messages.push(CompletionMessage::from_inbound(message));
        }
        if skipped > 0 {
            tracing::debug!(skipped, "dropped activity messages from history");
        }
        self
    }

    /// Append one message.
    pub fn push(&mut self, message: CompletionMessage) -> &mut Self {
        self.messages.push(message);
        self
    }

    /// Messages in send order
    pub fn messages(&self) -> &[CompletionMessage] {
        &self.messages
    }

    /// The JSON body for the completions endpoint.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Conversation rendered as ChatML, the text the token estimate counts.
    pub fn to_chatml_string(&self) -> String {
        self.messages
            .iter()
            .map(|msg| format!("<|im_start|>{}\n{}\n<|im_end|>", msg.role, msg.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Estimate prompt tokens with the `cl100k_base` encoding.
    pub fn estimate_prompt_tokens(&self) -> Result<usize> {
        let bpe = cl100k_base().map_err(|e| Error::Tokenizer(e.to_string()))?;
        let tokens = bpe.encode_with_special_tokens(&self.to_chatml_string());
        Ok(tokens.len())
    }
}

/// What one SSE line of a completion stream carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkDelta {
    /// Text delta for the classifier
    Content(String),
    /// `data: [DONE]`
    Done,
}

/// Parse one SSE line of an OpenAI chat completion stream.
///
/// Returns `Ok(None)` for lines that carry no text: blank separators,
/// `:` comments, non-`data:` fields, role-only deltas and finish chunks.
pub fn parse_sse_line(line: &str) -> Result<Option<ChunkDelta>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return Ok(None);
    }

    let Some(data) = trimmed.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(Some(ChunkDelta::Done));
    }

    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| Error::MalformedChunk(format!("{e}: {data}")))?;
    Ok(chunk_content(&json).map(ChunkDelta::Content))
}

/// Extract `choices[0].delta.content` from a parsed chunk, if non-empty.
pub fn chunk_content(chunk: &serde_json::Value) -> Option<String> {
    chunk
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

/// Turn a stream of SSE lines into a stream of text deltas.
///
/// Ends at `data: [DONE]` or when `lines` ends. A malformed chunk or a
/// transport error ends the stream after being yielded.
#[cfg(feature = "streaming")]
pub fn content_deltas<S, E>(lines: S) -> impl futures_util::Stream<Item = std::result::Result<String, E>>
where
    S: futures_util::Stream<Item = std::result::Result<String, E>> + Unpin,
    E: From<Error>,
{
    use futures_util::stream::{self, StreamExt};

    stream::unfold(Some(lines), |lines| async move {
        let mut lines = lines?;
        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some((Err(err), None)),
            };
            match parse_sse_line(&line) {
                Ok(Some(ChunkDelta::Content(text))) => return Some((Ok(text), Some(lines))),
                Ok(Some(ChunkDelta::Done)) => return None,
                Ok(None) => continue,
                Err(err) => return Some((Err(E::from(err)), None)),
            }
        }
        None
    })
}

#[cfg(test)]
mod tests;
