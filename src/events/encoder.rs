//! Server-sent events framing for AG-UI events

use super::protocol::AgUiEvent;
use crate::error::Result;

/// Content type of an encoded event stream
pub const SSE_CONTENT_TYPE: &str = "text/event-stream";

/// Encodes AG-UI events as SSE frames.
///
/// Each event becomes a single `data:` line holding its JSON, followed by a
/// blank line. JSON never contains a raw newline, so one line per event is
/// always enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventEncoder;

impl EventEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Content type for the response carrying the frames
    pub fn content_type(&self) -> &'static str {
        SSE_CONTENT_TYPE
    }

    /// Encode one event as an SSE frame
    pub fn encode(&self, event: &AgUiEvent) -> Result<String> {
        let json = serde_json::to_string(event)?;
        Ok(format!("data: {}\n\n", json))
    }

    /// Encode a sequence of events into one body
    pub fn encode_all<'a, I>(&self, events: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a AgUiEvent>,
    {
        let mut body = String::new();
        for event in events {
            body.push_str(&self.encode(event)?);
        }
        Ok(body)
    }

    /// Parse one SSE frame back into an event
    pub fn decode(&self, frame: &str) -> Result<AgUiEvent> {
        let payload = frame.trim().strip_prefix("data:").unwrap_or(frame).trim();
        Ok(serde_json::from_str(payload)?)
    }
}
