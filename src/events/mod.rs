//! AG-UI event protocol for classified responses
//!
//! This module maps the classifier's [`LifecycleEvent`]s onto AG-UI protocol
//! events and frames them as server-sent events for a browser client.
//!
//! ## Event Types
//!
//! - [`AgUiEvent`]: one protocol event (`RUN_STARTED`, `THINKING_*`, `TEXT_MESSAGE_*`, ...)
//! - [`RunContext`]: the thread, run and message IDs of one run
//! - [`EventEncoder`]: SSE framing
//!
//! ## Usage
//!
//! ```rust
//! use reasonsplit::events::{EventEncoder, RunContext};
//! use reasonsplit::{classify, MarkerConfig};
//!
//! let lifecycle = classify(MarkerConfig::default(), ["Reasoning: 2+2. ", "Answer: 4"]);
//! let run = RunContext::new("thread_1");
//! let body = EventEncoder::new().encode_all(&run.to_agui_run(&lifecycle)).unwrap();
//! assert!(body.starts_with("data: {\"type\":\"RUN_STARTED\""));
//! ```
//!
//! [`LifecycleEvent`]: crate::streaming::LifecycleEvent

mod encoder;
mod protocol;
mod run;
mod traits;

pub use encoder::{EventEncoder, SSE_CONTENT_TYPE};
pub use protocol::AgUiEvent;
pub use run::RunContext;
pub(crate) use run::generate_id;
pub use traits::EventType;
