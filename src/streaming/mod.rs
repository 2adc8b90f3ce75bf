//! Reasoning/answer classification of streamed completions.
//!
//! The model is prompted to write its thinking after a reasoning prefix and
//! its final answer after an answer marker. [`StreamClassifier`] consumes the
//! raw deltas and emits [`LifecycleEvent`]s as each channel opens, receives
//! content and closes.

mod classifier;
#[cfg(feature = "streaming")]
mod stream;
mod types;

pub use classifier::{classify, StreamClassifier};
#[cfg(feature = "streaming")]
pub use stream::classify_stream;
pub use types::{LifecycleEvent, ParserState};
