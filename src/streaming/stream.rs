//! Async adapter from a completion source to lifecycle events.

use std::collections::VecDeque;

use futures_util::stream::{self, Stream, StreamExt};

use super::classifier::StreamClassifier;
use super::types::LifecycleEvent;
use crate::config::MarkerConfig;

struct ClassifyState<S> {
    source: S,
    classifier: Option<StreamClassifier>,
    pending: VecDeque<LifecycleEvent>,
}

/// Classify a stream of completion deltas.
///
/// Events come out in production order. The first `Err` from `source` is
/// forwarded as the final item; no closing events are synthesized after it.
/// Dropping the returned stream drops `source`.
pub fn classify_stream<S, E>(
    source: S,
    markers: MarkerConfig,
) -> impl Stream<Item = Result<LifecycleEvent, E>>
where
    S: Stream<Item = Result<String, E>> + Unpin,
{
    let state = ClassifyState {
        source,
        classifier: Some(StreamClassifier::new(markers)),
        pending: VecDeque::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event), state));
            }

            let classifier = state.classifier.as_mut()?;
            match state.source.next().await {
                Some(Ok(delta)) => state.pending.extend(classifier.push(&delta)),
                Some(Err(err)) => {
                    tracing::debug!("completion source failed, aborting classification");
                    state.classifier = None;
                    return Some((Err(err), state));
                }
                None => {
                    if let Some(classifier) = state.classifier.take() {
                        state.pending.extend(classifier.finish());
                    }
                }
            }
        }
    })
}
