//! Candidate processing span helpers.
//!
//! Provides span creation and state-transition recording for candidates
//! flowing through the action loop.

use tracing::Span;
use uuid::Uuid;

/// Start a span for processing one candidate.
///
/// The `candidate.state` field is declared empty and is updated via
/// [`record_state_transition`].
pub fn start_candidate_span(run_id: &Uuid, search_key: &str) -> Span {
    tracing::info_span!(
        "candidate.process",
        "run.id" = %run_id,
        "candidate.key" = search_key,
        "candidate.state" = tracing::field::Empty,
    )
}

/// Record a state transition on the span and emit it as an event.
pub fn record_state_transition(span: &Span, from: &str, to: &str) {
    span.record("candidate.state", to);
    span.in_scope(|| {
        tracing::debug!(from = from, to = to, "state_transition");
    });
}
