use std::time::Instant;

use amb_core::{DispatchError, Platform};
use amb_telemetry::{TelemetryLabels, record_counter, record_histogram, with_common_fields};
use tracing::Span;

const STAGE_SPAN_NAME: &str = "egress.stage";
const SEND_SPAN_NAME: &str = "egress.send";
const STAGED_COUNTER: &str = "fragments_staged";
const EGRESSED_COUNTER: &str = "messages_egressed";
const FAILURE_COUNTER: &str = "egress_failures";
const LATENCY_HISTOGRAM: &str = "egress_latency_ms";

fn labels(platform: Platform, key: &str, value: &str) -> TelemetryLabels {
    let mut labels = TelemetryLabels::new(platform.as_str());
    labels.extra.push((key.to_string(), value.to_string()));
    labels
}

pub(crate) fn record_staged(platform: Platform, kind: &'static str, pending: usize) {
    let span = tracing::debug_span!(STAGE_SPAN_NAME, platform = %platform, kind, pending);
    let _guard = span.enter();
    tracing::debug!("fragment staged");
    record_counter(STAGED_COUNTER, 1, &labels(platform, "kind", kind));
}

pub(crate) fn send_span(platform: Platform, routing: &str, fragments: usize) -> Span {
    let span = tracing::info_span!(
        SEND_SPAN_NAME,
        platform = tracing::field::Empty,
        routing = tracing::field::Empty,
        msg_id = tracing::field::Empty,
        fragments,
        delivered = tracing::field::Empty,
    );
    with_common_fields(&span, platform.as_str(), Some(routing), None);
    span
}

/// Records the outcome of one `send` call on the current `egress.send` span.
pub(crate) fn record_outcome(
    platform: Platform,
    delivered: usize,
    started: Instant,
    result: &Result<(), DispatchError>,
) {
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    Span::current().record("delivered", delivered);

    let outcome = if result.is_ok() { "ok" } else { "error" };
    record_histogram(LATENCY_HISTOGRAM, elapsed_ms, &labels(platform, "outcome", outcome));
    if delivered > 0 {
        record_counter(
            EGRESSED_COUNTER,
            delivered as u64,
            &TelemetryLabels::new(platform.as_str()),
        );
    }

    match result {
        Ok(()) => tracing::info!(delivered, elapsed_ms, "batch dispatched"),
        Err(err) => {
            let reason = match err {
                DispatchError::Remote { .. } => "remote",
                DispatchError::Transport { .. } => "transport",
                DispatchError::Encode { .. } => "encode",
            };
            record_counter(FAILURE_COUNTER, 1, &labels(platform, "reason", reason));
            tracing::warn!(
                delivered,
                status = err.status().map(|s| s.as_u16()),
                error = %err,
                "batch dispatch failed"
            );
        }
    }
}

/// Serialized batch attached to dispatch errors for diagnostics.
pub(crate) fn pending_json<F: serde::Serialize>(batch: &[F]) -> String {
    serde_json::to_string(batch).unwrap_or_else(|err| format!("<unserializable batch: {err}>"))
}

pub(crate) fn history_values<F: serde::Serialize>(batch: &[F]) -> Vec<serde_json::Value> {
    batch
        .iter()
        .enumerate()
        .filter_map(|(index, fragment)| match serde_json::to_value(fragment) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(index, error = %err, "last sent fragment is not serializable");
                None
            }
        })
        .collect()
}
