use amb_core::{DecodeError, Message, Platform};
use amb_telemetry::{TelemetryLabels, record_counter};

const TRANSLATE_SPAN_NAME: &str = "translate.run";
const TRANSLATE_COUNTER: &str = "messages_translated";
const DECODE_FAILURE_COUNTER: &str = "webhook_decode_failures";

pub fn translate_with_span<F>(platform: Platform, f: F) -> Result<Vec<Message>, DecodeError>
where
    F: FnOnce() -> Result<Vec<Message>, DecodeError>,
{
    let labels = TelemetryLabels::new(platform.as_str());
    let span = tracing::info_span!(
        TRANSLATE_SPAN_NAME,
        platform = %platform,
        events = tracing::field::Empty
    );
    let _guard = span.enter();
    let result = f();
    match &result {
        Ok(messages) => {
            span.record("events", messages.len());
            record_counter(TRANSLATE_COUNTER, messages.len() as u64, &labels);
        }
        Err(err) => {
            tracing::warn!(error = %err, "webhook decode failed");
            record_counter(DECODE_FAILURE_COUNTER, 1, &labels);
        }
    }
    result
}
