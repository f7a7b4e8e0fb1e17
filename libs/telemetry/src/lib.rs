//! Lightweight helpers for ambassador telemetry.
//! Provides subscriber installation, span utilities, metric recorders and label
//! helpers shared by the translator and the adapters.

use anyhow::Result;

mod config;
mod context;
mod metrics;
mod tracing_init;

pub use config::{LogFormat, TelemetryConfig};
pub use context::TelemetryLabels;
pub use metrics::{record_counter, record_histogram};
pub use tracing_init::{init_telemetry, with_common_fields};

/// Installs the shared subscriber configured from the environment (`RUST_LOG`, `LOG_FORMAT`).
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(service_name))
}
