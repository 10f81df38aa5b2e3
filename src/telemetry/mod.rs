//! Telemetry module
//!
//! Metrics and structured logging

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{record_counter, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
///
/// Starts the Prometheus exporter when a metrics port is configured; a port
/// of zero disables it. Must run inside a tokio runtime.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level)?;

    if config.metrics_port != 0 {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics_port))
            .install()?;
        tracing::info!(port = config.metrics_port, "Prometheus exporter listening");
    }

    Ok(())
}
