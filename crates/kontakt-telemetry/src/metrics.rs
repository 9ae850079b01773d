//! Request metrics.
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed, so the server can record unconditionally.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus exporter.
    pub enabled: bool,

    /// Listener address for the exporter (e.g. `127.0.0.1:9090`).
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Installs the Prometheus recorder with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let (recorder, exporter) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = exporter.await {
            tracing::error!(error = ?e, "Prometheus exporter stopped");
        }
    });
    register_metric_descriptions();

    tracing::info!(addr = %addr, "Prometheus exporter listening");
    Ok(())
}

fn register_metric_descriptions() {
    describe_counter!(
        "kontakt_requests_total",
        "Total number of HTTP requests processed"
    );
    describe_histogram!(
        "kontakt_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "kontakt_validation_failures_total",
        "Requests rejected by a route schema"
    );
    describe_gauge!(
        "kontakt_in_flight_requests",
        "Number of HTTP requests currently being processed"
    );
}

/// Records a completed request.
pub fn record_request(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        "kontakt_requests_total",
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "kontakt_request_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a schema rejection.
///
/// `constraint` is the first violated constraint, never the offending value.
pub fn record_validation_failure(source: &str, constraint: &str) {
    counter!(
        "kontakt_validation_failures_total",
        "source" => source.to_string(),
        "constraint" => constraint.to_string()
    )
    .increment(1);
}

/// Keeps `kontakt_in_flight_requests` raised while alive.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the gauge and returns the guard.
    #[must_use]
    pub fn new() -> Self {
        gauge!("kontakt_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("kontakt_in_flight_requests").decrement(1.0);
    }
}
