//! Logging and metrics for Kontakt.
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, JSON lines in
//!   production and pretty output in development
//! - **Metrics**: request counters and latency histograms through the
//!   `metrics` facade, optionally exported in Prometheus format
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `kontakt_requests_total` | Counter | `operation`, `status` | Total request count |
//! | `kontakt_request_duration_seconds` | Histogram | `operation` | Request latency |
//! | `kontakt_validation_failures_total` | Counter | `source`, `constraint` | Rejected requests |
//! | `kontakt_in_flight_requests` | Gauge | - | Currently processing requests |
//!
//! # Example
//!
//! ```rust,ignore
//! use kontakt_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! tracing::info!(operation = "addContact", "Processing request");
//! ```

#![doc(html_root_url = "https://docs.rs/kontakt-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use self::metrics::{init_metrics, record_request, record_validation_failure, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
