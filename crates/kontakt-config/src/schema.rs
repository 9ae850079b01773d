//! Configuration sections.

use serde::{Deserialize, Serialize};

/// HTTP server section.
///
/// # Example
///
/// ```
/// use kontakt_config::ServerSection;
///
/// let section = ServerSection::default();
/// assert_eq!(section.http_addr, "127.0.0.1:8000");
/// assert!(section.docs_enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Graceful shutdown drain period in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Bound on body collection and on handler execution, in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Serve `/swagger.json` and `/documentation`.
    #[serde(default = "default_true")]
    pub docs_enabled: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            docs_enabled: true,
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging section.
///
/// Unset values follow the deployment mode: `info` + JSON in production,
/// `debug` + pretty in development.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive.
    #[serde(default)]
    pub level: Option<String>,

    /// Output format.
    #[serde(default)]
    pub format: Option<LogFormat>,
}

/// Prometheus exporter section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the exporter.
    #[serde(default)]
    pub enabled: bool,

    /// Exporter listener address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}

/// Telemetry section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsSection,
}
