//! The root configuration type.

use kontakt_core::{DeploymentMode, FailurePolicy};
use kontakt_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::{ConfigError, LogFormat, ServerSection, TelemetrySection};

/// Complete Kontakt configuration.
///
/// # Example
///
/// ```
/// use kontakt_config::KontaktConfig;
/// use kontakt_core::DeploymentMode;
///
/// let config = KontaktConfig::default();
/// assert_eq!(config.environment, DeploymentMode::Development);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KontaktConfig {
    /// Server section.
    #[serde(default)]
    pub server: ServerSection,

    /// Telemetry section.
    #[serde(default)]
    pub telemetry: TelemetrySection,

    /// Deployment mode.
    #[serde(default)]
    pub environment: DeploymentMode,
}

impl KontaktConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> KontaktConfigBuilder {
        KontaktConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparsable address, a zero
    /// request timeout or an invalid log filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.telemetry.metrics.enabled
            && self.telemetry.metrics.addr.parse::<SocketAddr>().is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        if let Some(level) = &self.telemetry.logging.level {
            kontakt_telemetry::logging::create_env_filter(level)
                .map_err(|e| ConfigError::invalid_value("telemetry.logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// The failure policy for the configured mode.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::new(self.environment)
    }

    /// The resolved log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.telemetry.logging.format.unwrap_or(match self.environment {
            DeploymentMode::Production => LogFormat::Json,
            DeploymentMode::Development => LogFormat::Pretty,
        })
    }

    /// Logging settings for [`kontakt_telemetry::init_logging`].
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.environment {
            DeploymentMode::Production => LogConfig::production(),
            DeploymentMode::Development => LogConfig::development(),
        };
        let base = match &self.telemetry.logging.level {
            Some(level) => base.with_level(level.clone()),
            None => base,
        };
        base.with_json_format(self.log_format() == LogFormat::Json)
    }

    /// Exporter settings for [`kontakt_telemetry::init_metrics`].
    #[must_use]
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.telemetry.metrics.enabled,
            addr: self.telemetry.metrics.addr.clone(),
        }
    }

    /// The shutdown drain period.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// The request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }
}

/// Builder for [`KontaktConfig`].
#[derive(Debug, Default)]
pub struct KontaktConfigBuilder {
    server: Option<ServerSection>,
    telemetry: Option<TelemetrySection>,
    environment: Option<DeploymentMode>,
}

impl KontaktConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server section.
    #[must_use]
    pub fn server(mut self, server: ServerSection) -> Self {
        self.server = Some(server);
        self
    }

    /// Sets the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Sets the deployment mode.
    #[must_use]
    pub fn environment(mut self, environment: DeploymentMode) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Builds the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> KontaktConfig {
        KontaktConfig {
            server: self.server.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
            environment: self.environment.unwrap_or_default(),
        }
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<KontaktConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoggingConfig;

    #[test]
    fn test_default_config() {
        let config = KontaktConfig::default();
        assert_eq!(config.server.http_addr, "127.0.0.1:8000");
        assert_eq!(config.environment, DeploymentMode::Development);
        assert_eq!(config.failure_policy(), FailurePolicy::development());
    }

    #[test]
    fn test_builder() {
        let config = KontaktConfig::builder()
            .server(ServerSection {
                http_addr: "0.0.0.0:3000".to_string(),
                ..ServerSection::default()
            })
            .environment(DeploymentMode::Production)
            .build();

        assert_eq!(config.server.http_addr, "0.0.0.0:3000");
        assert_eq!(config.failure_policy().mode(), DeploymentMode::Production);
        assert!(!config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_invalid_http_addr() {
        let result = KontaktConfig::builder()
            .server(ServerSection {
                http_addr: "localhost".to_string(),
                ..ServerSection::default()
            })
            .build_validated();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let mut config = KontaktConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_metrics_addr_only_checked_when_enabled() {
        let mut config = KontaktConfig::default();
        config.telemetry.metrics.addr = "nope".to_string();
        assert!(config.validate().is_ok());

        config.telemetry.metrics.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_follows_mode() {
        let mut config = KontaktConfig::default();
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert!(!config.log_config().json_format);

        config.environment = DeploymentMode::Production;
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_config().level, "info");
    }

    #[test]
    fn test_log_overrides() {
        let config = KontaktConfig::builder()
            .environment(DeploymentMode::Production)
            .telemetry(TelemetrySection {
                logging: LoggingConfig {
                    level: Some("warn".to_string()),
                    format: Some(LogFormat::Pretty),
                },
                ..TelemetrySection::default()
            })
            .build();

        let log = config.log_config();
        assert_eq!(log.level, "warn");
        assert!(!log.json_format);
    }

    #[test]
    fn test_durations() {
        let config = KontaktConfig::default();
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
