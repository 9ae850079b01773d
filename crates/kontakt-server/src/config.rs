//! Server configuration.
//!
//! ```rust
//! use kontakt_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("0.0.0.0:8000")
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "0.0.0.0:8000");
//! assert!(config.docs_enabled());
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// Default shutdown drain period in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    docs_enabled: bool,
    service_name: String,
    service_version: String,
}

impl ServerConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// How long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Bound on body collection and on handler execution, each.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether `/swagger.json` and `/documentation` are served.
    #[must_use]
    pub fn docs_enabled(&self) -> bool {
        self.docs_enabled
    }

    /// Service name reported by `/health` and the API docs.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Service version reported by `/health` and the API docs.
    #[must_use]
    pub fn service_version(&self) -> &str {
        &self.service_version
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    http_addr: String,
    shutdown_timeout: Duration,
    request_timeout: Duration,
    docs_enabled: bool,
    service_name: String,
    service_version: String,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            docs_enabled: true,
            service_name: "kontakt".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = addr.into();
        self
    }

    /// Sets the shutdown drain period.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables the documentation endpoints.
    #[must_use]
    pub fn docs_enabled(mut self, enabled: bool) -> Self {
        self.docs_enabled = enabled;
        self
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Sets the service version.
    #[must_use]
    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr,
            shutdown_timeout: self.shutdown_timeout,
            request_timeout: self.request_timeout,
            docs_enabled: self.docs_enabled,
            service_name: self.service_name,
            service_version: self.service_version,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), DEFAULT_HTTP_ADDR);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.docs_enabled());
        assert_eq!(config.service_name(), "kontakt");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServerConfig::builder()
            .http_addr("0.0.0.0:9000")
            .shutdown_timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_millis(250))
            .docs_enabled(false)
            .service_name("contacts")
            .service_version("9.9.9")
            .build();

        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert!(!config.docs_enabled());
        assert_eq!(config.service_version(), "9.9.9");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = ServerConfig::builder().http_addr("localhost").build();
        assert!(config.socket_addr().is_err());
    }
}
