//! Liveness endpoint.
//!
//! `GET /health` answers as long as the process is serving requests; it does
//! not look at any dependency because the service has none.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Body of a `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    status: String,
    service: String,
    version: String,
    uptime_seconds: u64,
}

impl HealthStatus {
    /// A healthy status.
    #[must_use]
    pub fn healthy(service: impl Into<String>, version: impl Into<String>, uptime: Duration) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            version: version.into(),
            uptime_seconds: uptime.as_secs(),
        }
    }

    /// The status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Seconds since the server was built.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.uptime_seconds
    }
}

/// Liveness check for one service instance.
///
/// ```rust
/// use kontakt_server::HealthCheck;
///
/// let health = HealthCheck::new("kontakt", "0.1.0");
/// assert_eq!(health.status().status(), "healthy");
/// ```
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    started_at: Instant,
}

impl HealthCheck {
    /// Creates a check that starts counting uptime now.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            started_at: Instant::now(),
        }
    }

    /// The service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The service version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus::healthy(&self.service, &self.version, self.started_at.elapsed())
    }
}
