//! Typed configuration for Kontakt.
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A `.env` file, if present (loaded into the process environment)
//! 3. A TOML or JSON file named by `KONTAKT_CONFIG`
//! 4. `KONTAKT__SECTION__KEY` environment overrides
//! 5. `KONTAKT_ENV`, the deployment mode
//!
//! Unknown fields in files are rejected.
//!
//! # Example
//!
//! ```no_run
//! use kontakt_config::ConfigLoader;
//!
//! # fn main() -> Result<(), kontakt_config::ConfigError> {
//! let config = ConfigLoader::from_env()?;
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! environment = "production"
//!
//! [server]
//! http_addr = "0.0.0.0:8000"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! docs_enabled = true
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `KONTAKT__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `KONTAKT__TELEMETRY__LOGGING__FORMAT=pretty`
//! - `KONTAKT__TELEMETRY__METRICS__ENABLED=true`
//! - `KONTAKT_ENV=production`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{KontaktConfig, KontaktConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, CONFIG_FILE_VAR, ENV_PREFIX, MODE_VAR};
pub use schema::{LogFormat, LoggingConfig, MetricsSection, ServerSection, TelemetrySection};
