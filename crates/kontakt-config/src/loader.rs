//! Layered configuration loader.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use kontakt_core::DeploymentMode;

use crate::{ConfigError, KontaktConfig, LogFormat};

/// Prefix for `PREFIX__SECTION__KEY` overrides.
pub const ENV_PREFIX: &str = "KONTAKT";

/// Variable naming an optional configuration file.
pub const CONFIG_FILE_VAR: &str = "KONTAKT_CONFIG";

/// Variable selecting the deployment mode.
pub const MODE_VAR: &str = "KONTAKT_ENV";

/// Configuration loader.
///
/// Layers are applied in call order for files and strings; environment
/// overrides and the mode variable are applied by [`ConfigLoader::load`].
///
/// # Example
///
/// ```
/// use kontakt_config::ConfigLoader;
/// use kontakt_core::DeploymentMode;
///
/// let config = ConfigLoader::new()
///     .with_string(r#"environment = "production""#, "toml")
///     .unwrap()
///     .with_env_vars([("KONTAKT__SERVER__HTTP_ADDR", "0.0.0.0:9000")])
///     .with_env_prefix("KONTAKT")
///     .load()
///     .unwrap();
///
/// assert_eq!(config.environment, DeploymentMode::Production);
/// assert_eq!(config.server.http_addr, "0.0.0.0:9000");
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: KontaktConfig,
    env_prefix: Option<String>,
    mode_var: Option<String>,
    env_vars: Option<HashMap<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: KontaktConfig::default(),
            env_prefix: None,
            mode_var: None,
            env_vars: None,
        }
    }

    /// Loads configuration the way the service binary does.
    ///
    /// Reads `.env`, then the file named by `KONTAKT_CONFIG` (if set), then
    /// `KONTAKT__*` overrides and `KONTAKT_ENV`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the named file is missing or invalid, an
    /// override cannot be parsed, or validation fails.
    pub fn from_env() -> Result<KontaktConfig, ConfigError> {
        let mut loader = Self::new().with_dotenv();
        if let Ok(path) = env::var(CONFIG_FILE_VAR) {
            if !path.trim().is_empty() {
                loader = loader.with_file(path)?;
            }
        }
        loader.with_env_prefix(ENV_PREFIX).with_mode_var(MODE_VAR).load()
    }

    /// Resets to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = KontaktConfig::default();
        self
    }

    /// Loads a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Loads a TOML (`.toml`) or JSON (`.json`) file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or fails to parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `toml` or `json` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(format.to_string()))
            }
        };
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Reads the deployment mode from the named variable.
    ///
    /// Only the value `production` selects production. When the variable is
    /// unset, the mode from earlier layers is kept.
    #[must_use]
    pub fn with_mode_var(mut self, name: &str) -> Self {
        self.mode_var = Some(name.to_string());
        self
    }

    /// Uses the given variables instead of the process environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Applies environment layers and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<KontaktConfig, ConfigError> {
        let vars = self
            .env_vars
            .take()
            .unwrap_or_else(|| env::vars().collect::<HashMap<_, _>>());

        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let mut keys: Vec<&String> = vars.keys().filter(|k| k.starts_with(&marker)).collect();
            keys.sort();
            for key in keys {
                self.apply_env_var(key, &vars[key], &prefix)?;
            }
        }

        if let Some(mode_var) = self.mode_var.take() {
            if let Some(value) = vars.get(&mode_var) {
                self.config.environment = DeploymentMode::from_env_value(Some(value));
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without applying environment layers or
    /// validating.
    #[must_use]
    pub fn load_unvalidated(self) -> KontaktConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<KontaktConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(
                other.map_or_else(|| path.display().to_string(), ToString::to_string),
            )),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::invalid_override(key, "invalid key format"))?;

        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::invalid_override(key, "expected integer"))?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::invalid_override(key, "expected integer"))?;
            }
            ["SERVER", "DOCS_ENABLED"] => {
                self.config.server.docs_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_override(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                self.config.telemetry.logging.level =
                    (!value.is_empty()).then(|| value.to_string());
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                self.config.telemetry.logging.format = Some(match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::invalid_override(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                });
            }
            ["TELEMETRY", "METRICS", "ENABLED"] => {
                self.config.telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_override(key, "expected boolean"))?;
            }
            ["TELEMETRY", "METRICS", "ADDR"] => {
                self.config.telemetry.metrics.addr = value.to_string();
            }
            ["ENVIRONMENT"] => {
                self.config.environment = value
                    .parse()
                    .map_err(|e: String| ConfigError::invalid_override(key, e))?;
            }
            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
