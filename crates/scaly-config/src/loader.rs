//! Layered configuration loading.
//!
//! Layers apply in order, later layers winning:
//!
//! 1. Defaults
//! 2. Configuration file (TOML or JSON)
//! 3. Environment variables (`SCALY__SECTION__KEY`)

use std::path::{Path, PathBuf};

use crate::config::ScalyConfig;
use crate::error::ConfigError;
use crate::schema::{DefaultRouteConfig, LogFormat};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "SCALY";

/// Environment variable separator.
const ENV_SEPARATOR: &str = "__";

/// File format for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl FileFormat {
    /// Detects the format from a file extension. Anything but `.json` is TOML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Builder for layered configuration.
///
/// # Example
///
/// ```rust
/// use scaly_config::{ConfigLoader, FileFormat};
///
/// let config = ConfigLoader::new()
///     .with_string(r#"{"router": {"route_table_path": "app/routes.json"}}"#, FileFormat::Json)
///     .unwrap()
///     .with_env_prefix("SCALY_DOC_EXAMPLE")
///     .load()
///     .unwrap();
///
/// assert_eq!(config.router.route_table_path, "app/routes.json");
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: ScalyConfig,
    env_prefix: String,
    sources: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from [`ScalyConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ScalyConfig::default(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            sources: Vec::new(),
        }
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ScalyConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ScalyConfig::production();
        self
    }

    /// Loads a configuration file, replacing the current layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` if the file does not exist, and a
    /// read or parse error otherwise.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        self.config = parse_file(path)?;
        self.sources.push(path.to_path_buf());
        Ok(self)
    }

    /// Loads a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns a read or parse error for a file that exists but is broken.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Parses configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed content or unknown keys.
    pub fn with_string(mut self, content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        self.config = parse_str(content, format)?;
        Ok(self)
    }

    /// Sets the environment variable prefix (default `SCALY`).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Loads a `.env` file from the working directory into the process
    /// environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Files that contributed to this configuration.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable environment value or a
    /// configuration that fails [`ScalyConfig::validate`].
    pub fn load(self) -> Result<ScalyConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable environment value.
    pub fn load_unvalidated(self) -> Result<ScalyConfig, ConfigError> {
        let mut config = self.config;
        let prefix = format!("{}{ENV_SEPARATOR}", self.env_prefix);

        for (key, value) in std::env::vars() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                apply_env_var(&mut config, &key, rest, &value)?;
            }
        }

        Ok(config)
    }
}

fn parse_file(path: &Path) -> Result<ScalyConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
    parse_str(&content, FileFormat::from_path(path))
}

fn parse_str(content: &str, format: FileFormat) -> Result<ScalyConfig, ConfigError> {
    match format {
        FileFormat::Toml => Ok(toml::from_str(content)?),
        FileFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Applies one `SECTION__KEY` override. Unknown keys are ignored.
fn apply_env_var(
    config: &mut ScalyConfig,
    var: &str,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let upper = key.to_ascii_uppercase();
    let parts: Vec<&str> = upper.split(ENV_SEPARATOR).collect();

    match parts.as_slice() {
        ["ROUTER", "ROUTE_TABLE_PATH"] => config.router.route_table_path = value.to_string(),
        ["ROUTER", "REGENERATE_ON_BOOT"] => {
            config.router.regenerate_on_boot = parse_bool(var, value)?;
        }
        ["ROUTER", "PERSIST_ON_SHUTDOWN"] => {
            config.router.persist_on_shutdown = parse_bool(var, value)?;
        }
        ["ROUTER", "DEFAULT_ROUTE", "CONTROLLER"] => {
            default_route(config).controller = value.to_string();
        }
        ["ROUTER", "DEFAULT_ROUTE", "FUNCTION"] => {
            default_route(config).function = value.to_string();
        }
        ["HOOKS", "METHOD_FILTER"] => config.hooks.method_filter = parse_bool(var, value)?,
        ["HOOKS", "REST_CONTROLLERS"] => config.hooks.rest_controllers = parse_bool(var, value)?,
        ["HOOKS", "DEPENDENCY_INJECTION"] => {
            config.hooks.dependency_injection = parse_bool(var, value)?;
        }
        ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(var, value)?,
        ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
        ["LOGGING", "FORMAT"] => config.logging.format = parse_log_format(var, value)?,
        ["LOGGING", "INCLUDE_LOCATION"] => {
            config.logging.include_location = parse_bool(var, value)?;
        }
        ["METRICS", "ENABLED"] => config.metrics.enabled = parse_bool(var, value)?,
        ["METRICS", "ADDR"] => {
            config.metrics.addr = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        _ => {}
    }

    Ok(())
}

fn default_route(config: &mut ScalyConfig) -> &mut DefaultRouteConfig {
    config
        .router
        .default_route
        .get_or_insert_with(|| DefaultRouteConfig {
            controller: String::new(),
            function: String::new(),
        })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(
            var,
            format!("expected boolean, got '{value}'"),
        )),
    }
}

fn parse_log_format(var: &str, value: &str) -> Result<LogFormat, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        _ => Err(ConfigError::env_parse_error(
            var,
            format!("expected 'json' or 'pretty', got '{value}'"),
        )),
    }
}
