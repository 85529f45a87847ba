//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{HooksConfig, LogFormat, LoggingConfig, MetricsSection, RouterConfig};

/// Complete Scaly configuration.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Unknown keys are rejected.
///
/// # Example
///
/// ```rust
/// use scaly_config::ScalyConfig;
///
/// let config: ScalyConfig = toml::from_str(r#"
///     [router]
///     route_table_path = "var/routes.json"
///
///     [hooks]
///     dependency_injection = false
/// "#).unwrap();
///
/// assert_eq!(config.router.route_table_path, "var/routes.json");
/// assert!(config.hooks.method_filter);
/// assert!(!config.hooks.dependency_injection);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScalyConfig {
    /// Router settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Built-in hook toggles.
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl ScalyConfig {
    /// Local development preset: pretty debug logs, route table regenerated
    /// and persisted.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON logs at info, the route table is treated as a
    /// build artifact and never rewritten.
    #[must_use]
    pub fn production() -> Self {
        Self {
            router: RouterConfig {
                regenerate_on_boot: false,
                persist_on_shutdown: false,
                ..RouterConfig::default()
            },
            metrics: MetricsSection {
                enabled: true,
                addr: None,
            },
            ..Self::default()
        }
    }

    /// Checks values that deserialization cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for an empty route table path,
    /// an unparsable log filter or a default route with empty fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.route_table_path.trim().is_empty() {
            return Err(ConfigError::validation_error(
                "router.route_table_path must not be empty",
            ));
        }

        if let Some(default_route) = &self.router.default_route {
            if default_route.controller.trim().is_empty()
                || default_route.function.trim().is_empty()
            {
                return Err(ConfigError::validation_error(
                    "router.default_route needs both controller and function",
                ));
            }
        }

        if self.logging.enabled {
            scaly_telemetry::logging::create_env_filter(&self.logging.level).map_err(|e| {
                ConfigError::validation_error(format!("logging.level is invalid: {e}"))
            })?;
        }

        if let Some(addr) = &self.metrics.addr {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::validation_error(format!(
                    "metrics.addr is not a socket address: {addr}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DefaultRouteConfig;

    #[test]
    fn test_default_is_valid() {
        assert!(ScalyConfig::default().validate().is_ok());
        assert!(ScalyConfig::development().validate().is_ok());
        assert!(ScalyConfig::production().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = ScalyConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.router.regenerate_on_boot);

        let prod = ScalyConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(!prod.router.persist_on_shutdown);
        assert!(prod.metrics.enabled);
    }

    #[test]
    fn test_empty_document() {
        let config: ScalyConfig = toml::from_str("").unwrap();
        assert_eq!(config, ScalyConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(toml::from_str::<ScalyConfig>("[server]\nport = 80").is_err());
        assert!(toml::from_str::<ScalyConfig>("[router]\ntable = \"x\"").is_err());
    }

    #[test]
    fn test_empty_table_path_invalid() {
        let mut config = ScalyConfig::default();
        config.router.route_table_path = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_incomplete_default_route_invalid() {
        let mut config = ScalyConfig::default();
        config.router.default_route = Some(DefaultRouteConfig {
            controller: "PageController".to_string(),
            function: String::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_log_level_invalid() {
        let mut config = ScalyConfig::default();
        config.logging.level = "scaly_router=loud".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_metrics_addr_invalid() {
        let mut config = ScalyConfig::default();
        config.metrics.addr = Some("localhost".to_string());
        assert!(config.validate().is_err());

        config.metrics.addr = Some("127.0.0.1:9090".to_string());
        assert!(config.validate().is_ok());
    }
}
