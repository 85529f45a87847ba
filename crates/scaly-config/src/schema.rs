//! Configuration schema sections.

use serde::{Deserialize, Serialize};

/// Router and route-table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Path of the persisted JSON route table.
    #[serde(default = "default_route_table_path")]
    pub route_table_path: String,

    /// Rebuild dynamic routes from controller annotations at startup.
    #[serde(default = "default_true")]
    pub regenerate_on_boot: bool,

    /// Write the route table back on shutdown when it changed.
    #[serde(default = "default_true")]
    pub persist_on_shutdown: bool,

    /// Route answering requests that match no prefix.
    #[serde(default)]
    pub default_route: Option<DefaultRouteConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            route_table_path: default_route_table_path(),
            regenerate_on_boot: true,
            persist_on_shutdown: true,
            default_route: None,
        }
    }
}

/// Controller action used as the default route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultRouteConfig {
    /// Registered controller name.
    pub controller: String,

    /// Action on that controller.
    pub function: String,
}

/// Which built-in hooks are layered onto the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HooksConfig {
    /// Reject verbs outside a route's `Method` list with 405.
    #[serde(default = "default_true")]
    pub method_filter: bool,

    /// Map HTTP verbs to actions on REST controllers.
    #[serde(default = "default_true")]
    pub rest_controllers: bool,

    /// Resolve controller injection points from the service container.
    #[serde(default = "default_true")]
    pub dependency_injection: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            method_filter: true,
            rest_controllers: true,
            dependency_injection: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info", "scaly_router=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log lines.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the subscriber settings understood by `scaly-telemetry`.
    #[must_use]
    pub fn to_log_config(&self) -> scaly_telemetry::LogConfig {
        scaly_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            span_events: false,
            include_location: self.include_location,
            include_target: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Metrics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Address to serve `/metrics` on.
    #[serde(default)]
    pub addr: Option<String>,
}

impl MetricsSection {
    /// Converts to the recorder settings understood by `scaly-telemetry`.
    #[must_use]
    pub fn to_metrics_config(&self) -> scaly_telemetry::MetricsConfig {
        scaly_telemetry::MetricsConfig {
            enabled: self.enabled,
            addr: self.addr.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_route_table_path() -> String {
    "routes.json".to_string()
}
