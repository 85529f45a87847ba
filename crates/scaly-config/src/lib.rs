//! Layered configuration for Scaly.
//!
//! ```text
//! defaults → scaly.toml / scaly.json → SCALY__SECTION__KEY env vars → validate
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use scaly_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("scaly.toml")?
//!     .load()?;
//!
//! println!("route table at {}", config.router.route_table_path);
//! # Ok::<(), scaly_config::ConfigError>(())
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SCALY__ROUTER__ROUTE_TABLE_PATH` | `router.route_table_path` |
//! | `SCALY__ROUTER__REGENERATE_ON_BOOT` | `router.regenerate_on_boot` |
//! | `SCALY__ROUTER__PERSIST_ON_SHUTDOWN` | `router.persist_on_shutdown` |
//! | `SCALY__ROUTER__DEFAULT_ROUTE__CONTROLLER` | `router.default_route.controller` |
//! | `SCALY__ROUTER__DEFAULT_ROUTE__FUNCTION` | `router.default_route.function` |
//! | `SCALY__HOOKS__METHOD_FILTER` | `hooks.method_filter` |
//! | `SCALY__HOOKS__REST_CONTROLLERS` | `hooks.rest_controllers` |
//! | `SCALY__HOOKS__DEPENDENCY_INJECTION` | `hooks.dependency_injection` |
//! | `SCALY__LOGGING__ENABLED` | `logging.enabled` |
//! | `SCALY__LOGGING__LEVEL` | `logging.level` |
//! | `SCALY__LOGGING__FORMAT` | `logging.format` |
//! | `SCALY__LOGGING__INCLUDE_LOCATION` | `logging.include_location` |
//! | `SCALY__METRICS__ENABLED` | `metrics.enabled` |
//! | `SCALY__METRICS__ADDR` | `metrics.addr` |

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::ScalyConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, FileFormat, DEFAULT_ENV_PREFIX};
pub use schema::{
    DefaultRouteConfig, HooksConfig, LogFormat, LoggingConfig, MetricsSection, RouterConfig,
};
