//! Observability for Scaly.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: dispatch counters and latency through the `metrics` facade,
//!   optionally exported in Prometheus format
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `scaly_dispatch_total` | Counter | `route`, `status` | Dispatched requests |
//! | `scaly_dispatch_duration_seconds` | Histogram | `route` | Dispatch latency |
//! | `scaly_route_misses_total` | Counter | - | Requests with no matching route |
//! | `scaly_short_circuits_total` | Counter | `middleware` | Middleware that answered without calling `next` |
//! | `scaly_dispatch_errors_total` | Counter | `code` | Dispatches that ended in an error |
//!
//! # Example
//!
//! ```rust,ignore
//! use scaly_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!("router ready");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
