//! Dispatch metrics.
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed. [`init_metrics`] installs the Prometheus recorder;
//! with an address configured it also serves `/metrics` over HTTP.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram, set_global_recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::{Builder, Handle};

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Counter of dispatched requests.
pub const DISPATCH_TOTAL: &str = "scaly_dispatch_total";
/// Histogram of dispatch latency.
pub const DISPATCH_DURATION: &str = "scaly_dispatch_duration_seconds";
/// Counter of requests that matched no route.
pub const ROUTE_MISSES_TOTAL: &str = "scaly_route_misses_total";
/// Counter of middleware short-circuits.
pub const SHORT_CIRCUITS_TOTAL: &str = "scaly_short_circuits_total";
/// Counter of failed dispatches.
pub const DISPATCH_ERRORS_TOTAL: &str = "scaly_dispatch_errors_total";

/// Metrics configuration.
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address to serve `/metrics` on. `None` installs the recorder only.
    pub addr: Option<String>,
}

/// Installs the Prometheus recorder.
///
/// With an address configured the exporter serves `/metrics` there. It runs
/// on the current Tokio runtime when called from one, and on a dedicated
/// background thread otherwise.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if a recorder is already installed or the
/// listener cannot be started.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = match &config.addr {
        Some(addr) => {
            let addr: SocketAddr = addr
                .parse()
                .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
            install_with_listener(addr)?
        }
        None => PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?,
    };

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

fn install_with_listener(addr: SocketAddr) -> TelemetryResult<PrometheusHandle> {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    if let Ok(runtime) = Handle::try_current() {
        let (recorder, exporter) = {
            let _guard = runtime.enter();
            builder
                .build()
                .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        };
        let handle = recorder.handle();
        set_global_recorder(recorder)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        runtime.spawn(async move {
            if let Err(e) = exporter.await {
                tracing::error!(error = ?e, "Metrics exporter stopped");
            }
        });
        tracing::info!(%addr, "Serving metrics");
        return Ok(handle);
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let (recorder, exporter) = {
        let _guard = runtime.enter();
        builder
            .build()
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
    };
    let handle = recorder.handle();
    set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    std::thread::Builder::new()
        .name("scaly-metrics".to_string())
        .spawn(move || {
            if let Err(e) = runtime.block_on(exporter) {
                tracing::error!(error = ?e, "Metrics exporter stopped");
            }
        })
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    tracing::info!(%addr, "Serving metrics");
    Ok(handle)
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(DISPATCH_TOTAL, "Total number of dispatched requests");
    describe_histogram!(DISPATCH_DURATION, "Dispatch duration in seconds");
    describe_counter!(ROUTE_MISSES_TOTAL, "Requests that matched no route");
    describe_counter!(
        SHORT_CIRCUITS_TOTAL,
        "Middleware that answered without calling the next layer"
    );
    describe_counter!(DISPATCH_ERRORS_TOTAL, "Dispatches that ended in an error");
}

/// Records a completed dispatch.
pub fn record_dispatch(route: &str, status_code: u16, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(DISPATCH_DURATION, "route" => route.to_string()).record(duration.as_secs_f64());
}

/// Records a request that matched no route.
pub fn record_route_miss() {
    counter!(ROUTE_MISSES_TOTAL).increment(1);
}

/// Records a middleware that did not call `next`.
pub fn record_short_circuit(middleware: &'static str) {
    counter!(SHORT_CIRCUITS_TOTAL, "middleware" => middleware).increment(1);
}

/// Records a dispatch that failed with the given error code.
pub fn record_dispatch_error(code: &'static str) {
    counter!(DISPATCH_ERRORS_TOTAL, "code" => code).increment(1);
}
