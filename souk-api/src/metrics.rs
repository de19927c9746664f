//! Prometheus Metrics
//!
//! Provides Prometheus metrics for monitoring the Souk API.
//!
//! # Metrics
//!
//! ## Counters
//! - `souk_http_requests_total` - Total HTTP requests by method, path, status
//! - `souk_escrow_operations_total` - Escrow operations by type and outcome
//!
//! ## Histograms
//! - `souk_http_request_duration_seconds` - HTTP request duration
//!
//! # Configuration
//!
//! - `SOUK_METRICS_ENABLED`: Enable metrics (default: true)

use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::time::Instant;

/// Metrics configuration
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("SOUK_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Self { enabled }
    }
}

/// Initialize the metrics exporter.
///
/// Call once at startup; recording is a no-op until installed.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), String> {
    if !config.enabled {
        tracing::info!("Metrics disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .install()
        .map_err(|e| format!("Failed to install metrics recorder: {}", e))?;

    tracing::info!("Metrics initialized");
    Ok(())
}

/// Record a request metric
pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("souk_http_requests_total", &labels).increment(1);
    histogram!("souk_http_request_duration_seconds", &labels).record(duration_secs);
}

/// Record an escrow operation outcome
pub fn record_escrow_operation(operation: &str, ok: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("outcome", if ok { "ok" } else { "error" }.to_string()),
    ];

    counter!("souk_escrow_operations_total", &labels).increment(1);
}

/// Metrics middleware recording per-request counters and latency
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
