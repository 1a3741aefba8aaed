//! Prometheus request metrics exposed at `/metrics`.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

const METRICS_NAMESPACE: &str = "lunch";
const METRICS_ENDPOINT: &str = "/metrics";

/// Build the request metrics middleware.
///
/// # Errors
///
/// Returns an I/O error when the collectors cannot be registered.
pub(crate) fn prometheus_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint(METRICS_ENDPOINT)
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}
