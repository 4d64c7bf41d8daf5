//! Prometheus metrics for the posts service.
//!
//! - [`init_metrics`] installs the global recorder once
//! - [`metrics_handler`] renders the exposition format for `GET /metrics`
//! - [`middleware::metrics_middleware`] records per-request HTTP metrics
//! - [`PostMetrics`] records domain operations
//!
//! ```rust,ignore
//! use axum::{Router, middleware, routing::get};
//! use observability::{init_metrics, metrics_handler, middleware::metrics_middleware};
//!
//! init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(middleware::from_fn(metrics_middleware));
//! ```

pub mod middleware;
pub mod posts;

pub use middleware::metrics_middleware;
pub use posts::PostMetrics;

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

/// Buckets for `http_request_duration_seconds`, in seconds.
pub const HTTP_DURATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.0, 5.0];

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install Prometheus recorder: {0}")]
    Install(#[from] BuildError),
}

/// Install the Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, MetricsError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full("http_request_duration_seconds".to_string()),
                HTTP_DURATION_BUCKETS,
            )?
            .install_recorder()?;

        register_metric_descriptions();
        info!("Prometheus metrics recorder initialized");

        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`.
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP responses with a 4xx or 5xx status"
    );

    describe_counter!("posts_created_total", "Posts created by type");
    describe_counter!("posts_updated_total", "Posts updated by type");
    describe_counter!(
        "posts_deleted_total",
        "Posts removed, by single delete or bulk delete by author"
    );
    describe_counter!("post_queries_total", "Paginated post listings by type and scope");
}
