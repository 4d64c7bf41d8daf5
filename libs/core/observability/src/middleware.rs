//! Axum middleware for automatic HTTP request metrics.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Response},
    middleware::Next,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Records, labelled by `method`, `path` (the matched route template) and `status`:
/// - `http_requests_total`
/// - `http_request_duration_seconds`
/// - `http_requests_errors_total` for 4xx and 5xx responses
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/posts/{id}", get(handler))
///     .layer(axum::middleware::from_fn(metrics_middleware));
/// ```
pub async fn metrics_middleware(
    matched_path: Option<MatchedPath>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();
    let method = request.method().to_string();
    // Unmatched requests share one label so random URLs can't blow up cardinality
    let path = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status();
    let status_label = status.as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .record(elapsed);

    if status.is_client_error() || status.is_server_error() {
        counter!(
            "http_requests_errors_total",
            "method" => method,
            "path" => path,
            "status" => status_label
        )
        .increment(1);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_metrics;
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    async fn missing() -> StatusCode {
        StatusCode::NOT_FOUND
    }

    #[tokio::test]
    async fn test_records_route_template_and_status() {
        let handle = init_metrics().unwrap();

        let app = Router::new()
            .route("/posts/{id}", get(|| async { "ok" }))
            .route("/missing/{id}", get(missing))
            .layer(middleware::from_fn(metrics_middleware));

        let ok = app
            .clone()
            .oneshot(Request::builder().uri("/posts/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let not_found = app
            .oneshot(Request::builder().uri("/missing/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let rendered = handle.render();
        assert!(rendered.contains("http_requests_total{"));
        assert!(rendered.contains(r#"path="/posts/{id}""#));
        assert!(!rendered.contains(r#"path="/posts/42""#));
        assert!(rendered.contains("http_request_duration_seconds_bucket{"));
        assert!(rendered.contains(r#"le="0.5""#));
        assert!(rendered.contains("http_requests_errors_total{"));
        assert!(rendered.contains(r#"path="/missing/{id}""#));
    }
}
