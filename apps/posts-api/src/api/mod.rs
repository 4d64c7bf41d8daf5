//! HTTP routes for the posts service.

pub mod health;
pub mod posts;

use axum::{Router, middleware, routing::get};
use observability::{metrics_handler, metrics_middleware};

use crate::state::AppState;

/// Domain routes, `/ready` and `/metrics`, with request metrics recorded for all of them.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/posts", posts::router(state))
        .merge(health::router(state.clone()))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_middleware))
}
