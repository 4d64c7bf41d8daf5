//! Wraps successful JSON responses in `{status, data, message, meta?}`.
//!
//! Handlers return their payload as plain JSON; [`json_envelope`] stamps the
//! envelope on the way out. A handler that wants `meta` populated attaches a
//! [`ResponseMeta`] response extension:
//!
//! ```ignore
//! async fn list() -> impl IntoResponse {
//!     let page = load_page().await;
//!     (Extension(ResponseMeta(json!({"total": page.total}))), Json(page))
//! }
//! ```
//!
//! Error responses, non-JSON bodies and empty bodies pass through untouched.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderValue, Response, header},
    middleware::Next,
    response::IntoResponse,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;

pub const SUCCESS_MESSAGE: &str = "Operation successful";

/// Bodies above this size are passed through rather than buffered.
const MAX_ENVELOPE_BODY: usize = 16 * 1024 * 1024;

/// Extra response metadata copied into the envelope's `meta` field.
#[derive(Clone, Debug)]
pub struct ResponseMeta(pub serde_json::Value);

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `success` for enveloped responses
    pub status: &'static str,
    pub data: T,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, meta: Option<serde_json::Value>) -> Self {
        Self {
            status: "success",
            data,
            message: SUCCESS_MESSAGE.to_string(),
            meta,
        }
    }
}

fn is_json(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

pub async fn json_envelope(request: Request, next: Next) -> Response<Body> {
    let response = next.run(request).await;

    if !response.status().is_success() || !is_json(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let meta = parts.extensions.remove::<ResponseMeta>().map(|meta| meta.0);

    let bytes = match to_bytes(body, MAX_ENVELOPE_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::InternalServerError(format!("failed to buffer response: {e}"))
                .into_response();
        }
    };

    let data: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(data) => data,
        Err(e) => return AppError::SerdeJson(e).into_response(),
    };

    let enveloped = match serde_json::to_vec(&ApiResponse::success(data, meta)) {
        Ok(enveloped) => enveloped,
        Err(e) => return AppError::SerdeJson(e).into_response(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(enveloped))
}
