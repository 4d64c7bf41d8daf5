//! HTTP middleware module.
//!
//! - CORS configuration
//! - Security headers
//! - JSON response envelope
//!
//! ```ignore
//! use axum_helpers::http::{create_cors_layer, json_envelope, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(json_envelope))
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(create_cors_layer(origins));
//! ```

pub mod cors;
pub mod envelope;
pub mod security;

pub use cors::{create_cors_layer, create_permissive_cors_layer};
pub use envelope::{ApiResponse, ResponseMeta, SUCCESS_MESSAGE, json_envelope};
pub use security::security_headers;
