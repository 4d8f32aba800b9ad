//! HTTP request handlers for the mock server.

pub mod artifacts;
pub mod builds;

pub use artifacts::*;
pub use builds::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Error body in the API's `{"message": ...}` shape.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

pub(crate) fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "You must log in first.")
}
