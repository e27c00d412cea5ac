//! Error responses emitted by the admission layers.
//!
//! Bodies are JSON envelopes of the form `{"error": "..."}`. Internal error
//! details are logged, never sent to the client.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::time::Duration;

const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";
const RATE_LIMIT_MESSAGE: &str = "rate limit exceeded";

/// Build a JSON error response with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// 500 Internal Server Error. Logs `err`.
pub fn server_error_response(err: &dyn std::error::Error) -> Response {
    tracing::error!(error = %err, "Request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
}

/// 429 Too Many Requests, with `Retry-After` when a wait is known.
pub fn rate_limit_exceeded_response(retry_after: Option<Duration>) -> Response {
    let mut response = error_response(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE);
    if let Some(wait) = retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(wait)));
    }
    response
}

/// Whole seconds to wait, rounded up, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
