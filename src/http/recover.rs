//! Panic containment for the request path.
//!
//! A panic below this layer becomes a 500 response carrying
//! `Connection: close`: handler state after an unwind is undefined, so the
//! connection must not be reused.

use axum::{
    http::{header, HeaderValue},
    response::Response,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::GatekeeperError;
use crate::http::response::server_error_response;
use crate::observability::metrics;

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer converting handler panics into server-error responses.
pub fn recover_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let err = GatekeeperError::HandlerPanic(panic_message(payload.as_ref()));
    metrics::record_recovered_panic();

    let mut response = server_error_response(&err);
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
