//! Health check route served by the binary behind the admission layers.

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

pub fn routes() -> Router {
    Router::new().route("/v1/healthcheck", get(healthcheck))
}

async fn healthcheck() -> Json<Value> {
    Json(json!({
        "status": "available",
        "system_info": {
            "version": env!("CARGO_PKG_VERSION"),
        },
    }))
}
