//! Per-client admission control.
//!
//! Every client host gets its own token bucket, created on first sight and
//! dropped by the [`Reclaimer`] once the client has been idle for three
//! reclaim intervals.
//!
//! # Example Usage
//!
//! ```ignore
//! let controller = Arc::new(AdmissionController::new(config.limiter.clone()));
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(middleware::from_fn_with_state(controller, rate_limit_middleware));
//! ```

mod bucket;
mod identity;
mod reclaimer;
mod registry;

pub use bucket::{Quota, TokenBucket};
pub use identity::{client_identity, split_host_port};
pub use reclaimer::{Reclaimer, STALE_INTERVALS};
pub use registry::{Admission, ClientLimiterEntry, ClientRegistry};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::LimiterConfig;
use crate::http::request::remote_addr;
use crate::http::response::{rate_limit_exceeded_response, server_error_response};
use crate::observability::metrics;

/// Owns the client registry and the limiter settings.
pub struct AdmissionController {
    config: LimiterConfig,
    registry: Arc<ClientRegistry>,
}

impl AdmissionController {
    pub fn new(config: LimiterConfig) -> Self {
        let registry = Arc::new(ClientRegistry::new(Quota::new(config.rps, config.burst)));
        Self { config, registry }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Start evicting idle clients. Returns `None` when limiting is disabled.
    pub fn spawn_reclaimer(&self, shutdown: broadcast::Receiver<()>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            return None;
        }
        let interval = Duration::from_secs(self.config.cleanup_interval_secs);
        Some(Reclaimer::new(self.registry.clone(), interval).spawn(shutdown))
    }
}

/// Middleware enforcing the per-client rate limit.
pub async fn rate_limit_middleware(
    State(controller): State<Arc<AdmissionController>>,
    request: Request,
    next: Next,
) -> Response {
    if !controller.is_enabled() {
        return next.run(request).await;
    }

    let addr = remote_addr(&request).unwrap_or_default();
    let identity = match client_identity(&addr) {
        Ok(host) => host,
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "Rejecting unidentifiable client"
            );
            return server_error_response(&e);
        }
    };

    match controller.registry.admit(identity) {
        Admission::Allowed => {
            metrics::record_admission("allowed");
            next.run(request).await
        }
        Admission::Denied { retry_after } => {
            tracing::warn!(client = %identity, retry_after = ?retry_after, "Rate limit exceeded");
            metrics::record_admission("denied");
            rate_limit_exceeded_response(retry_after)
        }
    }
}
