//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the downstream router in the admission layers
//! - Wire up ambient middleware (request ID, tracing, timeout)
//! - Run the client reclaimer alongside the server
//! - Serve until the shutdown signal fires

use axum::{body::Body, http::Request, middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::recover::recover_panic_layer;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::security::rate_limit::{rate_limit_middleware, AdmissionController};

/// HTTP server fronting a downstream router with admission control.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    controller: Arc<AdmissionController>,
}

impl HttpServer {
    /// Wrap `downstream` with panic containment and per-client rate limiting.
    pub fn new(config: ServerConfig, downstream: Router) -> Self {
        let controller = Arc::new(AdmissionController::new(config.limiter.clone()));
        let router = Self::build_router(&config, downstream, controller.clone());
        Self {
            router,
            config,
            controller,
        }
    }

    /// Layer order, outermost first: request ID, trace, panic containment,
    /// admission, timeout, downstream.
    #[allow(deprecated)]
    fn build_router(
        config: &ServerConfig,
        downstream: Router,
        controller: Arc<AdmissionController>,
    ) -> Router {
        downstream
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(controller, rate_limit_middleware))
            .layer(recover_panic_layer())
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let limiter = &self.config.limiter;
        tracing::info!(
            address = %addr,
            limiter_enabled = limiter.enabled,
            rps = limiter.rps,
            burst = limiter.burst,
            "HTTP server starting"
        );

        // The reclaimer lives exactly as long as the server.
        let (stop_reclaimer, reclaimer_rx) = broadcast::channel(1);
        let reclaimer = self.controller.spawn_reclaimer(reclaimer_rx);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await;

        drop(stop_reclaimer);
        if let Some(handle) = reclaimer {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Client reclaimer ended abnormally");
            }
        }

        served?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn controller(&self) -> &Arc<AdmissionController> {
        &self.controller
    }
}
