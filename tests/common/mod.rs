//! Shared helpers for integration tests.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use gatekeeper::config::ServerConfig;
use gatekeeper::security::rate_limit::AdmissionController;
use gatekeeper::{HttpServer, Shutdown};

/// A server running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub controller: Arc<AdmissionController>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start `downstream` behind the admission layers.
pub async fn start_server(config: ServerConfig, downstream: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, downstream);
    let controller = server.controller().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        controller,
        shutdown,
        handle,
    }
}

/// Config with the limiter set to `rps`/`burst`.
#[allow(dead_code)]
pub fn limited_config(rps: f64, burst: u32) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.limiter.enabled = true;
    config.limiter.rps = rps;
    config.limiter.burst = burst;
    config
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
