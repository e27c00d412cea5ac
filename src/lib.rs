//! Per-client admission control for Axum servers.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request id / trace
//!                        │
//!                        ▼
//!                  ┌────────────┐   panic → 500 + Connection: close
//!                  │  recover   │
//!                  └─────┬──────┘
//!                        ▼
//!                  ┌────────────┐   over limit → 429
//!                  │ rate_limit │◀──── reclaimer (evicts idle clients)
//!                  └─────┬──────┘
//!                        ▼
//!                  downstream router
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ServerConfig;
pub use error::GatekeeperError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
