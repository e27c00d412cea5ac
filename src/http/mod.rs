//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (request ID, remote address)
//!     → recover.rs (panic → 500 + Connection: close)
//!     → [security::rate_limit admits or rejects]
//!     → downstream router
//!     → response.rs (error bodies for rejected/failed requests)
//! ```

pub mod healthcheck;
pub mod recover;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RemoteAddr, X_REQUEST_ID};
pub use server::HttpServer;
