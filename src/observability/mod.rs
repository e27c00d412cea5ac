//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request path and reclaimer produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
