//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → http::recover (panic containment, outermost)
//!     → rate_limit (per-client token bucket)
//!     → downstream router
//! ```
//!
//! # Design Decisions
//! - Rejections are complete responses, never dropped connections
//! - Limiter state is process-local and bounded by idle eviction

pub mod rate_limit;
