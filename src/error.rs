//! Errors surfaced on the request path.

use thiserror::Error;

/// Failures detected by the admission and containment layers.
///
/// Both variants are terminal at the layer that detects them: they are turned
/// into a server-error response and never propagated further.
#[derive(Debug, Error)]
pub enum GatekeeperError {
    /// The remote address could not be split into host and port.
    #[error("invalid remote address {addr:?}: {reason}")]
    ClientIdentity {
        addr: String,
        reason: &'static str,
    },

    /// A downstream handler panicked.
    #[error("handler panicked: {0}")]
    HandlerPanic(String),
}
