//! Error type for a single provider attempt.

use std::time::Duration;
use thiserror::Error;

/// Errors a provider attempt can produce.
///
/// These are recorded against the attempted provider and absorbed by the
/// failover loop; callers only see the last one, wrapped in
/// [`crate::routing::RoutingError::AllProvidersFailed`].
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The attempt exceeded its timeout budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with an RPC-level error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The upstream answered 200 but the body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
