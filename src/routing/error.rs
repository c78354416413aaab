//! Error types for routing failures

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur while routing a logical call
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Every eligible provider failed for this logical call.
    ///
    /// The last underlying provider error is kept for diagnostics;
    /// intermediate failures are only visible through health and metrics
    /// snapshots.
    #[error("routing failed: no provider could serve the call ({attempts} attempt(s))")]
    AllProvidersFailed {
        attempts: u32,
        #[source]
        last_error: Option<ProviderError>,
    },
}
