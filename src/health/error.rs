//! Error types for health probes.

use thiserror::Error;

/// Errors that can occur during a health probe.
///
/// Always local to the health monitor; never surfaced to callers and
/// never interrupts in-flight calls.
#[derive(Debug, Clone, Error)]
pub enum HealthCheckError {
    /// Probe timeout
    #[error("probe timed out after {0}s")]
    Timeout(u64),

    /// Transport-level probe failure
    #[error("probe failed: {0}")]
    Failed(String),

    /// The endpoint answered but reports itself unhealthy
    #[error("provider reported unhealthy")]
    Unhealthy,
}
