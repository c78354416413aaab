//! Per-provider configuration

use serde::{Deserialize, Serialize};

/// Static configuration for one upstream provider.
///
/// The transport itself is not configured here; the caller pairs each
/// entry with an [`crate::provider::RpcProvider`] handle at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name, used as the registry key and metric label
    pub name: String,
    /// Routing tie-breaker (lower = prefer)
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Operator switch, independent of observed health
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-request cost used by the cost-based policy and usage accounting
    #[serde(default)]
    pub cost_per_request: f64,
    /// Timeout applied to every call attempt against this provider
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_priority() -> i32 {
    50
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    10
}
