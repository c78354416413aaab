//! Per-provider breaker state derivation.

use std::fmt;
use std::time::Duration;

use super::error::HealthCheckError;
use crate::config::RoutingConfig;
use crate::registry::ProviderRecord;

/// Breaker position for one provider, derived from its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Healthy and routed normally
    Closed,
    /// Tripped and still cooling down
    Open,
    /// Cooldown elapsed; one successful probe may close the breaker
    HalfOpen,
}

/// Derive the breaker position from the record's open-window timer.
pub fn circuit_state(record: &ProviderRecord, breaker_timeout: Duration) -> CircuitState {
    match record.circuit_open_for() {
        None => CircuitState::Closed,
        Some(open_for) if open_for >= breaker_timeout => CircuitState::HalfOpen,
        Some(_) => CircuitState::Open,
    }
}

/// Why a responsive provider is considered degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum DegradationReason {
    /// Cumulative error rate above the configured ceiling
    ErrorRate(f64),
    /// Average latency above the configured ceiling
    Latency(u32),
}

impl fmt::Display for DegradationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradationReason::ErrorRate(rate) => write!(f, "error rate {:.3}", rate),
            DegradationReason::Latency(ms) => write!(f, "latency {}ms", ms),
        }
    }
}

/// Slow-degradation check over the cumulative call statistics.
///
/// Catches providers that keep answering probes while erroring or slowing
/// down under real traffic, which pure consecutive-failure counting would
/// miss. Requires at least one recorded call attempt.
pub fn degradation_reason(
    record: &ProviderRecord,
    config: &RoutingConfig,
) -> Option<DegradationReason> {
    if record.attempts() == 0 {
        return None;
    }

    let error_rate = record.error_rate();
    if error_rate > config.max_error_rate {
        return Some(DegradationReason::ErrorRate(error_rate));
    }

    let latency_ms = record.latency_ms();
    if latency_ms > config.max_latency_ms {
        return Some(DegradationReason::Latency(latency_ms));
    }

    None
}

/// Result of one health probe.
#[derive(Debug, Clone)]
pub enum ProbeResult {
    /// The endpoint answered and reports itself healthy
    Success { latency_ms: u32 },
    /// The probe failed or the endpoint reports itself unhealthy
    Failure { error: HealthCheckError },
}
