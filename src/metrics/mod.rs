//! # Metrics Collection Module
//!
//! Router-level counters, snapshot assembly, and Prometheus export.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `rpc_router_requests_total{status}` - Logical calls by outcome
//! - `rpc_router_attempts_total{provider, status}` - Per-provider attempts
//!
//! **Histograms:**
//! - `rpc_router_attempt_duration_seconds{provider}` - Call attempt latency
//! - `rpc_router_probe_duration_seconds{provider}` - Health probe latency
//!
//! **Gauges:**
//! - `rpc_router_providers_total` - Configured providers
//! - `rpc_router_providers_healthy` - Currently healthy providers
//!
//! The snapshot API ([`HealthSnapshot`], [`MetricsSnapshot`]) is plain
//! data; Prometheus export is ambient observability on top.

pub mod types;

pub use types::*;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::registry::ProviderRegistry;

/// Process-wide router counters, one instance per router.
///
/// Counters are monotonic for the router's lifetime and update exactly
/// once per logical call, not once per provider attempt.
#[derive(Debug)]
pub struct RouterMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    started_at: Instant,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Count a logical call entering the dispatcher.
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a logical call that returned a result.
    pub fn record_success(&self) {
        self.successful_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a logical call that exhausted every candidate.
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::SeqCst)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::SeqCst)
    }

    /// Successful share of all completed calls, 0 when idle.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests() as f64;
        if total == 0.0 {
            0.0
        } else {
            self.successful_requests() as f64 / total
        }
    }

    /// Seconds since the router was constructed.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Update provider fleet gauges from current registry state.
///
/// Called by the health monitor after each probe cycle.
pub fn update_provider_gauges(registry: &ProviderRegistry) {
    let views = registry.views();

    metrics::gauge!("rpc_router_providers_total").set(views.len() as f64);

    let healthy = views.iter().filter(|v| v.healthy).count();
    metrics::gauge!("rpc_router_providers_healthy").set(healthy as f64);
}

/// Initialize Prometheus metrics exporter with custom histogram buckets.
///
/// Buckets span sub-millisecond in-process stubs up to multi-second
/// degraded upstreams: [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1, 2.5,
/// 5, 10] seconds.
///
/// Returns a PrometheusHandle that can be used to render metrics.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let duration_buckets = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("rpc_router_attempt_duration_seconds".to_string()),
            duration_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full("rpc_router_probe_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}
