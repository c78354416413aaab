use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ProviderConfig;
use crate::provider::RpcProvider;

/// Router-owned state for one upstream provider.
///
/// Pairs the caller-supplied handle with configuration and runtime
/// statistics. All mutable fields are atomics, so records can be shared
/// freely between the dispatcher and the health monitor without locking;
/// every record synchronizes independently of its siblings.
///
/// The `healthy` flag and the breaker window move together: a record is
/// unhealthy exactly while its circuit is open. [`open_circuit`] and
/// [`close_circuit`] are the only mutators of either.
///
/// [`open_circuit`]: ProviderRecord::open_circuit
/// [`close_circuit`]: ProviderRecord::close_circuit
#[derive(Debug)]
pub struct ProviderRecord {
    /// Unique provider name (registry key, metric label)
    pub name: String,
    /// Caller-supplied capability for calls and probes
    handle: Arc<dyn RpcProvider>,
    /// Routing tie-breaker (lower = prefer)
    pub priority: i32,
    /// Configured per-request cost
    pub cost_per_request: f64,
    /// Timeout applied to each call attempt
    pub timeout: Duration,
    /// Operator switch, independent of observed health
    enabled: AtomicBool,
    /// Derived health flag; false while the breaker is open
    healthy: AtomicBool,
    /// Lifetime successful calls
    success_count: AtomicU64,
    /// Lifetime failed calls
    error_count: AtomicU64,
    /// Failures since the last success; drives breaker transitions
    consecutive_failures: AtomicU32,
    /// Rolling average call latency in milliseconds (EMA with α=0.2)
    avg_latency_ms: AtomicU32,
    /// Monotonic anchor for the breaker window
    created: Instant,
    /// Milliseconds since `created` when the breaker opened, offset by one
    /// so that 0 can mean "breaker closed"
    circuit_opened_at: AtomicU64,
    /// Epoch milliseconds of the last completed probe; 0 = never probed
    last_health_check: AtomicI64,
}

impl ProviderRecord {
    /// Create a record from static configuration and a handle.
    ///
    /// Counters start at zero and the provider starts healthy; the health
    /// monitor and the dispatcher's failure path take it from there.
    pub fn new(config: &ProviderConfig, handle: Arc<dyn RpcProvider>) -> Self {
        Self {
            name: config.name.clone(),
            handle,
            priority: config.priority,
            cost_per_request: config.cost_per_request,
            timeout: Duration::from_secs(config.timeout_seconds),
            enabled: AtomicBool::new(config.enabled),
            healthy: AtomicBool::new(true),
            success_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
            avg_latency_ms: AtomicU32::new(0),
            created: Instant::now(),
            circuit_opened_at: AtomicU64::new(0),
            last_health_check: AtomicI64::new(0),
        }
    }

    /// The caller-supplied capability.
    ///
    /// The record is the only place that invokes it for routing purposes.
    pub fn handle(&self) -> &Arc<dyn RpcProvider> {
        &self.handle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// Total call attempts recorded against this provider.
    pub fn attempts(&self) -> u64 {
        self.success_count() + self.error_count()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    pub fn latency_ms(&self) -> u32 {
        self.avg_latency_ms.load(Ordering::SeqCst)
    }

    /// Error rate over all recorded attempts, in [0, 1]. Zero when no
    /// attempts have been recorded yet.
    pub fn error_rate(&self) -> f64 {
        let errors = self.error_count() as f64;
        let total = errors + self.success_count() as f64;
        if total == 0.0 {
            0.0
        } else {
            errors / total
        }
    }

    /// Record a successful call attempt.
    pub fn record_success(&self, latency_ms: u32) {
        self.success_count.fetch_add(1, Ordering::SeqCst);
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.update_latency(latency_ms);
    }

    /// Record a failed call attempt. Returns the new consecutive-failure
    /// count so the dispatcher can trip the breaker at threshold.
    pub fn record_failure(&self) -> u32 {
        self.error_count.fetch_add(1, Ordering::SeqCst);
        self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Update rolling average latency using EMA: new = (sample + 4*old) / 5.
    ///
    /// Uses integer math with α=0.2. First sample sets the initial value.
    pub fn update_latency(&self, latency_ms: u32) {
        loop {
            let current = self.avg_latency_ms.load(Ordering::SeqCst);

            let new_val = if current == 0 {
                latency_ms
            } else {
                (latency_ms + 4 * current) / 5
            };

            match self.avg_latency_ms.compare_exchange(
                current,
                new_val,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return,
                Err(_) => continue, // Retry if another task modified the value
            }
        }
    }

    /// Open the breaker: mark unhealthy and start the cooldown window.
    pub fn open_circuit(&self) {
        self.healthy.store(false, Ordering::SeqCst);
        let since_created = self.created.elapsed().as_millis() as u64;
        self.circuit_opened_at
            .store(since_created + 1, Ordering::SeqCst);
    }

    /// Close the breaker: mark healthy and clear the failure streak.
    pub fn close_circuit(&self) {
        self.healthy.store(true, Ordering::SeqCst);
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.circuit_opened_at.store(0, Ordering::SeqCst);
    }

    /// How long the breaker has been open, or None when it is closed.
    pub fn circuit_open_for(&self) -> Option<Duration> {
        let stamp = self.circuit_opened_at.load(Ordering::SeqCst);
        if stamp == 0 {
            return None;
        }
        let opened = Duration::from_millis(stamp - 1);
        Some(self.created.elapsed().saturating_sub(opened))
    }

    /// Stamp the completion time of a health probe.
    pub fn mark_health_checked(&self) {
        self.last_health_check
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    pub fn last_health_check(&self) -> Option<DateTime<Utc>> {
        let millis = self.last_health_check.load(Ordering::SeqCst);
        if millis == 0 {
            None
        } else {
            DateTime::from_timestamp_millis(millis)
        }
    }
}

/// Serializable view of a ProviderRecord (atomic fields converted to
/// regular values, error rate precomputed).
///
/// Use this for JSON serialization since atomic types cannot be serialized
/// directly. Convert with `Into`/`From`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderView {
    pub name: String,
    pub priority: i32,
    pub enabled: bool,
    pub healthy: bool,
    pub success_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub latency_ms: u32,
    pub cost_per_request: f64,
    pub consecutive_failures: u32,
    pub circuit_open: bool,
    pub last_health_check: Option<DateTime<Utc>>,
}

impl From<&ProviderRecord> for ProviderView {
    fn from(record: &ProviderRecord) -> Self {
        Self {
            name: record.name.clone(),
            priority: record.priority,
            enabled: record.is_enabled(),
            healthy: record.is_healthy(),
            success_count: record.success_count(),
            error_count: record.error_count(),
            error_rate: record.error_rate(),
            latency_ms: record.latency_ms(),
            cost_per_request: record.cost_per_request,
            consecutive_failures: record.consecutive_failures(),
            circuit_open: record.circuit_open_for().is_some(),
            last_health_check: record.last_health_check(),
        }
    }
}
