//! Resilient call routing across providers
//!
//! This module implements the routing core: a logical `(method, params)`
//! call is ranked against the configured providers, attempted in order
//! with per-provider timeouts, and transparently failed over until one
//! provider succeeds or all are exhausted.

pub mod error;
pub mod policy;
pub mod rank;

pub use error::RoutingError;
pub use policy::RoutingPolicy;
pub use rank::rank;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::{ConfigError, RouterConfig, RoutingConfig};
use crate::metrics::{HealthSnapshot, MetricsSnapshot, RouterMetrics};
use crate::provider::{ProviderError, RpcProvider};
use crate::registry::{ProviderRecord, ProviderRegistry};

fn encode_policy(policy: RoutingPolicy) -> u8 {
    match policy {
        RoutingPolicy::HealthFirst => 0,
        RoutingPolicy::LatencyBased => 1,
        RoutingPolicy::CostBased => 2,
        RoutingPolicy::RoundRobin => 3,
    }
}

fn decode_policy(value: u8) -> RoutingPolicy {
    match value {
        1 => RoutingPolicy::LatencyBased,
        2 => RoutingPolicy::CostBased,
        3 => RoutingPolicy::RoundRobin,
        _ => RoutingPolicy::HealthFirst,
    }
}

/// Routes logical RPC calls to the best live provider.
///
/// One instance per process, constructed explicitly and shared by
/// reference; there is no ambient default router. Many concurrent calls
/// may run against the same instance; per-record atomics keep unrelated
/// providers' traffic from serializing.
pub struct Router {
    /// Provider records, shared with the health monitor
    registry: Arc<ProviderRegistry>,

    /// Routing policy, swappable at runtime by an operator
    policy: AtomicU8,

    /// Health thresholds and breaker windows
    config: RoutingConfig,

    /// Router-level counters
    counters: Arc<RouterMetrics>,

    /// Cursor for the round-robin policy, advanced per ranking
    round_robin_cursor: AtomicU64,
}

impl Router {
    /// Create a router over an already-populated registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoProviders` for an empty registry, or a
    /// validation error for out-of-range thresholds.
    pub fn new(registry: ProviderRegistry, config: RoutingConfig) -> Result<Self, ConfigError> {
        if registry.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        config.validate()?;

        Ok(Self {
            registry: Arc::new(registry),
            policy: AtomicU8::new(encode_policy(config.policy)),
            config,
            counters: Arc::new(RouterMetrics::new()),
            round_robin_cursor: AtomicU64::new(0),
        })
    }

    /// Create a router from configuration, pairing each `[[providers]]`
    /// entry with its caller-supplied handle by name.
    ///
    /// # Errors
    ///
    /// Fails fast on invalid configuration, a configured provider with no
    /// handle, or a handle with no matching provider entry.
    pub fn from_config(
        config: RouterConfig,
        mut handles: HashMap<String, Arc<dyn RpcProvider>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut registry = ProviderRegistry::new();
        for provider in &config.providers {
            let handle = handles
                .remove(&provider.name)
                .ok_or_else(|| ConfigError::MissingHandle(provider.name.clone()))?;
            registry
                .register(provider, handle)
                .map_err(|e| ConfigError::Validation {
                    field: "providers".to_string(),
                    message: e.to_string(),
                })?;
        }

        if let Some(name) = handles.keys().next() {
            return Err(ConfigError::Validation {
                field: "providers".to_string(),
                message: format!("handle '{}' has no matching provider entry", name),
            });
        }

        Self::new(registry, config.routing)
    }

    /// The active routing policy.
    pub fn policy(&self) -> RoutingPolicy {
        decode_policy(self.policy.load(Ordering::SeqCst))
    }

    /// Swap the routing policy at runtime. In-flight calls keep the
    /// ordering they were ranked with.
    pub fn set_policy(&self, policy: RoutingPolicy) {
        self.policy.store(encode_policy(policy), Ordering::SeqCst);
        tracing::info!(%policy, "routing policy changed");
    }

    /// Shared registry handle, e.g. for constructing a health monitor or
    /// flipping a provider's enabled switch.
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&self.registry)
    }

    /// The routing configuration this router was built with.
    pub fn routing_config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Point-in-time health summary.
    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot::collect(&self.registry)
    }

    /// Point-in-time metrics summary.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::collect(&self.registry, &self.counters)
    }

    /// Execute a logical call, failing over between providers.
    ///
    /// Providers are attempted strictly in ranked order, one attempt per
    /// provider, each under its own configured timeout. The first success
    /// wins; exhaustion returns [`RoutingError::AllProvidersFailed`]
    /// wrapping the last provider error.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RoutingError> {
        self.dispatch(method, params, None).await
    }

    /// Like [`call`](Router::call), but stops starting new attempts once
    /// `deadline` passes and caps each attempt's timeout at the remaining
    /// budget.
    pub async fn call_with_deadline(
        &self,
        method: &str,
        params: Value,
        deadline: Instant,
    ) -> Result<Value, RoutingError> {
        self.dispatch(method, params, Some(deadline)).await
    }

    fn ranked(&self) -> Vec<Arc<ProviderRecord>> {
        let policy = self.policy();
        let seq = if policy == RoutingPolicy::RoundRobin {
            self.round_robin_cursor.fetch_add(1, Ordering::Relaxed)
        } else {
            0
        };
        rank(&self.registry.records(), policy, seq)
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Value,
        deadline: Option<Instant>,
    ) -> Result<Value, RoutingError> {
        self.counters.record_request();

        let candidates = self.ranked();
        let mut attempts = 0u32;
        let mut last_error: Option<ProviderError> = None;

        for record in candidates {
            // The enabled switch may have flipped since ranking.
            if !record.is_enabled() {
                continue;
            }

            let mut budget = record.timeout;
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    tracing::debug!(method, attempts, "caller deadline expired, abandoning failover");
                    break;
                }
                budget = budget.min(remaining);
            }

            attempts += 1;
            let start = Instant::now();
            let outcome =
                tokio::time::timeout(budget, record.handle().call(method, params.clone())).await;

            let error = match outcome {
                Ok(Ok(result)) => {
                    let latency_ms = start.elapsed().as_millis() as u32;
                    self.complete_success(&record, method, latency_ms, attempts);
                    return Ok(result);
                }
                Ok(Err(error)) => error,
                Err(_) => ProviderError::Timeout(budget),
            };

            self.note_failure(&record, method, &error);
            last_error = Some(error);
        }

        self.counters.record_failure();
        metrics::counter!("rpc_router_requests_total", "status" => "failed").increment(1);
        tracing::warn!(method, attempts, "all providers failed");
        Err(RoutingError::AllProvidersFailed {
            attempts,
            last_error,
        })
    }

    fn complete_success(&self, record: &ProviderRecord, method: &str, latency_ms: u32, attempts: u32) {
        record.record_success(latency_ms);

        // A success on a provider whose breaker has cooled down for the
        // full window acts as the half-open probe and closes the breaker.
        if let Some(open_for) = record.circuit_open_for() {
            if open_for >= Duration::from_secs(self.config.circuit_breaker_timeout_seconds) {
                record.close_circuit();
                tracing::info!(provider = %record.name, "circuit closed by successful call");
            }
        }

        self.counters.record_success();
        metrics::counter!("rpc_router_requests_total", "status" => "success").increment(1);
        metrics::counter!(
            "rpc_router_attempts_total",
            "provider" => record.name.clone(),
            "status" => "success"
        )
        .increment(1);
        metrics::histogram!(
            "rpc_router_attempt_duration_seconds",
            "provider" => record.name.clone()
        )
        .record(latency_ms as f64 / 1000.0);

        tracing::debug!(provider = %record.name, method, latency_ms, attempts, "call served");
    }

    fn note_failure(&self, record: &ProviderRecord, method: &str, error: &ProviderError) {
        let streak = record.record_failure();
        metrics::counter!(
            "rpc_router_attempts_total",
            "provider" => record.name.clone(),
            "status" => "error"
        )
        .increment(1);
        tracing::debug!(
            provider = %record.name,
            method,
            error = %error,
            streak,
            "provider attempt failed, trying next candidate"
        );

        if streak >= self.config.circuit_breaker_threshold && record.circuit_open_for().is_none() {
            record.open_circuit();
            tracing::warn!(provider = %record.name, streak, "circuit opened after consecutive failures");
        }
    }
}
