//! # Snapshot Types
//!
//! Plain-data views of router and provider state. The surrounding service
//! is expected to serialize these onto its own health/metrics endpoints;
//! the router never speaks HTTP itself.

use serde::Serialize;
use std::collections::BTreeMap;

use super::RouterMetrics;
use crate::registry::ProviderRegistry;

/// Point-in-time health summary across all providers.
///
/// `healthy` at the router level is true iff at least one provider is
/// healthy. Collecting a snapshot never pauses the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub total_providers: usize,
    pub healthy_providers: usize,
    pub unhealthy_providers: usize,
    pub provider_status: BTreeMap<String, ProviderHealth>,
}

/// Health detail for a single provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealth {
    pub healthy: bool,
    pub latency_ms: u32,
    pub error_rate: f64,
}

impl HealthSnapshot {
    /// Collect a snapshot from current registry state.
    pub fn collect(registry: &ProviderRegistry) -> Self {
        let views = registry.views();
        let healthy_providers = views.iter().filter(|v| v.healthy).count();

        let provider_status = views
            .iter()
            .map(|v| {
                (
                    v.name.clone(),
                    ProviderHealth {
                        healthy: v.healthy,
                        latency_ms: v.latency_ms,
                        error_rate: v.error_rate,
                    },
                )
            })
            .collect();

        Self {
            healthy: healthy_providers > 0,
            total_providers: views.len(),
            healthy_providers,
            unhealthy_providers: views.len() - healthy_providers,
            provider_status,
        }
    }
}

/// Point-in-time metrics summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub router: RouterStats,
    pub providers: BTreeMap<String, ProviderStats>,
    pub usage: UsageSnapshot,
}

/// Router-level counters, updated once per logical call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: f64,
}

/// Per-provider attempt counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStats {
    pub success_count: u64,
    pub error_count: u64,
    pub avg_latency_ms: u32,
}

/// Accrued usage and cost, derived from attempt counts and configured
/// per-request cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub uptime_seconds: u64,
    pub total_cost: f64,
    pub providers: BTreeMap<String, ProviderUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderUsage {
    pub calls: u64,
    pub cost: f64,
}

impl MetricsSnapshot {
    /// Collect a snapshot from current registry and counter state.
    pub fn collect(registry: &ProviderRegistry, counters: &RouterMetrics) -> Self {
        let views = registry.views();

        let providers: BTreeMap<String, ProviderStats> = views
            .iter()
            .map(|v| {
                (
                    v.name.clone(),
                    ProviderStats {
                        success_count: v.success_count,
                        error_count: v.error_count,
                        avg_latency_ms: v.latency_ms,
                    },
                )
            })
            .collect();

        let usage_providers: BTreeMap<String, ProviderUsage> = views
            .iter()
            .map(|v| {
                let calls = v.success_count + v.error_count;
                (
                    v.name.clone(),
                    ProviderUsage {
                        calls,
                        cost: calls as f64 * v.cost_per_request,
                    },
                )
            })
            .collect();

        let total_cost = usage_providers.values().map(|u| u.cost).sum();

        Self {
            router: RouterStats {
                total_requests: counters.total_requests(),
                successful_requests: counters.successful_requests(),
                failed_requests: counters.failed_requests(),
                success_rate: counters.success_rate(),
            },
            providers,
            usage: UsageSnapshot {
                uptime_seconds: counters.uptime_seconds(),
                total_cost,
                providers: usage_providers,
            },
        }
    }
}
