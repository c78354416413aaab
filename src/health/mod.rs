//! Health monitoring module.
//!
//! Runs a background loop that periodically probes every provider and
//! drives circuit-breaker transitions independently of call traffic.
//! Probes use their own timeout and are never subject to caller
//! cancellation.

mod error;
mod state;

#[cfg(test)]
mod tests;

pub use error::*;
pub use state::*;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RoutingConfig;
use crate::registry::{ProviderRecord, ProviderRegistry};

/// Background service that periodically probes provider health.
pub struct HealthMonitor {
    /// Records shared with the dispatcher
    registry: Arc<ProviderRegistry>,
    /// Probe cadence, probe timeout, breaker windows, degradation ceilings
    config: RoutingConfig,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ProviderRegistry>, config: RoutingConfig) -> Self {
        Self { registry, config }
    }

    fn breaker_timeout(&self) -> Duration {
        Duration::from_secs(self.config.circuit_breaker_timeout_seconds)
    }

    /// Probe a single provider with the configured probe timeout.
    pub async fn probe(&self, record: &ProviderRecord) -> ProbeResult {
        let timeout = Duration::from_secs(self.config.health_check_timeout_seconds);
        let start = Instant::now();

        match tokio::time::timeout(timeout, record.handle().health_check()).await {
            Ok(Ok(true)) => {
                let latency_ms = start.elapsed().as_millis() as u32;
                metrics::histogram!(
                    "rpc_router_probe_duration_seconds",
                    "provider" => record.name.clone()
                )
                .record(latency_ms as f64 / 1000.0);
                ProbeResult::Success { latency_ms }
            }
            Ok(Ok(false)) => ProbeResult::Failure {
                error: HealthCheckError::Unhealthy,
            },
            Ok(Err(e)) => ProbeResult::Failure {
                error: HealthCheckError::Failed(e.to_string()),
            },
            Err(_) => ProbeResult::Failure {
                error: HealthCheckError::Timeout(self.config.health_check_timeout_seconds),
            },
        }
    }

    /// Apply a probe result to the record's breaker state.
    ///
    /// Transitions depend on the breaker position at apply time:
    /// - Closed: a failed probe opens the breaker; a successful probe
    ///   still opens it when the cumulative statistics are degraded.
    /// - Open (cooling down): no transition, the probe only refreshes the
    ///   last-checked timestamp.
    /// - HalfOpen: a successful probe closes the breaker; a failed probe
    ///   re-opens it and restarts the cooldown window.
    pub fn apply_result(&self, record: &ProviderRecord, result: &ProbeResult) {
        record.mark_health_checked();

        match circuit_state(record, self.breaker_timeout()) {
            CircuitState::Closed => match result {
                ProbeResult::Success { .. } => {
                    if let Some(reason) = degradation_reason(record, &self.config) {
                        record.open_circuit();
                        tracing::warn!(
                            provider = %record.name,
                            %reason,
                            "circuit opened on degraded statistics"
                        );
                    }
                }
                ProbeResult::Failure { error } => {
                    record.open_circuit();
                    tracing::warn!(
                        provider = %record.name,
                        error = %error,
                        "circuit opened after failed probe"
                    );
                }
            },
            CircuitState::Open => {}
            CircuitState::HalfOpen => match result {
                ProbeResult::Success { .. } => {
                    record.close_circuit();
                    tracing::info!(provider = %record.name, "circuit closed after successful probe");
                }
                ProbeResult::Failure { error } => {
                    record.open_circuit();
                    tracing::debug!(
                        provider = %record.name,
                        error = %error,
                        "half-open probe failed, cooldown restarted"
                    );
                }
            },
        }
    }

    /// Probe every enabled provider once and apply the results.
    pub async fn check_all_providers(&self) -> Vec<(String, ProbeResult)> {
        let records = self.registry.records();
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            if !record.is_enabled() {
                continue;
            }
            let result = self.probe(&record).await;
            self.apply_result(&record, &result);
            results.push((record.name.clone(), result));
        }

        crate::metrics::update_provider_gauges(&self.registry);

        results
    }

    /// Start the health monitor background task.
    /// Returns a JoinHandle that resolves when the monitor stops.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(
                self.config.health_check_interval_seconds,
            ));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_seconds = self.config.health_check_interval_seconds,
                "health monitor started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("health monitor shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let results = self.check_all_providers().await;
                        tracing::debug!(
                            providers_checked = results.len(),
                            "health check cycle completed"
                        );
                    }
                }
            }
        })
    }
}
