use super::*;
use crate::config::{ProviderConfig, RoutingConfig};
use crate::provider::{ProviderError, RpcProvider};
use crate::registry::ProviderRegistry;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider whose health probes follow a script; calls always succeed.
struct ScriptedProvider {
    health: Mutex<VecDeque<Result<bool, ProviderError>>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<bool, ProviderError>>) -> Self {
        Self {
            health: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl RpcProvider for ScriptedProvider {
    async fn call(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
        Ok(Value::Null)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        self.health
            .lock()
            .expect("health script lock")
            .pop_front()
            .unwrap_or(Ok(true))
    }
}

fn provider_config(name: &str) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        priority: 1,
        enabled: true,
        cost_per_request: 0.0,
        timeout_seconds: 10,
    }
}

fn registry_with_script(script: Vec<Result<bool, ProviderError>>) -> Arc<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    registry
        .register(
            &provider_config("primary"),
            Arc::new(ScriptedProvider::new(script)),
        )
        .unwrap();
    Arc::new(registry)
}

fn routing_config(breaker_timeout_seconds: u64) -> RoutingConfig {
    RoutingConfig {
        circuit_breaker_timeout_seconds: breaker_timeout_seconds,
        ..Default::default()
    }
}

#[test]
fn circuit_state_closed_by_default() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    assert_eq!(
        circuit_state(&record, Duration::from_secs(60)),
        CircuitState::Closed
    );
}

#[test]
fn circuit_state_open_then_half_open() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    record.open_circuit();

    assert_eq!(
        circuit_state(&record, Duration::from_secs(60)),
        CircuitState::Open
    );
    // Zero cooldown: any open breaker is immediately half-open
    assert_eq!(
        circuit_state(&record, Duration::from_secs(0)),
        CircuitState::HalfOpen
    );
}

#[test]
fn degradation_requires_samples() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    assert_eq!(degradation_reason(&record, &routing_config(60)), None);
}

#[test]
fn degradation_detects_high_error_rate() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();

    for _ in 0..9 {
        record.record_failure();
    }
    record.record_success(10);

    match degradation_reason(&record, &routing_config(60)) {
        Some(DegradationReason::ErrorRate(rate)) => assert!(rate > 0.5),
        other => panic!("expected error-rate degradation, got {:?}", other),
    }
}

#[test]
fn degradation_detects_high_latency() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    record.record_success(60_000);

    match degradation_reason(&record, &routing_config(60)) {
        Some(DegradationReason::Latency(ms)) => assert!(ms > 5_000),
        other => panic!("expected latency degradation, got {:?}", other),
    }
}

#[tokio::test]
async fn probe_maps_reported_unhealthy() {
    let registry = registry_with_script(vec![Ok(false)]);
    let record = registry.get("primary").unwrap();
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));

    let result = monitor.probe(&record).await;
    assert!(matches!(
        result,
        ProbeResult::Failure {
            error: HealthCheckError::Unhealthy
        }
    ));
}

#[tokio::test]
async fn probe_maps_transport_failure() {
    let registry = registry_with_script(vec![Err(ProviderError::Transport(
        "connection refused".to_string(),
    ))]);
    let record = registry.get("primary").unwrap();
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));

    let result = monitor.probe(&record).await;
    assert!(matches!(
        result,
        ProbeResult::Failure {
            error: HealthCheckError::Failed(_)
        }
    ));
}

#[test]
fn failed_probe_opens_closed_breaker() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));

    monitor.apply_result(
        &record,
        &ProbeResult::Failure {
            error: HealthCheckError::Unhealthy,
        },
    );

    assert!(!record.is_healthy());
    assert!(record.circuit_open_for().is_some());
    assert!(record.last_health_check().is_some());
}

#[test]
fn successful_probe_keeps_clean_breaker_closed() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));

    monitor.apply_result(&record, &ProbeResult::Success { latency_ms: 5 });

    assert!(record.is_healthy());
}

#[test]
fn successful_probe_opens_breaker_on_degraded_stats() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    for _ in 0..9 {
        record.record_failure();
    }
    record.record_success(10);

    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));
    monitor.apply_result(&record, &ProbeResult::Success { latency_ms: 5 });

    assert!(!record.is_healthy());
}

#[test]
fn open_breaker_ignores_probe_outcomes_while_cooling() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    record.open_circuit();

    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(3600));
    monitor.apply_result(&record, &ProbeResult::Success { latency_ms: 5 });

    assert!(!record.is_healthy(), "success during cooldown must not close");
}

#[test]
fn half_open_probe_success_closes_breaker() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    record.record_failure();
    record.open_circuit();

    // Zero cooldown puts the breaker straight into half-open
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(0));
    monitor.apply_result(&record, &ProbeResult::Success { latency_ms: 5 });

    assert!(record.is_healthy());
    assert_eq!(record.consecutive_failures(), 0);
    assert!(record.circuit_open_for().is_none());
}

#[test]
fn half_open_probe_failure_restarts_cooldown() {
    let registry = registry_with_script(vec![]);
    let record = registry.get("primary").unwrap();
    record.open_circuit();

    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(0));
    monitor.apply_result(
        &record,
        &ProbeResult::Failure {
            error: HealthCheckError::Unhealthy,
        },
    );

    assert!(!record.is_healthy());
    let open_for = record.circuit_open_for().expect("breaker must stay open");
    assert!(open_for < Duration::from_secs(1));
}

#[tokio::test]
async fn check_all_providers_skips_disabled() {
    let registry = registry_with_script(vec![Ok(true)]);
    registry.set_enabled("primary", false).unwrap();

    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));
    let results = monitor.check_all_providers().await;

    assert!(results.is_empty());
    let record = registry.get("primary").unwrap();
    assert!(record.last_health_check().is_none());
}

#[tokio::test]
async fn check_all_providers_applies_results() {
    let registry = registry_with_script(vec![Ok(false)]);
    let monitor = HealthMonitor::new(Arc::clone(&registry), routing_config(60));

    let results = monitor.check_all_providers().await;

    assert_eq!(results.len(), 1);
    assert!(!registry.get("primary").unwrap().is_healthy());
}
