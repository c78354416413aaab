//! Shared test utilities for router integration and unit tests.
//!
//! Provides scripted in-process providers and builder helpers to reduce
//! duplication across test files. The router consumes the `RpcProvider`
//! trait directly, so no network mocking is involved.

#![allow(dead_code)]

use async_trait::async_trait;
use rpc_router::config::{ProviderConfig, RouterConfig, RoutingConfig};
use rpc_router::provider::{ProviderError, RpcProvider};
use rpc_router::routing::{Router, RoutingPolicy};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Mock Providers
// =============================================================================

/// Fixed behavior for every call against a mock provider.
pub enum Behavior {
    /// Always return this value
    Succeed(Value),
    /// Always fail with a transport error
    Fail,
    /// Pop outcomes from a script; succeed with Null once exhausted
    Script(Mutex<VecDeque<Result<Value, ProviderError>>>),
    /// Sleep for this long before answering (for timeout tests)
    Hang(Duration),
}

/// In-process provider with observable attempt/probe counters.
pub struct MockProvider {
    behavior: Behavior,
    /// Calls attempted against this provider
    pub calls: AtomicU64,
    /// Health probes attempted against this provider
    pub probes: AtomicU64,
    /// What `health_check` reports
    pub health_response: AtomicBool,
}

impl MockProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicU64::new(0),
            probes: AtomicU64::new(0),
            health_response: AtomicBool::new(true),
        })
    }

    pub fn succeeding(result: Value) -> Arc<Self> {
        Self::new(Behavior::Succeed(result))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Behavior::Fail)
    }

    pub fn scripted(outcomes: Vec<Result<Value, ProviderError>>) -> Arc<Self> {
        Self::new(Behavior::Script(Mutex::new(outcomes.into())))
    }

    pub fn hanging(delay: Duration) -> Arc<Self> {
        Self::new(Behavior::Hang(delay))
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> u64 {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcProvider for MockProvider {
    async fn call(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(value) => Ok(value.clone()),
            Behavior::Fail => Err(ProviderError::Transport("simulated outage".to_string())),
            Behavior::Script(script) => script
                .lock()
                .expect("call script lock")
                .pop_front()
                .unwrap_or(Ok(Value::Null)),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Err(ProviderError::Transport("upstream too slow".to_string()))
            }
        }
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if let Behavior::Hang(delay) = &self.behavior {
            tokio::time::sleep(*delay).await;
        }
        Ok(self.health_response.load(Ordering::SeqCst))
    }
}

// =============================================================================
// Config Builders
// =============================================================================

/// Provider config with sensible test defaults.
pub fn provider_config(name: &str, priority: i32) -> ProviderConfig {
    ProviderConfig {
        name: name.to_string(),
        priority,
        enabled: true,
        cost_per_request: 0.0,
        timeout_seconds: 5,
    }
}

/// Routing config with a short breaker threshold for tests.
pub fn routing_config(policy: RoutingPolicy) -> RoutingConfig {
    RoutingConfig {
        policy,
        circuit_breaker_threshold: 3,
        ..Default::default()
    }
}

// =============================================================================
// Router Builders
// =============================================================================

/// Build a router over mock providers, pairing configs with handles.
pub fn build_router(
    routing: RoutingConfig,
    providers: Vec<(ProviderConfig, Arc<MockProvider>)>,
) -> Router {
    let config = RouterConfig {
        providers: providers.iter().map(|(c, _)| c.clone()).collect(),
        routing,
        logging: Default::default(),
    };

    let handles: HashMap<String, Arc<dyn RpcProvider>> = providers
        .into_iter()
        .map(|(c, mock)| (c.name.clone(), mock as Arc<dyn RpcProvider>))
        .collect();

    Router::from_config(config, handles).expect("test router construction")
}

/// Two-provider router: "a" (priority 1) and "b" (priority 2), with the
/// given mocks and policy.
pub fn two_provider_router(
    policy: RoutingPolicy,
    a: Arc<MockProvider>,
    b: Arc<MockProvider>,
) -> Router {
    build_router(
        routing_config(policy),
        vec![
            (provider_config("a", 1), a),
            (provider_config("b", 2), b),
        ],
    )
}

/// A JSON result payload tagged with the provider that served it.
pub fn tagged(name: &str) -> Value {
    json!({ "served_by": name })
}
