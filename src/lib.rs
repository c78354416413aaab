//! Resilient multi-provider RPC router
//!
//! Accepts a logical `(method, params)` call, ranks the configured
//! upstream providers by a configurable policy, executes the call with
//! transparent failover, and continuously tracks provider health so
//! future routing decisions avoid degraded providers.
//!
//! Providers are supplied by the caller as [`provider::RpcProvider`]
//! capabilities; the router never constructs transports itself.

pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod registry;
pub mod routing;

pub use config::{ConfigError, RouterConfig};
pub use health::HealthMonitor;
pub use metrics::{HealthSnapshot, MetricsSnapshot};
pub use provider::{ProviderError, RpcProvider};
pub use registry::{ProviderRegistry, ProviderView};
pub use routing::{Router, RoutingError, RoutingPolicy};
