//! Configuration module for the RPC router
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`RPC_ROUTER_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use rpc_router::config::RouterConfig;
//!
//! let toml = r#"
//! [[providers]]
//! name = "primary"
//! priority = 1
//!
//! [routing]
//! policy = "health_first"
//! "#;
//! let config: RouterConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.providers.len(), 1);
//! ```

pub mod error;
pub mod logging;
pub mod provider;
pub mod routing;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::ProviderConfig;
pub use routing::RoutingConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the router.
///
/// Enumerates the upstream providers and embeds the routing policy,
/// health thresholds, and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Static provider definitions
    pub providers: Vec<ProviderConfig>,
    /// Routing policy and health thresholds
    pub routing: RoutingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl RouterConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports RPC_ROUTER_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(policy) = std::env::var("RPC_ROUTER_POLICY") {
            if let Ok(p) = policy.parse() {
                self.routing.policy = p;
            }
        }
        if let Ok(interval) = std::env::var("RPC_ROUTER_HEALTH_CHECK_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.routing.health_check_interval_seconds = i;
            }
        }

        if let Ok(level) = std::env::var("RPC_ROUTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("RPC_ROUTER_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if provider.name.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].name", i),
                    message: "name cannot be empty".to_string(),
                });
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].name", i),
                    message: format!("duplicate provider name '{}'", provider.name),
                });
            }
            if provider.cost_per_request < 0.0 {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].cost_per_request", i),
                    message: "cost cannot be negative".to_string(),
                });
            }
            if provider.timeout_seconds == 0 {
                return Err(ConfigError::Validation {
                    field: format!("providers[{}].timeout_seconds", i),
                    message: "timeout must be non-zero".to_string(),
                });
            }
        }

        self.routing.validate()
    }
}
