//! Routing and health-threshold configuration

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::routing::RoutingPolicy;

/// Router-wide routing configuration.
///
/// Covers both the ranking policy and the health thresholds that drive
/// circuit-breaker transitions. All durations are whole seconds, matching
/// the TOML surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Provider ranking policy
    pub policy: RoutingPolicy,
    /// Seconds between health monitor cycles
    pub health_check_interval_seconds: u64,
    /// Timeout for each health probe
    pub health_check_timeout_seconds: u64,
    /// Error rate above which a provider is considered degraded, in [0,1]
    pub max_error_rate: f64,
    /// Average latency above which a provider is considered degraded
    pub max_latency_ms: u32,
    /// Consecutive call failures before the breaker opens
    pub circuit_breaker_threshold: u32,
    /// Seconds an open breaker cools down before a half-open probe
    pub circuit_breaker_timeout_seconds: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            policy: RoutingPolicy::HealthFirst,
            health_check_interval_seconds: 30,
            health_check_timeout_seconds: 5,
            max_error_rate: 0.5,
            max_latency_ms: 5_000,
            circuit_breaker_threshold: 3,
            circuit_breaker_timeout_seconds: 60,
        }
    }
}

impl RoutingConfig {
    /// Validate threshold ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.max_error_rate) {
            return Err(ConfigError::Validation {
                field: "routing.max_error_rate".to_string(),
                message: format!("must be in [0, 1], got {}", self.max_error_rate),
            });
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(ConfigError::Validation {
                field: "routing.circuit_breaker_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.health_check_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "routing.health_check_interval_seconds".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.health_check_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "routing.health_check_timeout_seconds".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_config_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.policy, RoutingPolicy::HealthFirst);
        assert_eq!(config.circuit_breaker_threshold, 3);
        assert_eq!(config.circuit_breaker_timeout_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn routing_policy_serde_in_config() {
        let toml = r#"policy = "latency_based""#;
        let config: RoutingConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.policy, RoutingPolicy::LatencyBased);
    }

    #[test]
    fn rejects_error_rate_out_of_range() {
        let config = RoutingConfig {
            max_error_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field.contains("max_error_rate")
        ));
    }

    #[test]
    fn rejects_zero_breaker_threshold() {
        let config = RoutingConfig {
            circuit_breaker_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. })
                if field.contains("circuit_breaker_threshold")
        ));
    }

    #[test]
    fn rejects_zero_probe_interval() {
        let config = RoutingConfig {
            health_check_interval_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
