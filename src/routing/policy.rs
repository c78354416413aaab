//! Routing policies for provider selection

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Routing policy determines how eligible providers are ordered for a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Prefer healthy providers, then lowest error rate, then priority
    #[default]
    HealthFirst,

    /// Prefer the lowest observed average latency
    LatencyBased,

    /// Prefer the lowest configured per-request cost
    CostBased,

    /// Rotate the primary provider on every call
    RoundRobin,
}

impl FromStr for RoutingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health_first" => Ok(RoutingPolicy::HealthFirst),
            "latency_based" => Ok(RoutingPolicy::LatencyBased),
            "cost_based" => Ok(RoutingPolicy::CostBased),
            "round_robin" => Ok(RoutingPolicy::RoundRobin),
            _ => Err(format!("Unknown routing policy: {}", s)),
        }
    }
}

impl std::fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingPolicy::HealthFirst => write!(f, "health_first"),
            RoutingPolicy::LatencyBased => write!(f, "latency_based"),
            RoutingPolicy::CostBased => write!(f, "cost_based"),
            RoutingPolicy::RoundRobin => write!(f, "round_robin"),
        }
    }
}
