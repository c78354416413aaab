//! Pure ranking of eligible providers per routing policy

use std::sync::Arc;

use super::RoutingPolicy;
use crate::registry::ProviderRecord;

/// Sort key loaded once per record, so the ordering never sees a
/// half-updated record while the dispatcher mutates counters concurrently.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    unhealthy: bool,
    error_rate: f64,
    latency_ms: u32,
    cost: f64,
    priority: i32,
}

fn snapshot_key(record: &ProviderRecord) -> RankKey {
    RankKey {
        unhealthy: !record.is_healthy(),
        error_rate: record.error_rate(),
        latency_ms: record.latency_ms(),
        cost: record.cost_per_request,
        priority: record.priority,
    }
}

/// Order the eligible providers for one call's attempt sequence,
/// most-preferred first.
///
/// Disabled providers are excluded. Unhealthy providers are deprioritized
/// but never excluded: if every provider is marked unhealthy the call
/// still walks all of them instead of deadlocking. Ties fall back to the
/// input order (the registration order), since the sorts are stable.
///
/// `round_robin_seq` selects the primary for [`RoutingPolicy::RoundRobin`];
/// the other policies ignore it. The function never mutates the records.
pub fn rank(
    records: &[Arc<ProviderRecord>],
    policy: RoutingPolicy,
    round_robin_seq: u64,
) -> Vec<Arc<ProviderRecord>> {
    let eligible: Vec<Arc<ProviderRecord>> = records
        .iter()
        .filter(|record| record.is_enabled())
        .map(Arc::clone)
        .collect();

    if eligible.is_empty() {
        return eligible;
    }

    match policy {
        RoutingPolicy::RoundRobin => {
            let start = (round_robin_seq % eligible.len() as u64) as usize;
            let mut ordered = Vec::with_capacity(eligible.len());
            ordered.push(Arc::clone(&eligible[start]));
            ordered.extend(
                eligible
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != start)
                    .map(|(_, record)| Arc::clone(record)),
            );
            ordered
        }
        _ => {
            let mut keyed: Vec<(RankKey, Arc<ProviderRecord>)> = eligible
                .into_iter()
                .map(|record| (snapshot_key(&record), record))
                .collect();

            match policy {
                RoutingPolicy::HealthFirst => keyed.sort_by(|(a, _), (b, _)| {
                    a.unhealthy
                        .cmp(&b.unhealthy)
                        .then(a.error_rate.total_cmp(&b.error_rate))
                        .then(a.priority.cmp(&b.priority))
                }),
                RoutingPolicy::LatencyBased => keyed.sort_by(|(a, _), (b, _)| {
                    a.unhealthy
                        .cmp(&b.unhealthy)
                        .then(a.latency_ms.cmp(&b.latency_ms))
                        .then(a.priority.cmp(&b.priority))
                }),
                RoutingPolicy::CostBased => keyed.sort_by(|(a, _), (b, _)| {
                    a.unhealthy
                        .cmp(&b.unhealthy)
                        .then(a.cost.total_cmp(&b.cost))
                        .then(a.priority.cmp(&b.priority))
                }),
                RoutingPolicy::RoundRobin => unreachable!("handled above"),
            }

            keyed.into_iter().map(|(_, record)| record).collect()
        }
    }
}
