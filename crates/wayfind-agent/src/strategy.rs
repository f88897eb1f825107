//! Progressive search strategies.
//!
//! A strategy is one `(transport, minutes)` search envelope. Escalation
//! lists are ordered smallest-first and consumed by [`first_non_empty`], a
//! generic "first strategy that yields results wins" combinator shared by
//! the nearest-POI and near-anchor searches. The lists are static, so every
//! progressive loop is a bounded, non-reentrant iteration.

use std::future::Future;

use serde::Serialize;

use wayfind_core::{TransportMode, UseCaseError};

/// One `(transport, minutes)` search envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchStrategy {
    pub mode: TransportMode,
    pub minutes: f64,
}

impl SearchStrategy {
    #[must_use]
    pub fn new(mode: TransportMode, minutes: f64) -> Self {
        Self { mode, minutes }
    }

    #[must_use]
    pub fn range_seconds(&self) -> u64 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = (self.minutes * 60.0) as u64;
        secs
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}min", self.mode, self.minutes)
    }
}

/// Escalation for "find the nearest X": 10 → 60 minutes, walking and
/// driving alternating at each tier.
#[must_use]
pub fn nearest_escalation() -> Vec<SearchStrategy> {
    let mut strategies = Vec::new();
    for minutes in [10.0, 20.0, 30.0, 60.0] {
        strategies.push(SearchStrategy::new(TransportMode::Walking, minutes));
        strategies.push(SearchStrategy::new(TransportMode::Driving, minutes));
    }
    strategies
}

/// Escalation for searching around an anchor: walking/driving at the
/// caller's constraint, then 30, then 60 minutes, duplicates removed.
#[must_use]
pub fn near_anchor_escalation(constraint_min: Option<f64>) -> Vec<SearchStrategy> {
    let mut tiers: Vec<f64> = Vec::new();
    if let Some(constraint) = constraint_min {
        if constraint > 0.0 {
            tiers.push(constraint);
        }
    }
    for tier in [30.0, 60.0] {
        if !tiers.iter().any(|&t| (t - tier).abs() < f64::EPSILON) {
            tiers.push(tier);
        }
    }

    let mut strategies = Vec::new();
    for minutes in tiers {
        strategies.push(SearchStrategy::new(TransportMode::Walking, minutes));
        strategies.push(SearchStrategy::new(TransportMode::Driving, minutes));
    }
    strategies
}

/// Runs `probe` over `strategies` in order; the first strategy returning a
/// non-empty set wins.
///
/// A probe error is logged and treated as an empty result — the loop moves
/// on to the next strategy rather than aborting the search. Returns `None`
/// when the list is exhausted.
pub async fn first_non_empty<T, F, Fut>(
    strategies: &[SearchStrategy],
    probe: F,
) -> Option<(SearchStrategy, Vec<T>)>
where
    F: Fn(SearchStrategy) -> Fut,
    Fut: Future<Output = Result<Vec<T>, UseCaseError>>,
{
    for &strategy in strategies {
        match probe(strategy).await {
            Ok(results) if !results.is_empty() => {
                tracing::debug!(%strategy, count = results.len(), "strategy yielded results");
                return Some((strategy, results));
            }
            Ok(_) => {
                tracing::debug!(%strategy, "strategy yielded nothing, escalating");
            }
            Err(e) => {
                tracing::warn!(%strategy, error = %e, "strategy probe failed, escalating");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use wayfind_core::ErrorCode;

    #[test]
    fn nearest_escalation_starts_small_and_ends_at_driving_60() {
        let strategies = nearest_escalation();
        assert_eq!(strategies[0], SearchStrategy::new(TransportMode::Walking, 10.0));
        assert_eq!(
            *strategies.last().unwrap(),
            SearchStrategy::new(TransportMode::Driving, 60.0)
        );
        assert_eq!(strategies.len(), 8);
    }

    #[test]
    fn near_anchor_escalation_leads_with_constraint_and_dedupes() {
        let strategies = near_anchor_escalation(Some(15.0));
        assert_eq!(strategies[0], SearchStrategy::new(TransportMode::Walking, 15.0));
        assert_eq!(strategies.len(), 6);

        // A 30-minute constraint collapses into the default tier.
        let strategies = near_anchor_escalation(Some(30.0));
        assert_eq!(strategies.len(), 4);
        assert_eq!(strategies[0].minutes, 30.0);
    }

    #[test]
    fn near_anchor_escalation_without_constraint_has_default_tiers() {
        let strategies = near_anchor_escalation(None);
        assert_eq!(strategies.len(), 4);
        assert_eq!(strategies[0].minutes, 30.0);
    }

    #[tokio::test]
    async fn first_non_empty_stops_at_first_hit() {
        let strategies = nearest_escalation();
        let calls = AtomicUsize::new(0);
        let result = first_non_empty(&strategies, |strategy| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if (strategy.minutes - 20.0).abs() < f64::EPSILON {
                    Ok(vec!["hit"])
                } else {
                    Ok(vec![])
                }
            }
        })
        .await;

        let (winning, hits) = result.unwrap();
        assert_eq!(winning.minutes, 20.0);
        assert_eq!(winning.mode, TransportMode::Walking);
        assert_eq!(hits, vec!["hit"]);
        // Stopped at the third strategy (walking 10, driving 10, walking 20).
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn first_non_empty_skips_failing_strategies() {
        let strategies = nearest_escalation();
        let result = first_non_empty(&strategies, |strategy| async move {
            if strategy.minutes < 60.0 {
                Err(UseCaseError::new(ErrorCode::IsochroneFailed, "tier down"))
            } else {
                Ok(vec![strategy.minutes])
            }
        })
        .await;

        let (winning, _) = result.unwrap();
        assert_eq!(winning.minutes, 60.0);
    }

    #[tokio::test]
    async fn first_non_empty_exhaustion_is_none() {
        let strategies = nearest_escalation();
        let result: Option<(SearchStrategy, Vec<()>)> =
            first_non_empty(&strategies, |_| async { Ok(vec![]) }).await;
        assert!(result.is_none());
    }
}
