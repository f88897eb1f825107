//! Progressive nearest-POI search.
//!
//! Walks the `(transport, time)` escalation list smallest-first. Each tier
//! requests a reachable bbox, searches POIs inside it, and locally filters
//! to those whose estimated travel time fits the tier's budget — the bbox
//! is a superset of the true isochrone, so the local filter corrects for
//! the overshoot. The first tier with survivors wins.

use serde_json::json;

use wayfind_core::poi::{Poi, PoiCategory};
use wayfind_core::{Location, UseCaseError, UseCaseOutput, UseCaseResult};
use wayfind_places::PoiSearch;

use crate::strategy::{self, SearchStrategy};
use crate::Collaborators;

use super::{annotate_from, isochrone_failed, poi_search_failed, require_location, sort_by_distance};

/// POIs fetched per tier before local filtering.
const TIER_FETCH_LIMIT: usize = 30;

/// Alternatives returned beside the winner.
const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone)]
pub struct FindNearestRequest {
    pub user: Option<Location>,
    pub category: PoiCategory,
    pub cuisine: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NearestPoi {
    pub best: Poi,
    pub alternatives: Vec<Poi>,
    pub strategy: SearchStrategy,
}

/// Finds the closest POI of a category, escalating the search envelope
/// until something is reachable.
///
/// # Errors
///
/// `NO_RESULTS_FOUND` only after every escalation tier is exhausted;
/// input-validation codes for a missing or invalid user location.
pub async fn find_nearest_poi(
    collaborators: &Collaborators,
    request: &FindNearestRequest,
) -> UseCaseResult<NearestPoi> {
    let user = require_location(request.user.as_ref(), "user_location")?;
    let origin = user.coord();

    let strategies = strategy::nearest_escalation();
    let found = strategy::first_non_empty(&strategies, |tier| async move {
        probe_tier(collaborators, origin, request, tier).await
    })
    .await;

    let Some((winning, mut pois)) = found else {
        return Err(UseCaseError::no_results(format!(
            "no {} reachable within any search tier",
            request.category
        ))
        .with_details(json!({ "strategies_tried": strategies.len() })));
    };

    sort_by_distance(&mut pois);
    let best = pois.remove(0);
    pois.truncate(MAX_ALTERNATIVES);

    Ok(UseCaseOutput::with_metadata(
        NearestPoi {
            best,
            alternatives: pois,
            strategy: winning,
        },
        json!({ "strategy": winning }),
    ))
}

/// One escalation tier: reachable bbox → POI search → local time filter.
async fn probe_tier(
    collaborators: &Collaborators,
    origin: wayfind_core::geo::Coord,
    request: &FindNearestRequest,
    tier: SearchStrategy,
) -> Result<Vec<Poi>, UseCaseError> {
    let isochrone = collaborators
        .routing
        .get_isochrone(origin, tier.mode, &[tier.range_seconds()])
        .await
        .map_err(|e| isochrone_failed(&e))?;

    let pois = collaborators
        .pois
        .find_pois(&PoiSearch {
            category: request.category,
            bounds: isochrone.bbox,
            cuisine: request.cuisine.clone(),
            max_results: TIER_FETCH_LIMIT,
        })
        .await
        .map_err(|e| poi_search_failed(&e))?;

    let mut reachable: Vec<Poi> = pois
        .into_iter()
        .map(|mut poi| {
            annotate_from(origin, tier.mode, &mut poi);
            poi
        })
        .filter(|poi| poi.travel_time_min.is_some_and(|t| t <= tier.minutes))
        .collect();
    sort_by_distance(&mut reachable);
    Ok(reachable)
}
