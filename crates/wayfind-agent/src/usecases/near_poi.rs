//! Anchor-relative compound search.
//!
//! First locate the nearest POI of the landmark (secondary) category, then
//! search the wanted (primary) category around it. Candidates carry both
//! anchor-relative and user-relative measurements; the matrix refinement in
//! the multi-step agent replaces the estimates when it succeeds.

use serde_json::json;

use wayfind_core::geo::{estimate_travel_time_min, haversine_distance_m, point_in_isochrone, Coord};
use wayfind_core::poi::{Poi, PoiCategory};
use wayfind_core::{Location, TransportMode, UseCaseError, UseCaseOutput, UseCaseResult};
use wayfind_places::PoiSearch;

use crate::strategy::{self, SearchStrategy};
use crate::Collaborators;

use super::{annotate_from, isochrone_failed, poi_search_failed, require_location, sort_by_distance};

/// Search envelope for locating the anchor itself.
const ANCHOR_TIER_MINUTES: f64 = 30.0;

/// Candidates fetched around the anchor before filtering.
const FETCH_LIMIT: usize = 30;

#[derive(Debug, Clone)]
pub struct NearPoiRequest {
    pub user: Option<Location>,
    /// What the user wants to find.
    pub primary: PoiCategory,
    /// The landmark category used as the spatial reference.
    pub secondary: PoiCategory,
    pub mode: TransportMode,
    /// Search radius around the anchor, minutes.
    pub minutes: f64,
    pub cuisine: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct NearPoiFound {
    pub anchor: Poi,
    pub candidates: Vec<Poi>,
}

/// Finds the nearest anchor of the landmark category.
///
/// A 30-minute walking envelope is tried first, then driving.
///
/// # Errors
///
/// `NO_RESULTS_FOUND` when neither envelope contains the landmark.
pub async fn find_anchor(
    collaborators: &Collaborators,
    user: &Location,
    secondary: PoiCategory,
) -> UseCaseResult<Poi> {
    let origin = user.coord();
    let tiers = [
        SearchStrategy::new(TransportMode::Walking, ANCHOR_TIER_MINUTES),
        SearchStrategy::new(TransportMode::Driving, ANCHOR_TIER_MINUTES),
    ];

    let found = strategy::first_non_empty(&tiers, |tier| async move {
        let isochrone = collaborators
            .routing
            .get_isochrone(origin, tier.mode, &[tier.range_seconds()])
            .await
            .map_err(|e| isochrone_failed(&e))?;
        let pois = collaborators
            .pois
            .find_pois(&PoiSearch {
                category: secondary,
                bounds: isochrone.bbox,
                cuisine: None,
                max_results: FETCH_LIMIT,
            })
            .await
            .map_err(|e| poi_search_failed(&e))?;
        let mut pois: Vec<Poi> = pois
            .into_iter()
            .map(|mut poi| {
                annotate_from(origin, tier.mode, &mut poi);
                poi
            })
            .collect();
        sort_by_distance(&mut pois);
        Ok(pois)
    })
    .await;

    let Some((tier, mut pois)) = found else {
        return Err(UseCaseError::no_results(format!(
            "no {secondary} found to anchor the search"
        )));
    };

    Ok(UseCaseOutput::with_metadata(
        pois.remove(0),
        json!({ "anchor_strategy": tier }),
    ))
}

/// Searches the primary category around an anchor with one `(mode, minutes)`
/// envelope: isochrone at the anchor, bbox search, polygon filter, then
/// anchor- and user-relative annotation.
///
/// # Errors
///
/// `ISOCHRONE_FAILED` / `POI_SEARCH_FAILED` on collaborator errors.
pub async fn search_near_anchor(
    collaborators: &Collaborators,
    anchor: &Poi,
    user_origin: Coord,
    primary: PoiCategory,
    cuisine: Option<&str>,
    tier: SearchStrategy,
    max_results: usize,
) -> Result<Vec<Poi>, UseCaseError> {
    let anchor_coord = anchor.coord();
    let isochrone = collaborators
        .routing
        .get_isochrone(anchor_coord, tier.mode, &[tier.range_seconds()])
        .await
        .map_err(|e| isochrone_failed(&e))?;

    let candidates = collaborators
        .pois
        .find_pois(&PoiSearch {
            category: primary,
            bounds: isochrone.bbox,
            cuisine: cuisine.map(ToOwned::to_owned),
            max_results: FETCH_LIMIT,
        })
        .await
        .map_err(|e| poi_search_failed(&e))?;

    let polygon_filtered = !isochrone.polygons.is_empty();
    let mut results: Vec<Poi> = candidates
        .into_iter()
        .filter(|poi| {
            poi.id != anchor.id
                && (!polygon_filtered || point_in_isochrone(poi.coord(), &isochrone))
        })
        .map(|mut poi| {
            let from_anchor = haversine_distance_m(anchor_coord, poi.coord());
            poi.distance_from_anchor_m = Some(from_anchor);
            poi.travel_time_from_anchor_min =
                Some(estimate_travel_time_min(from_anchor, tier.mode));
            poi.distance_m = Some(haversine_distance_m(user_origin, poi.coord()));
            poi
        })
        .collect();

    results.sort_by(|a, b| {
        let da = a.distance_from_anchor_m.unwrap_or(f64::INFINITY);
        let db = b.distance_from_anchor_m.unwrap_or(f64::INFINITY);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(max_results.max(1));
    Ok(results)
}

/// The compound use case: anchor search followed by one around-anchor
/// search at the caller's envelope.
///
/// # Errors
///
/// Validation codes for bad input; `NO_RESULTS_FOUND` when no anchor
/// exists. Zero candidates around a found anchor is a normal outcome.
pub async fn find_pois_near_poi(
    collaborators: &Collaborators,
    request: &NearPoiRequest,
) -> UseCaseResult<NearPoiFound> {
    let user = require_location(request.user.as_ref(), "user_location")?;
    let minutes = super::require_time_constraint(request.minutes)?;

    let anchor = find_anchor(collaborators, user, request.secondary).await?;
    let anchor_meta = anchor.metadata.clone();
    let anchor = anchor.data;

    let candidates = search_near_anchor(
        collaborators,
        &anchor,
        user.coord(),
        request.primary,
        request.cuisine.as_deref(),
        SearchStrategy::new(request.mode, minutes),
        request.max_results,
    )
    .await?;

    Ok(UseCaseOutput::with_metadata(
        NearPoiFound { anchor, candidates },
        json!({
            "anchor": anchor_meta,
            "mode": request.mode,
            "minutes": minutes,
        }),
    ))
}
