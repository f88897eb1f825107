//! Time-bounded area search.
//!
//! One isochrone at the caller's exact `(mode, minutes)`, a bbox-scoped POI
//! search as the cheap pre-filter, then the polygon membership test as the
//! authoritative boundary. When the service's polygons are unusable the
//! filter degrades to bbox-only with a metadata warning instead of failing.

use serde_json::json;

use wayfind_core::geo::point_in_isochrone;
use wayfind_core::poi::{Poi, PoiCategory};
use wayfind_core::{Location, TransportMode, UseCaseOutput, UseCaseResult};
use wayfind_places::PoiSearch;

use crate::Collaborators;

use super::{
    annotate_from, isochrone_failed, poi_search_failed, require_location, require_time_constraint,
    sort_by_distance,
};

/// POIs fetched from the bbox before polygon filtering.
const FETCH_LIMIT: usize = 50;

/// Sort order for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Distance,
    /// Rating tags are rare in map data; unrated POIs sort last.
    Rating,
}

#[derive(Debug, Clone)]
pub struct WithinTimeRequest {
    pub user: Option<Location>,
    pub category: PoiCategory,
    pub mode: TransportMode,
    pub minutes: f64,
    pub cuisine: Option<String>,
    pub max_results: usize,
    pub sort: SortKey,
}

/// Finds all POIs of a category reachable within the exact time budget.
///
/// An empty list is a normal outcome. Metadata reports whether the polygon
/// filter ran or the bbox fallback was taken.
///
/// # Errors
///
/// Input-validation codes for bad input; `ISOCHRONE_FAILED` /
/// `POI_SEARCH_FAILED` when a collaborator errors.
pub async fn find_pois_within_time(
    collaborators: &Collaborators,
    request: &WithinTimeRequest,
) -> UseCaseResult<Vec<Poi>> {
    let user = require_location(request.user.as_ref(), "user_location")?;
    let minutes = require_time_constraint(request.minutes)?;
    let origin = user.coord();

    let isochrone = collaborators
        .routing
        .get_isochrone(origin, request.mode, &[to_seconds(minutes)])
        .await
        .map_err(|e| isochrone_failed(&e))?;

    let candidates = collaborators
        .pois
        .find_pois(&PoiSearch {
            category: request.category,
            bounds: isochrone.bbox,
            cuisine: request.cuisine.clone(),
            max_results: FETCH_LIMIT,
        })
        .await
        .map_err(|e| poi_search_failed(&e))?;

    let polygon_filtered = !isochrone.polygons.is_empty();
    let mut warnings: Vec<String> = Vec::new();
    if !polygon_filtered {
        warnings.push("isochrone polygons unavailable; results filtered by bbox only".to_string());
    }

    let mut reachable: Vec<Poi> = candidates
        .into_iter()
        .filter(|poi| !polygon_filtered || point_in_isochrone(poi.coord(), &isochrone))
        .map(|mut poi| {
            annotate_from(origin, request.mode, &mut poi);
            poi
        })
        .collect();

    match request.sort {
        SortKey::Distance => sort_by_distance(&mut reachable),
        SortKey::Rating => sort_by_rating(&mut reachable),
    }
    reachable.truncate(request.max_results.max(1));

    Ok(UseCaseOutput::with_metadata(
        reachable,
        json!({
            "mode": request.mode,
            "minutes": minutes,
            "polygon_filtered": polygon_filtered,
            "warnings": warnings,
        }),
    ))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_seconds(minutes: f64) -> u64 {
    (minutes * 60.0) as u64
}

fn sort_by_rating(pois: &mut [Poi]) {
    pois.sort_by(|a, b| {
        let ra = rating_of(a).unwrap_or(f64::NEG_INFINITY);
        let rb = rating_of(b).unwrap_or(f64::NEG_INFINITY);
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn rating_of(poi: &Poi) -> Option<f64> {
    poi.tags.get("rating").and_then(|r| r.parse::<f64>().ok())
}
