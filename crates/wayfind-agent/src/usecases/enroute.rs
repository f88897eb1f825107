//! Route-with-stopover search.
//!
//! The direct route is computed first and the whole operation fails fast
//! when it alone exceeds the time budget — no POI search is performed in
//! that case. Otherwise candidates inside the route corridor are evaluated
//! by stopover optimization, and the smallest feasible detour wins.

use futures::future::join_all;
use serde_json::json;

use wayfind_core::geo::distance_to_polyline_m;
use wayfind_core::poi::{Poi, PoiCategory};
use wayfind_core::query::Destination;
use wayfind_core::route::RouteInfo;
use wayfind_core::{ErrorCode, Location, TransportMode, UseCaseError, UseCaseOutput, UseCaseResult};
use wayfind_places::PoiSearch;
use wayfind_routing::normalize::pick_best_route;
use wayfind_routing::{OptimizationJob, OptimizationVehicle, RouteOptions};

use crate::Collaborators;

use super::geocode::{geocode_with_fallbacks, GeocodeContext};
use super::{optimization_failed, poi_search_failed, require_location, routing_failed};

/// Meters added around the route bbox before the corridor POI search.
const CORRIDOR_BUFFER_M: f64 = 2_000.0;

/// Maximum perpendicular distance from the route line for a candidate.
const MAX_OFF_ROUTE_M: f64 = 1_500.0;

/// Candidates fetched from the corridor bbox.
const FETCH_LIMIT: usize = 25;

/// Candidates evaluated by stopover optimization.
const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct EnrouteRequest {
    pub user: Option<Location>,
    pub destination: Destination,
    pub category: PoiCategory,
    pub cuisine: Option<String>,
    pub mode: TransportMode,
    /// Total journey budget; the direct route alone must fit inside it.
    pub time_budget_min: Option<f64>,
    /// Largest acceptable detour over the direct route.
    pub max_detour_min: f64,
}

#[derive(Debug, Clone)]
pub struct EnrouteFound {
    pub destination: Location,
    pub direct_route: RouteInfo,
    pub stopover: Option<Poi>,
    /// Extra duration over the direct route for the chosen stopover.
    pub detour_min: Option<f64>,
    /// start→stop and stop→destination legs when a stopover was chosen and
    /// its legs could be routed.
    pub legs: Vec<RouteInfo>,
}

/// Finds the best stopover of a category along the way to a destination.
///
/// Zero corridor candidates, or candidates but none within the detour
/// budget, are normal outcomes with `stopover: None`. When every
/// optimization call fails the nearest raw candidate is returned beside the
/// unoptimized direct route, with a metadata warning.
///
/// # Errors
///
/// - `TIME_CONSTRAINT_EXCEEDED` when the direct route exceeds the budget.
/// - `GEOCODING_FAILED` when the destination cannot be resolved.
/// - `ROUTING_FAILED` when the direct route cannot be computed.
pub async fn find_poi_enroute(
    collaborators: &Collaborators,
    request: &EnrouteRequest,
    geocode_context: &GeocodeContext,
) -> UseCaseResult<EnrouteFound> {
    let user = require_location(request.user.as_ref(), "user_location")?;
    if let Some(budget) = request.time_budget_min {
        super::require_time_constraint(budget)?;
    }

    // Resolve the destination, with progressive geocoding context.
    let destination = match &request.destination {
        Destination::Resolved(location) => {
            location.validate()?;
            location.clone()
        }
        Destination::Text(text) => {
            geocode_with_fallbacks(&collaborators.geocoder, text, geocode_context)
                .await?
                .data
        }
    };

    // Direct route first; everything else hinges on it.
    let routes = collaborators
        .routing
        .get_directions(
            &[user.coord(), destination.coord()],
            request.mode,
            &RouteOptions {
                elevation: false,
                alternatives: true,
            },
        )
        .await
        .map_err(|e| routing_failed(&e))?;
    let direct = pick_best_route(routes)
        .ok_or_else(|| UseCaseError::no_results("no route to destination"))?;

    if let Some(budget) = request.time_budget_min {
        if direct.duration_min > budget {
            return Err(UseCaseError::new(
                ErrorCode::TimeConstraintExceeded,
                format!(
                    "direct route takes {:.0} min, over the {budget:.0} min budget",
                    direct.duration_min
                ),
            )
            .with_details(json!({
                "direct_duration_min": direct.duration_min,
                "budget_min": budget,
            })));
        }
    }

    // Corridor search: route bbox plus a fixed buffer, then a perpendicular
    // distance filter against the actual route line.
    let Some(route_bbox) = direct.bbox() else {
        return Ok(no_stopover(destination, direct, "route geometry unavailable"));
    };
    let corridor = route_bbox.expand_meters(CORRIDOR_BUFFER_M);

    let candidates = collaborators
        .pois
        .find_pois(&PoiSearch {
            category: request.category,
            bounds: corridor,
            cuisine: request.cuisine.clone(),
            max_results: FETCH_LIMIT,
        })
        .await
        .map_err(|e| poi_search_failed(&e))?;

    let mut on_route: Vec<(f64, Poi)> = candidates
        .into_iter()
        .filter_map(|poi| {
            let off_route = distance_to_polyline_m(poi.coord(), &direct.geometry);
            (off_route <= MAX_OFF_ROUTE_M).then_some((off_route, poi))
        })
        .collect();
    on_route.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    on_route.truncate(CANDIDATE_LIMIT);

    if on_route.is_empty() {
        return Ok(no_stopover(destination, direct, "no candidates along the route"));
    }

    // Evaluate candidates independently; the calls are read-only, so they
    // can run concurrently and merge by minimum detour.
    let evaluations = join_all(on_route.iter().enumerate().map(|(index, (_, poi))| {
        evaluate_candidate(collaborators, user, &destination, request.mode, index, poi)
    }))
    .await;

    let mut best: Option<(usize, f64)> = None;
    let mut failures = 0usize;
    for evaluation in &evaluations {
        match evaluation {
            Ok((index, with_stop_min)) => {
                let detour = with_stop_min - direct.duration_min;
                if detour <= request.max_detour_min
                    && best.is_none_or(|(_, best_detour)| detour < best_detour)
                {
                    best = Some((*index, detour));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stopover optimization call failed");
                failures += 1;
            }
        }
    }

    if let Some((index, detour)) = best {
        let stopover = on_route[index].1.clone();
        let legs = stopover_legs(collaborators, user, &stopover, &destination, request.mode).await;
        let legs_warning = legs.is_none();
        let mut metadata = json!({
            "candidates_evaluated": evaluations.len(),
            "detour_min": detour,
            "max_detour_min": request.max_detour_min,
        });
        if legs_warning {
            metadata["warnings"] = json!(["stopover legs could not be routed"]);
        }
        return Ok(UseCaseOutput::with_metadata(
            EnrouteFound {
                destination,
                direct_route: direct,
                stopover: Some(stopover),
                detour_min: Some(detour),
                legs: legs.unwrap_or_default(),
            },
            metadata,
        ));
    }

    if failures == evaluations.len() {
        // Optimizer fully unavailable: degrade to the nearest raw candidate
        // and the direct route, unoptimized.
        let stopover = on_route[0].1.clone();
        return Ok(UseCaseOutput::with_metadata(
            EnrouteFound {
                destination,
                direct_route: direct,
                stopover: Some(stopover),
                detour_min: None,
                legs: Vec::new(),
            },
            json!({
                "warnings": ["stopover optimization unavailable; nearest candidate returned"],
                "candidates_evaluated": evaluations.len(),
            }),
        ));
    }

    Ok(no_stopover(
        destination,
        direct,
        "no candidate within the detour budget",
    ))
}

fn no_stopover(destination: Location, direct: RouteInfo, reason: &str) -> UseCaseOutput<EnrouteFound> {
    UseCaseOutput::with_metadata(
        EnrouteFound {
            destination,
            direct_route: direct,
            stopover: None,
            detour_min: None,
            legs: Vec::new(),
        },
        json!({ "note": reason }),
    )
}

/// One optimization probe: order a single vehicle through start, the
/// candidate job, and the destination; returns total duration in minutes.
async fn evaluate_candidate(
    collaborators: &Collaborators,
    user: &Location,
    destination: &Location,
    mode: TransportMode,
    index: usize,
    poi: &Poi,
) -> Result<(usize, f64), UseCaseError> {
    #[allow(clippy::cast_possible_truncation)]
    let job_id = index as u64 + 1;
    let jobs = [OptimizationJob {
        id: job_id,
        location: [poi.lng, poi.lat],
        service: None,
    }];
    let vehicles = [OptimizationVehicle {
        id: 1,
        profile: mode.routing_profile().to_string(),
        start: [user.lng, user.lat],
        end: [destination.lng, destination.lat],
    }];

    let result = collaborators
        .routing
        .optimize(&jobs, &vehicles)
        .await
        .map_err(|e| optimization_failed(&e))?;

    if result.unassigned.iter().any(|u| u.id == job_id) {
        return Err(UseCaseError::new(
            ErrorCode::OptimizationFailed,
            format!("candidate '{}' could not be scheduled", poi.name),
        ));
    }

    Ok((index, result.total_duration_secs() / 60.0))
}

/// Routes the two legs through the winning stopover. Failures degrade to
/// `None` — the caller keeps the stopover and notes the missing legs.
async fn stopover_legs(
    collaborators: &Collaborators,
    user: &Location,
    stopover: &Poi,
    destination: &Location,
    mode: TransportMode,
) -> Option<Vec<RouteInfo>> {
    let options = RouteOptions::default();
    let first = collaborators
        .routing
        .get_directions(&[user.coord(), stopover.coord()], mode, &options)
        .await
        .ok()
        .and_then(pick_best_route)?;
    let second = collaborators
        .routing
        .get_directions(&[stopover.coord(), destination.coord()], mode, &options)
        .await
        .ok()
        .and_then(pick_best_route)?;
    Some(vec![first, second])
}
