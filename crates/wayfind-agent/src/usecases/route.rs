//! Direct-route use case.

use serde_json::json;

use wayfind_core::route::RouteInfo;
use wayfind_core::{Location, TransportMode, UseCaseOutput, UseCaseResult};
use wayfind_routing::normalize::pick_best_route;
use wayfind_routing::RouteOptions;

use crate::Collaborators;

use super::{require_location, routing_failed};

#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub from: Location,
    pub to: Location,
    pub mode: TransportMode,
}

/// Computes the best direct route between two points.
///
/// Asks the routing collaborator for alternatives and keeps the
/// lowest-duration one. Elevation and average speed are derived by the
/// normalizer when the service returns 3-d geometry.
///
/// # Errors
///
/// `INVALID_COORDINATES`/`MISSING_REQUIRED_FIELD` for bad input,
/// `ROUTING_FAILED` when the collaborator errors.
pub async fn get_route(
    collaborators: &Collaborators,
    request: &RouteRequest,
) -> UseCaseResult<RouteInfo> {
    let from = require_location(Some(&request.from), "from")?;
    let to = require_location(Some(&request.to), "to")?;

    let routes = collaborators
        .routing
        .get_directions(
            &[from.coord(), to.coord()],
            request.mode,
            &RouteOptions {
                elevation: true,
                alternatives: true,
            },
        )
        .await
        .map_err(|e| routing_failed(&e))?;

    let alternatives = routes.len();
    let best = pick_best_route(routes)
        .ok_or_else(|| wayfind_core::UseCaseError::no_results("no route found"))?;

    Ok(UseCaseOutput::with_metadata(
        best,
        json!({ "mode": request.mode, "alternatives_considered": alternatives }),
    ))
}
