//! Multi-step plan executor.
//!
//! Two plan shapes, selected by which secondary entity is present: a
//! compound anchor-relative search (`secondary_poi` set) and a
//! route-with-stopover search (`destination` set). Each step passes its
//! intermediate data to the next; steps with a defined degraded mode
//! (matrix sort, stopover legs) fall back rather than aborting the plan.

use serde_json::json;

use wayfind_core::geo::Coord;
use wayfind_core::poi::Poi;
use wayfind_core::query::{ClassifiedQuery, QueryIntent};
use wayfind_core::{Location, TransportMode, UseCaseError, UseCaseOutput, UseCaseResult};

use crate::result::AgentResult;
use crate::strategy;
use crate::usecases::enroute::{find_poi_enroute, EnrouteRequest};
use crate::usecases::geocode::GeocodeContext;
use crate::usecases::near_poi::{find_anchor, search_near_anchor};
use crate::Collaborators;

/// Largest acceptable stopover detour when the query does not bound it.
const DEFAULT_MAX_DETOUR_MIN: f64 = 15.0;

/// Candidates carried out of the near-anchor search.
const NEAR_POI_MAX_RESULTS: usize = 10;

pub struct MultiStepAgent;

impl MultiStepAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes a multi-step plan.
    ///
    /// # Errors
    ///
    /// `MISSING_REQUIRED_FIELD` when the user location or the entity that
    /// selects the plan shape is absent; otherwise whatever the underlying
    /// use cases return.
    pub async fn execute(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: Option<&Location>,
        geocode_context: &GeocodeContext,
    ) -> UseCaseResult<AgentResult> {
        let user = user
            .ok_or_else(|| UseCaseError::missing_field("user_location"))?
            .clone();

        if query.entities.secondary_poi.is_some() && query.intent != QueryIntent::FindEnroute {
            return self.near_poi_plan(collaborators, query, user).await;
        }
        if query.entities.destination.is_some() {
            return self
                .enroute_plan(collaborators, query, user, geocode_context)
                .await;
        }
        Err(UseCaseError::missing_field("secondary_poi or destination"))
    }

    /// Anchor search → escalating near-anchor search → matrix-refined sort.
    async fn near_poi_plan(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: Location,
    ) -> UseCaseResult<AgentResult> {
        let primary = query
            .entities
            .primary_poi
            .ok_or_else(|| UseCaseError::missing_field("primary_poi"))?;
        let secondary = query
            .entities
            .secondary_poi
            .ok_or_else(|| UseCaseError::missing_field("secondary_poi"))?;
        user.validate()?;

        let mut reasoning = vec![format!("locating the nearest {secondary} as the anchor")];
        let anchor = find_anchor(collaborators, &user, secondary).await?.data;
        reasoning.push(format!(
            "anchor: {} ({:.0} m from you)",
            anchor.name,
            anchor.distance_m.unwrap_or(0.0)
        ));

        let strategies = strategy::near_anchor_escalation(query.entities.time_constraint_min);
        let user_coord = user.coord();
        let cuisine = query.entities.cuisine.clone();
        let found = strategy::first_non_empty(&strategies, |tier| {
            let cuisine = cuisine.clone();
            let anchor = &anchor;
            async move {
                search_near_anchor(
                    collaborators,
                    anchor,
                    user_coord,
                    primary,
                    cuisine.as_deref(),
                    tier,
                    NEAR_POI_MAX_RESULTS,
                )
                .await
            }
        })
        .await;

        let Some((winning, candidates)) = found else {
            // Anchor exists but nothing of the primary category around it at
            // any tier; a normal empty outcome, not an error.
            let result = AgentResult {
                summary: format!("Found {}, but no {primary} nearby", anchor.name),
                pois: vec![anchor],
                routes: Vec::new(),
                tools_used: vec![
                    "get_isochrone".to_string(),
                    "find_pois".to_string(),
                ],
                reasoning,
            };
            return Ok(UseCaseOutput::with_metadata(
                result,
                json!({ "strategies_tried": strategies.len() }),
            ));
        };
        reasoning.push(format!("found {} candidate(s) using {winning}", candidates.len()));

        let (candidates, matrix_refined) =
            refine_with_matrix(collaborators, &anchor, candidates, winning.mode).await;
        if matrix_refined {
            reasoning.push("ordered candidates by matrix travel time from the anchor".to_string());
        } else {
            reasoning
                .push("matrix unavailable; ordered by straight-line estimate instead".to_string());
        }

        let best_name = candidates.first().map_or_else(String::new, |p| p.name.clone());
        let result = AgentResult {
            summary: format!(
                "Best {primary} near {}: {best_name} ({} option(s))",
                anchor.name,
                candidates.len()
            ),
            pois: std::iter::once(anchor.clone()).chain(candidates).collect(),
            routes: Vec::new(),
            tools_used: vec![
                "get_isochrone".to_string(),
                "find_pois".to_string(),
                "get_matrix".to_string(),
            ],
            reasoning,
        };
        Ok(UseCaseOutput::with_metadata(
            result,
            json!({ "strategy": winning, "matrix_refined": matrix_refined }),
        ))
    }

    /// Geocode → direct route → corridor candidates → stopover optimization.
    async fn enroute_plan(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: Location,
        geocode_context: &GeocodeContext,
    ) -> UseCaseResult<AgentResult> {
        let destination = query
            .entities
            .destination
            .clone()
            .ok_or_else(|| UseCaseError::missing_field("destination"))?;
        let category = query
            .entities
            .primary_poi
            .ok_or_else(|| UseCaseError::missing_field("primary_poi"))?;
        let mode = query.entities.transport.unwrap_or(TransportMode::Walking);

        let found = find_poi_enroute(
            collaborators,
            &EnrouteRequest {
                user: Some(user),
                destination,
                category,
                cuisine: query.entities.cuisine.clone(),
                mode,
                time_budget_min: query.entities.time_constraint_min,
                max_detour_min: DEFAULT_MAX_DETOUR_MIN,
            },
            geocode_context,
        )
        .await?;
        let metadata = found.metadata.clone();
        let data = found.data;

        let destination_name = data
            .destination
            .display_name
            .clone()
            .unwrap_or_else(|| "your destination".to_string());
        let mut reasoning = vec![
            format!("resolved destination: {destination_name}"),
            format!(
                "direct route: {:.0} min {mode}",
                data.direct_route.duration_min
            ),
        ];

        let summary = match (&data.stopover, data.detour_min) {
            (Some(stop), Some(detour)) => {
                reasoning.push(format!(
                    "best stopover adds {detour:.0} min over the direct route"
                ));
                format!(
                    "Stop at {} on the way to {destination_name} (+{detour:.0} min)",
                    stop.name
                )
            }
            (Some(stop), None) => format!(
                "Closest {category} along the route: {} (detour not optimized)",
                stop.name
            ),
            (None, _) => format!("No good {category} stop on the way to {destination_name}"),
        };

        let mut routes = vec![data.direct_route];
        routes.extend(data.legs);
        let pois = data.stopover.into_iter().collect();

        let result = AgentResult {
            summary,
            pois,
            routes,
            tools_used: vec![
                "geocode".to_string(),
                "get_directions".to_string(),
                "find_pois".to_string(),
                "optimize".to_string(),
            ],
            reasoning,
        };
        Ok(UseCaseOutput::with_metadata(result, metadata))
    }
}

impl Default for MultiStepAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-orders candidates by a duration/distance matrix from the anchor.
///
/// Matrix failure keeps the straight-line ordering; the boolean reports
/// which path was taken.
async fn refine_with_matrix(
    collaborators: &Collaborators,
    anchor: &Poi,
    mut candidates: Vec<Poi>,
    mode: TransportMode,
) -> (Vec<Poi>, bool) {
    if candidates.is_empty() {
        return (candidates, false);
    }

    let mut locations: Vec<Coord> = Vec::with_capacity(candidates.len() + 1);
    locations.push(anchor.coord());
    locations.extend(candidates.iter().map(Poi::coord));

    match collaborators
        .routing
        .get_matrix(&locations, mode, &["duration", "distance"])
        .await
    {
        Ok(matrix) => {
            let from_anchor = matrix.durations.first();
            let dist_row = matrix.distances.first();
            for (index, poi) in candidates.iter_mut().enumerate() {
                if let Some(duration) = from_anchor.and_then(|row| row.get(index + 1)).copied().flatten()
                {
                    poi.travel_time_from_anchor_min = Some(duration / 60.0);
                }
                if let Some(distance) = dist_row.and_then(|row| row.get(index + 1)).copied().flatten()
                {
                    poi.distance_from_anchor_m = Some(distance);
                }
            }
            candidates.sort_by(|a, b| {
                let ta = a.travel_time_from_anchor_min.unwrap_or(f64::INFINITY);
                let tb = b.travel_time_from_anchor_min.unwrap_or(f64::INFINITY);
                ta.partial_cmp(&tb).unwrap_or(std::cmp::Ordering::Equal)
            });
            (candidates, true)
        }
        Err(e) => {
            tracing::warn!(error = %e, "matrix call failed, keeping estimated ordering");
            (candidates, false)
        }
    }
}
