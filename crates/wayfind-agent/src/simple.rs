//! Single-step plan executor.
//!
//! Dispatch is purely structural: a present time constraint means a
//! within-time search, an absent one means a nearest search, and the
//! directions intent is its own branch. Anything needing more than one
//! search step belongs to the multi-step agent.

use wayfind_core::query::{ClassifiedQuery, Destination, QueryIntent};
use wayfind_core::{Location, TransportMode, UseCaseError, UseCaseOutput, UseCaseResult};

use crate::result::AgentResult;
use crate::usecases::geocode::{geocode_with_fallbacks, GeocodeContext};
use crate::usecases::nearest::{find_nearest_poi, FindNearestRequest};
use crate::usecases::route::{get_route, RouteRequest};
use crate::usecases::within_time::{find_pois_within_time, SortKey, WithinTimeRequest};
use crate::Collaborators;

/// Results returned by a within-time search.
const WITHIN_TIME_MAX_RESULTS: usize = 10;

pub struct SimpleAgent;

impl SimpleAgent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes a single-step plan.
    ///
    /// # Errors
    ///
    /// `MISSING_REQUIRED_FIELD` when the user location or a required entity
    /// is absent; otherwise whatever the invoked use case returns.
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

        if query.intent == QueryIntent::GetDirections {
            return self.directions(collaborators, query, &user, geocode_context).await;
        }

        let transport = query
            .entities
            .transport
            .unwrap_or(TransportMode::Walking);

        match query.entities.time_constraint_min {
            Some(minutes) => {
                self.within_time(collaborators, query, user, transport, minutes)
                    .await
            }
            None => self.nearest(collaborators, query, user).await,
        }
    }

    async fn nearest(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: Location,
    ) -> UseCaseResult<AgentResult> {
        let category = query
            .entities
            .primary_poi
            .ok_or_else(|| UseCaseError::missing_field("primary_poi"))?;

        let found = find_nearest_poi(
            collaborators,
            &FindNearestRequest {
                user: Some(user),
                category,
                cuisine: query.entities.cuisine.clone(),
            },
        )
        .await?;
        let metadata = found.metadata.clone();
        let data = found.data;

        let mut pois = vec![data.best.clone()];
        pois.extend(data.alternatives);

        let summary = format!(
            "Nearest {category}: {} ({:.0} m away, ~{:.0} min {})",
            data.best.name,
            data.best.distance_m.unwrap_or(0.0),
            data.best.travel_time_min.unwrap_or(0.0),
            data.strategy.mode,
        );
        let result = AgentResult {
            summary,
            pois,
            routes: Vec::new(),
            tools_used: vec!["get_isochrone".to_string(), "find_pois".to_string()],
            reasoning: vec![
                format!("searched for the nearest {category} with escalating reach"),
                format!("winning strategy: {}", data.strategy),
            ],
        };
        Ok(UseCaseOutput::with_metadata(result, metadata))
    }

    async fn within_time(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: Location,
        transport: TransportMode,
        minutes: f64,
    ) -> UseCaseResult<AgentResult> {
        let category = query
            .entities
            .primary_poi
            .ok_or_else(|| UseCaseError::missing_field("primary_poi"))?;

        let found = find_pois_within_time(
            collaborators,
            &WithinTimeRequest {
                user: Some(user),
                category,
                mode: transport,
                minutes,
                cuisine: query.entities.cuisine.clone(),
                max_results: WITHIN_TIME_MAX_RESULTS,
                sort: SortKey::Distance,
            },
        )
        .await?;
        let metadata = found.metadata.clone();
        let pois = found.data;

        let summary = if pois.is_empty() {
            format!("No {category} reachable within {minutes:.0} minutes {transport}")
        } else {
            format!(
                "{} {category} option(s) within {minutes:.0} minutes {transport}",
                pois.len()
            )
        };
        let result = AgentResult {
            summary,
            pois,
            routes: Vec::new(),
            tools_used: vec!["get_isochrone".to_string(), "find_pois".to_string()],
            reasoning: vec![format!(
                "searched {category} inside a {minutes:.0}-minute {transport} isochrone"
            )],
        };
        Ok(UseCaseOutput::with_metadata(result, metadata))
    }

    async fn directions(
        &self,
        collaborators: &Collaborators,
        query: &ClassifiedQuery,
        user: &Location,
        geocode_context: &GeocodeContext,
    ) -> UseCaseResult<AgentResult> {
        let destination = match &query.entities.destination {
            Some(Destination::Resolved(location)) => location.clone(),
            Some(Destination::Text(text)) => {
                geocode_with_fallbacks(&collaborators.geocoder, text, geocode_context)
                    .await?
                    .data
            }
            None => return Err(UseCaseError::missing_field("destination")),
        };

        let mode = query.entities.transport.unwrap_or(TransportMode::Walking);
        let route = get_route(
            collaborators,
            &RouteRequest {
                from: user.clone(),
                to: destination.clone(),
                mode,
            },
        )
        .await?;
        let metadata = route.metadata.clone();
        let route = route.data;

        let summary = format!(
            "Route to {}: {:.1} km, ~{:.0} min {mode}",
            destination
                .display_name
                .as_deref()
                .unwrap_or("destination"),
            route.distance_m / 1000.0,
            route.duration_min,
        );
        let result = AgentResult {
            summary,
            pois: Vec::new(),
            routes: vec![route],
            tools_used: vec!["geocode".to_string(), "get_directions".to_string()],
            reasoning: vec!["computed the best direct route".to_string()],
        };
        Ok(UseCaseOutput::with_metadata(result, metadata))
    }
}

impl Default for SimpleAgent {
    fn default() -> Self {
        Self::new()
    }
}
