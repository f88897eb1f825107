//! HTTP client for an OpenRouteService-compatible routing deployment.
//!
//! Wraps `reqwest` with routing-specific error handling, optional API-key
//! auth, and typed response deserialization. 4xx responses surface the
//! service's error envelope as [`RoutingError::ApiError`]; 5xx and network
//! failures are retried with back-off.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde_json::{json, Value};

use wayfind_core::geo::Coord;
use wayfind_core::location::TransportMode;
use wayfind_core::poi::Isochrone;
use wayfind_core::route::RouteInfo;

use crate::error::RoutingError;
use crate::normalize;
use crate::retry::retry_with_backoff;
use crate::types::{
    FeatureCollection, Matrix, OptimizationJob, OptimizationResult, OptimizationVehicle,
    RouteOptions,
};

const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/";
const MAX_RETRIES: u32 = 2;
const BACKOFF_BASE_MS: u64 = 500;

/// Client for the routing/isochrone/optimization service.
///
/// Use [`RoutingClient::new`] for production or
/// [`RoutingClient::with_base_url`] to point at a mock server in tests.
pub struct RoutingClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RoutingClient {
    /// Creates a client pointed at the public routing API.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RoutingError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RoutingError::ApiError`] if `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, RoutingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure the base URL ends with exactly one slash so join() appends
        // rather than replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RoutingError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(ToOwned::to_owned),
        })
    }

    /// Requests a reachability polygon set around `center`.
    ///
    /// Multiple `range_seconds` entries come back as separate features and
    /// are unioned into one polygon set; `range_minutes` on the result is
    /// the largest requested range.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::ApiError`] on a 4xx error envelope.
    /// - [`RoutingError::Http`] on network failure or 5xx after retries.
    /// - [`RoutingError::Deserialize`] / [`RoutingError::EmptyResponse`] on
    ///   an unusable body.
    pub async fn get_isochrone(
        &self,
        center: Coord,
        mode: TransportMode,
        range_seconds: &[u64],
    ) -> Result<Isochrone, RoutingError> {
        let path = format!("v2/isochrones/{}", mode.routing_profile());
        let body = json!({
            "locations": [[center.lng, center.lat]],
            "range": range_seconds,
            "range_type": "time",
        });

        let value = self.post_with_retry(&path, &body).await?;
        let fc: FeatureCollection =
            serde_json::from_value(value).map_err(|e| RoutingError::Deserialize {
                context: format!("isochrones({mode})"),
                source: e,
            })?;

        #[allow(clippy::cast_precision_loss)]
        let range_minutes = range_seconds.iter().copied().max().unwrap_or(0) as f64 / 60.0;
        normalize::isochrone_from_response(&fc, mode, range_minutes, center)
    }

    /// Requests routes through `coordinates` in order and returns all
    /// alternatives, normalized. Use [`normalize::pick_best_route`] to
    /// select the lowest-duration one.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`RoutingClient::get_isochrone`].
    pub async fn get_directions(
        &self,
        coordinates: &[Coord],
        mode: TransportMode,
        options: &RouteOptions,
    ) -> Result<Vec<RouteInfo>, RoutingError> {
        if coordinates.len() < 2 {
            return Err(RoutingError::ApiError(
                "directions require at least two coordinates".to_string(),
            ));
        }
        let path = format!("v2/directions/{}/geojson", mode.routing_profile());
        let wire_coords: Vec<[f64; 2]> = coordinates.iter().map(|c| [c.lng, c.lat]).collect();
        let mut body = json!({
            "coordinates": wire_coords,
            "elevation": options.elevation,
            "instructions": true,
        });
        if options.alternatives {
            // Alternatives are only defined for two-point routes.
            if coordinates.len() == 2 {
                body["alternative_routes"] = json!({"target_count": 3});
            }
        }

        let value = self.post_with_retry(&path, &body).await?;
        let fc: FeatureCollection =
            serde_json::from_value(value).map_err(|e| RoutingError::Deserialize {
                context: format!("directions({mode})"),
                source: e,
            })?;
        normalize::routes_from_response(&fc)
    }

    /// Requests the full duration/distance matrix between `locations`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`RoutingClient::get_isochrone`].
    pub async fn get_matrix(
        &self,
        locations: &[Coord],
        mode: TransportMode,
        metrics: &[&str],
    ) -> Result<Matrix, RoutingError> {
        let path = format!("v2/matrix/{}", mode.routing_profile());
        let wire_coords: Vec<[f64; 2]> = locations.iter().map(|c| [c.lng, c.lat]).collect();
        let body = json!({
            "locations": wire_coords,
            "metrics": metrics,
        });

        let value = self.post_with_retry(&path, &body).await?;
        serde_json::from_value(value).map_err(|e| RoutingError::Deserialize {
            context: format!("matrix({mode})"),
            source: e,
        })
    }

    /// Orders vehicles through jobs with minimum total cost (VROOM-style
    /// `/optimization` endpoint).
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`RoutingClient::get_isochrone`]; a non-zero
    /// optimizer `code` surfaces as [`RoutingError::ApiError`].
    pub async fn optimize(
        &self,
        jobs: &[OptimizationJob],
        vehicles: &[OptimizationVehicle],
    ) -> Result<OptimizationResult, RoutingError> {
        let body = json!({
            "jobs": jobs,
            "vehicles": vehicles,
        });

        let value = self.post_with_retry("optimization", &body).await?;
        if let Some(code) = value.get("code").and_then(Value::as_i64) {
            if code != 0 {
                let message = value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("optimization failed");
                return Err(RoutingError::ApiError(format!(
                    "optimizer code {code}: {message}"
                )));
            }
        }
        serde_json::from_value(value).map_err(|e| RoutingError::Deserialize {
            context: "optimization".to_string(),
            source: e,
        })
    }

    async fn post_with_retry(&self, path: &str, body: &Value) -> Result<Value, RoutingError> {
        retry_with_backoff(MAX_RETRIES, BACKOFF_BASE_MS, || self.post_json(path, body)).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, RoutingError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RoutingError::ApiError(format!("invalid path '{path}': {e}")))?;

        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, key.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        match response.error_for_status_ref() {
            Ok(_) => {}
            // 5xx stays a reqwest error so the retry layer sees it as transient.
            Err(e) if status.is_server_error() => return Err(RoutingError::Http(e)),
            Err(_) => {
                let body_text = response.text().await.unwrap_or_default();
                return Err(RoutingError::ApiError(extract_error_message(
                    &body_text, status,
                )));
            }
        }

        let value = response.json::<Value>().await?;
        Ok(value)
    }
}

/// Pulls the service's error message out of a 4xx body, falling back to the
/// raw body / status line when the envelope is absent.
fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("error")
            .and_then(|e| {
                e.as_str()
                    .map(ToOwned::to_owned)
                    .or_else(|| e.get("message").and_then(Value::as_str).map(ToOwned::to_owned))
            })
            .or_else(|| value.get("message").and_then(Value::as_str).map(ToOwned::to_owned));
        if let Some(message) = message {
            return format!("{status}: {message}");
        }
    }
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
