//! Wire types for the routing service.
//!
//! GeoJSON-flavored request/response shapes for isochrones and directions,
//! plus the matrix and VROOM-style optimization payloads. Coordinates on the
//! wire are `[lng, lat]` (GeoJSON order) and may carry a third elevation
//! element; the normalizer flips them into `lat`/`lng` domain types.

use serde::{Deserialize, Serialize};

/// GeoJSON FeatureCollection envelope shared by isochrone and directions
/// responses.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: serde_json::Value,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// Polygon: `[[[lng, lat], …]]` (rings); LineString: `[[lng, lat(, ele)], …]`.
    pub coordinates: serde_json::Value,
}

/// Per-leg summary as reported in directions feature properties.
#[derive(Debug, Deserialize)]
pub struct RouteSummary {
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct RouteSegment {
    #[serde(default)]
    pub steps: Vec<RouteStepWire>,
}

#[derive(Debug, Deserialize)]
pub struct RouteStepWire {
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub distance: f64,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
}

/// Options forwarded to the directions endpoint.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Request 3-d geometry so elevation gain/loss can be derived.
    pub elevation: bool,
    /// Ask the service for alternative routes; the lowest-duration one wins.
    pub alternatives: bool,
}

/// Duration/distance matrix between a location set.
#[derive(Debug, Clone, Deserialize)]
pub struct Matrix {
    /// Seconds; `durations[i][j]` is origin `i` → destination `j`. `None`
    /// when the service could not route the pair.
    #[serde(default)]
    pub durations: Vec<Vec<Option<f64>>>,
    /// Meters, same indexing.
    #[serde(default)]
    pub distances: Vec<Vec<Option<f64>>>,
}

/// One stop to visit in an optimization request.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationJob {
    pub id: u64,
    /// `[lng, lat]`.
    pub location: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<u64>,
}

/// A vehicle with fixed start and end points.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationVehicle {
    pub id: u64,
    pub profile: String,
    /// `[lng, lat]`.
    pub start: [f64; 2],
    /// `[lng, lat]`.
    pub end: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationResult {
    #[serde(default)]
    pub routes: Vec<OptimizationRoute>,
    #[serde(default)]
    pub unassigned: Vec<UnassignedJob>,
}

impl OptimizationResult {
    /// Total driving duration in seconds across all vehicle routes.
    #[must_use]
    pub fn total_duration_secs(&self) -> f64 {
        self.routes.iter().map(|r| r.duration).sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationRoute {
    pub vehicle: u64,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub steps: Vec<OptimizationStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizationStep {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub job: Option<u64>,
    /// Seconds since route start.
    #[serde(default)]
    pub arrival: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnassignedJob {
    pub id: u64,
}
